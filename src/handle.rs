use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;

use crate::context::{Context, ContextKey};
use crate::error::Result;

/// A live transaction, uniform over driver-native transaction shapes.
///
/// Exactly one handle is created per [`start`] call and bound into the
/// derived context. The handle is owned by the request that started it and
/// must be driven sequentially; adapters serialize access to the underlying
/// driver transaction internally.
///
/// Committing or rolling back consumes the driver transaction. Calling either
/// on an already-finished handle is a no-op. Cancellation reaches the driver
/// the usual async way: dropping the future aborts the in-flight call per the
/// driver's own contract.
///
/// [`start`]: crate::TransactionManager::start
#[async_trait]
pub trait TransactionHandle: Send + Sync + 'static {
    /// Commits the transaction.
    async fn commit(&self) -> Result<()>;

    /// Rolls the transaction back.
    async fn rollback(&self) -> Result<()>;

    /// Downcast hook used by adapters to check whether a handle found in the
    /// context is of their own driver variant.
    fn as_any(&self) -> &dyn Any;
}

/// Private context key for the transaction slot.
///
/// One key type for the whole process, unnameable outside this crate, so a
/// handle stored by `start` is visible to `query`/`exec`/`finish` at any call
/// depth and to nothing else.
pub(crate) struct TransactionSlot;

impl ContextKey for TransactionSlot {
    type Value = Arc<dyn TransactionHandle>;
}

/// Returns the transaction handle bound in `ctx`, if any.
///
/// Custom [`Adapter`](crate::Adapter) implementations use this to decide
/// between the transaction-scoped and pool-level execution paths.
pub fn current_transaction(ctx: &Context) -> Option<Arc<dyn TransactionHandle>> {
    ctx.value::<TransactionSlot>().cloned()
}

/// Derives a context carrying `handle`. Only the coordinator stores handles.
pub(crate) fn bind_transaction(ctx: &Context, handle: Arc<dyn TransactionHandle>) -> Context {
    ctx.with_value::<TransactionSlot>(handle)
}
