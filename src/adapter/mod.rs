//! Driver adapters: one contract, one implementation per driver shape.
//!
//! An adapter wraps a concrete connection pool and exposes the three
//! primitives the coordinator needs. Adapters hold no per-request state
//! (everything request-scoped lives in the [`Context`] and its bound handle),
//! so a single adapter is shared read-only across all concurrent requests.

mod pg;
mod sql;

use std::sync::Arc;

use async_trait::async_trait;

use crate::context::Context;
use crate::error::Result;
use crate::handle::TransactionHandle;
use crate::rows::Rows;
use crate::value::SqlValue;

pub use pg::PgAdapter;
pub use sql::SqlAdapter;

/// The driver adapter contract.
///
/// `query` and `exec` share one algorithm: if the calling context carries a
/// transaction handle of this adapter's own variant, the statement runs on
/// that transaction's connection; otherwise it runs directly against the pool
/// as a single autocommit statement. A handle of a *different* variant (a
/// mixed-adapter configuration, which correct setups never produce) is
/// ignored and the statement falls through to the pool path.
///
/// Failures are wrapped with a stage-identifying error variant and returned;
/// no retries happen at this layer.
#[async_trait]
pub trait Adapter: Send + Sync {
    /// Opens a transaction on the underlying pool.
    async fn begin(&self, ctx: &Context) -> Result<Arc<dyn TransactionHandle>>;

    /// Runs a query, inside the context's transaction when one is bound.
    async fn query(&self, ctx: &Context, sql: &str, args: &[SqlValue]) -> Result<Box<dyn Rows>>;

    /// Runs a statement, inside the context's transaction when one is bound.
    async fn exec(&self, ctx: &Context, sql: &str, args: &[SqlValue]) -> Result<()>;
}
