use std::future::Future;
use std::pin::Pin;

use crate::context::Context;
use crate::manager::TransactionManager;

/// Executes a function within a propagated transaction, using `anyhow::Error`
/// for error handling.
///
/// This is a convenience wrapper around [`with_transaction`] for service code
/// whose fallible paths already flow through `anyhow::Result`. Commit and
/// start failures convert into `anyhow::Error`; on the error path the
/// closure's error is returned unchanged and the rollback outcome is only
/// logged.
///
/// [`with_transaction`]: crate::with_transaction
///
/// # Examples
///
/// ```rust,no_run
/// use sqlx_tx_context::{params, with_transaction_anyhow, Context, TransactionManager};
///
/// # async fn example(manager: &'static TransactionManager) -> anyhow::Result<()> {
/// let ctx = Context::new();
///
/// with_transaction_anyhow(manager, &ctx, |tx_ctx| {
///     Box::pin(async move {
///         manager
///             .exec(tx_ctx, "INSERT INTO users (name) VALUES (?)", &params!["Alice"])
///             .await?;
///         Ok(())
///     })
/// })
/// .await?;
/// # Ok(())
/// # }
/// ```
pub async fn with_transaction_anyhow<F, T>(
    manager: &TransactionManager,
    ctx: &Context,
    f: F,
) -> anyhow::Result<T>
where
    F: for<'a> FnOnce(&'a Context) -> Pin<Box<dyn Future<Output = anyhow::Result<T>> + Send + 'a>>,
    T: Send,
{
    let tx_ctx = manager.start(ctx).await?;

    match f(&tx_ctx).await {
        Ok(value) => {
            manager.finish(&tx_ctx, None).await?;
            Ok(value)
        }
        Err(e) => {
            let cause: &dyn std::error::Error = e.as_ref();
            let _ = manager.finish(&tx_ctx, Some(cause)).await;
            Err(e)
        }
    }
}
