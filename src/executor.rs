use std::future::Future;
use std::pin::Pin;

use crate::context::Context;
use crate::error::Result;
use crate::manager::TransactionManager;

/// Executes a function within a database transaction propagated through the
/// context.
///
/// This wraps the manual `start`/`finish` protocol:
/// - starts a transaction, deriving a new context
/// - runs the provided function against the derived context
/// - commits on success, rolls back on error
///
/// On the error path the function's own error is returned unchanged; the
/// rollback outcome is handled (and logged) by
/// [`finish`](TransactionManager::finish) and never masks it.
///
/// # Examples
///
/// ```rust,no_run
/// use sqlx_tx_context::{params, with_transaction, Context, TransactionManager};
///
/// # async fn example(manager: &'static TransactionManager) -> sqlx_tx_context::Result<()> {
/// let ctx = Context::new();
///
/// with_transaction(manager, &ctx, |tx_ctx| {
///     Box::pin(async move {
///         manager
///             .exec(tx_ctx, "INSERT INTO users (name) VALUES (?)", &params!["Alice"])
///             .await?;
///         manager
///             .exec(
///                 tx_ctx,
///                 "INSERT INTO profiles (user_id, bio) VALUES (?, ?)",
///                 &params![1, "Software Developer"],
///             )
///             .await?;
///         // Both statements commit together.
///         Ok(())
///     })
/// })
/// .await?;
/// # Ok(())
/// # }
/// ```
pub async fn with_transaction<F, T>(manager: &TransactionManager, ctx: &Context, f: F) -> Result<T>
where
    F: for<'a> FnOnce(&'a Context) -> Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>,
    T: Send,
{
    let tx_ctx = manager.start(ctx).await?;

    match f(&tx_ctx).await {
        Ok(value) => {
            manager.finish(&tx_ctx, None).await?;
            Ok(value)
        }
        Err(e) => {
            // finish rolls back and swallows rollback failures; the closure's
            // error is the one the caller sees.
            let _ = manager.finish(&tx_ctx, Some(&e)).await;
            Err(e)
        }
    }
}
