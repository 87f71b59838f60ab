use std::sync::Arc;

use crate::adapter::{Adapter, PgAdapter, SqlAdapter};
use crate::context::Context;
use crate::error::{Error, Result};
use crate::handle::{bind_transaction, current_transaction};
use crate::log::{LogSink, TracingLog};
use crate::rows::Rows;
use crate::value::SqlValue;

/// Service-layer transaction coordinator.
///
/// `start` opens a transaction and binds its handle into a derived
/// [`Context`]; every `query`/`exec` made with that context runs inside the
/// same transaction, at any call depth, until the outermost caller settles it
/// with `finish`. Contexts without a bound handle execute directly against
/// the pool.
///
/// The manager holds no per-request state and no locks; it is shared freely
/// across concurrent requests. A single started transaction, on the other
/// hand, belongs to one logical request flow and must be driven sequentially.
///
/// # Examples
///
/// ```rust,no_run
/// use sqlx_tx_context::{params, Context, TransactionManager};
///
/// # async fn example(pool: sqlx::AnyPool) -> sqlx_tx_context::Result<()> {
/// let manager = TransactionManager::builder().sql_adapter(pool).build();
///
/// let ctx = manager.start(&Context::new()).await?;
/// let outcome = manager
///     .exec(&ctx, "UPDATE users SET name = ? WHERE id = ?", &params!["John Doe", 1])
///     .await;
/// let err = outcome.as_ref().err().map(|e| e as &dyn std::error::Error);
/// manager.finish(&ctx, err).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct TransactionManager {
    adapter: Option<Arc<dyn Adapter>>,
    log: Arc<dyn LogSink>,
}

impl TransactionManager {
    /// Starts building a manager. Exactly one adapter-selecting option should
    /// be supplied; a manager built without one fails every operation with
    /// [`Error::NoAdapter`].
    pub fn builder() -> TransactionManagerBuilder {
        TransactionManagerBuilder::default()
    }

    fn adapter(&self) -> Result<&Arc<dyn Adapter>> {
        self.adapter.as_ref().ok_or(Error::NoAdapter)
    }

    /// Begins a transaction and returns a context derived from `ctx` with the
    /// new handle bound. `ctx` itself is not modified.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Start`] wrapping the adapter failure; no context is
    /// produced in that case.
    pub async fn start(&self, ctx: &Context) -> Result<Context> {
        let handle = self
            .adapter()?
            .begin(ctx)
            .await
            .map_err(|e| Error::Start(Box::new(e)))?;
        Ok(bind_transaction(ctx, handle))
    }

    /// Settles the transaction bound in `ctx` according to `outcome`.
    ///
    /// - No transaction bound: logs a notice and returns `Ok(())`, so `finish`
    ///   is safe to call defensively on a branch that never called `start`.
    /// - `outcome` is `None`: commits. A commit failure is returned.
    /// - `outcome` is `Some(err)`: rolls back. A rollback failure is only
    ///   logged, never returned; the caller's own error already signals the
    ///   failure, and transaction bookkeeping must not mask it. This branch
    ///   always returns `Ok(())`.
    pub async fn finish(&self, ctx: &Context, outcome: Option<&dyn std::error::Error>) -> Result<()> {
        let Some(handle) = current_transaction(ctx) else {
            self.log.info("no transaction found in context");
            return Ok(());
        };

        if let Some(err) = outcome {
            self.log
                .error(&format!("error occurred, rolling back transaction: {err}"));
            match handle.rollback().await {
                Ok(()) => self.log.info("transaction rolled back successfully"),
                Err(rb_err) => self.log.error(&format!("{rb_err}")),
            }
            return Ok(());
        }

        handle.commit().await?;
        self.log.info("transaction committed successfully");
        Ok(())
    }

    /// Runs a query through the adapter, inside the context's transaction
    /// when one is bound.
    pub async fn query(&self, ctx: &Context, sql: &str, args: &[SqlValue]) -> Result<Box<dyn Rows>> {
        self.adapter()?.query(ctx, sql, args).await
    }

    /// Runs a statement through the adapter, inside the context's transaction
    /// when one is bound.
    pub async fn exec(&self, ctx: &Context, sql: &str, args: &[SqlValue]) -> Result<()> {
        self.adapter()?.exec(ctx, sql, args).await
    }
}

/// Builder for [`TransactionManager`].
///
/// Recognized options: [`logger`](Self::logger) replaces the default
/// `tracing` sink; [`sql_adapter`](Self::sql_adapter),
/// [`pg_adapter`](Self::pg_adapter), and [`adapter`](Self::adapter) select
/// the driver adapter (supply exactly one; the last call wins).
#[derive(Default)]
pub struct TransactionManagerBuilder {
    adapter: Option<Arc<dyn Adapter>>,
    log: Option<Arc<dyn LogSink>>,
}

impl TransactionManagerBuilder {
    /// Replaces the default diagnostic sink.
    pub fn logger(mut self, sink: impl LogSink + 'static) -> Self {
        self.log = Some(Arc::new(sink));
        self
    }

    /// Wraps a driver-agnostic connection pool in a [`SqlAdapter`].
    pub fn sql_adapter(mut self, pool: sqlx::AnyPool) -> Self {
        self.adapter = Some(Arc::new(SqlAdapter::new(pool)));
        self
    }

    /// Wraps a PostgreSQL connection pool in a [`PgAdapter`].
    pub fn pg_adapter(mut self, pool: sqlx::PgPool) -> Self {
        self.adapter = Some(Arc::new(PgAdapter::new(pool)));
        self
    }

    /// Supplies a custom [`Adapter`] implementation.
    pub fn adapter(mut self, adapter: impl Adapter + 'static) -> Self {
        self.adapter = Some(Arc::new(adapter));
        self
    }

    pub fn build(self) -> TransactionManager {
        TransactionManager {
            adapter: self.adapter,
            log: self.log.unwrap_or_else(|| Arc::new(TracingLog)),
        }
    }
}
