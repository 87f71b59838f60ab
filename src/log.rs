/// A diagnostic sink for transaction lifecycle notices.
///
/// The coordinator reports outcomes (commit succeeded, rollback triggered,
/// no transaction found) through this capability instead of writing to a
/// global logger directly, so tests can capture them without console
/// scraping. The default sink forwards to [`tracing`].
pub trait LogSink: Send + Sync {
    /// Informational notice.
    fn info(&self, message: &str);

    /// Failure notice.
    fn error(&self, message: &str);
}

/// The default [`LogSink`], forwarding to the `tracing` macros at `INFO` and
/// `ERROR` level under this crate's target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLog;

impl LogSink for TracingLog {
    fn info(&self, message: &str) {
        tracing::info!("{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!("{message}");
    }
}
