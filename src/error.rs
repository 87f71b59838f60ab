/// Error types for context-propagated transaction management.
///
/// Each failure stage gets its own variant so callers can tell where in the
/// begin/query/exec/commit/rollback pipeline a driver error surfaced. The
/// underlying `sqlx::Error` is preserved as the source.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The coordinator could not start a transaction.
    #[error("cannot start transaction: {0}")]
    Start(#[source] Box<Error>),

    /// The adapter could not open a transaction on the underlying pool.
    #[error("cannot begin transaction: {0}")]
    Begin(#[source] sqlx::Error),

    /// A query failed on the pool-level (autocommit) path.
    #[error("cannot query: {0}")]
    Query(#[source] sqlx::Error),

    /// A query failed inside an active transaction.
    #[error("cannot query in transaction: {0}")]
    QueryInTransaction(#[source] sqlx::Error),

    /// A statement failed on the pool-level (autocommit) path.
    #[error("cannot exec: {0}")]
    Exec(#[source] sqlx::Error),

    /// A statement failed inside an active transaction.
    #[error("cannot exec in transaction: {0}")]
    ExecInTransaction(#[source] sqlx::Error),

    /// Commit was requested but the driver refused it.
    #[error("failed to commit transaction: {0}")]
    Commit(#[source] sqlx::Error),

    /// Rollback was requested but the driver refused it.
    ///
    /// The coordinator only logs this variant; `finish` never returns it.
    #[error("failed to rollback transaction: {0}")]
    Rollback(#[source] sqlx::Error),

    /// The manager was built without any adapter.
    #[error("no database adapter configured")]
    NoAdapter,

    /// The context carries a transaction handle that has already been
    /// committed or rolled back.
    #[error("transaction is no longer active")]
    TransactionClosed,

    /// A row value could not be decoded or scanned into its destination.
    #[error("cannot decode row value: {0}")]
    Decode(String),

    /// The number of scan destinations does not match the row's column count.
    #[error("scan destination count {destinations} does not match column count {columns}")]
    ScanCount {
        destinations: usize,
        columns: usize,
    },

    /// `scan` was called before `next`, or after the cursor was exhausted.
    #[error("no current row: call next() before scan()")]
    NoRow,
}

/// Result type alias for transaction operations.
pub type Result<T> = std::result::Result<T, Error>;
