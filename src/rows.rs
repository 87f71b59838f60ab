use crate::error::Result;
use crate::value::ScanTarget;

/// A lazy, forward-only cursor over the rows of a query result.
///
/// The cursor hides whichever driver-specific row type produced it. Iteration
/// follows the `next`/`scan` protocol:
///
/// ```rust,no_run
/// # async fn example(mut rows: Box<dyn sqlx_tx_context::Rows>) -> sqlx_tx_context::Result<()> {
/// while rows.next() {
///     let mut id = 0i64;
///     let mut name = String::new();
///     rows.scan(&mut [&mut id, &mut name])?;
/// }
/// rows.close();
/// # Ok(())
/// # }
/// ```
///
/// The cursor is not restartable. `close` releases any remaining rows and is
/// idempotent; dropping the cursor releases them as well, so an early return
/// after a failed scan leaks nothing.
pub trait Rows: Send {
    /// Advances to the next row. Returns `true` iff a row is available.
    fn next(&mut self) -> bool;

    /// Decodes the current row's columns positionally into `dest`.
    ///
    /// Fails with a decode error on a type mismatch, with a count error when
    /// `dest` does not match the column count, and with [`Error::NoRow`]
    /// when called before `next` or after the cursor is exhausted.
    ///
    /// [`Error::NoRow`]: crate::Error::NoRow
    fn scan(&mut self, dest: &mut [&mut dyn ScanTarget]) -> Result<()>;

    /// Releases the remaining rows. Safe to call more than once.
    fn close(&mut self);
}

impl std::fmt::Debug for dyn Rows + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rows").finish_non_exhaustive()
    }
}
