//! # sqlx-tx-context
//!
//! Context-propagated transaction management for SQLx service layers.
//!
//! ## Features
//!
//! - **Implicit Propagation**: a started transaction travels through the call
//!   chain inside an immutable [`Context`] instead of an explicit parameter
//! - **One Transaction Per Branch**: nested and repeated calls made with the
//!   derived context resolve to the same live transaction until it is settled
//! - **Outermost Settlement**: the caller that started the transaction
//!   finishes it once, committing on success or rolling back on error
//! - **Two Drivers, One Contract**: a driver-agnostic adapter
//!   ([`SqlAdapter`] over `sqlx::AnyPool`) and a PostgreSQL-native adapter
//!   ([`PgAdapter`] over `sqlx::PgPool`) behind a single query/exec surface
//! - **No Masked Errors**: rollback failures are logged, never returned, so
//!   the business error that triggered the rollback stays intact
//!
//! ## Quick Start
//!
//! Add to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! sqlx = { version = "0.8", features = ["any", "postgres", "runtime-tokio"] }
//! sqlx-tx-context = "0.1"
//! ```
//!
//! ## Examples
//!
//! ### Start, query, finish
//!
//! ```rust,no_run
//! use sqlx_tx_context::{params, Context, TransactionManager};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! sqlx::any::install_default_drivers();
//! let pool = sqlx::AnyPool::connect("postgres://localhost/test").await?;
//! let manager = TransactionManager::builder().sql_adapter(pool).build();
//!
//! let ctx = manager.start(&Context::new()).await?;
//!
//! // Any call given `ctx` runs inside the same transaction.
//! let mut rows = manager.query(&ctx, "SELECT id FROM users", &params![]).await?;
//! while rows.next() {
//!     let mut id = 0i64;
//!     rows.scan(&mut [&mut id])?;
//! }
//! rows.close();
//!
//! manager.finish(&ctx, None).await?; // commit
//! # Ok(())
//! # }
//! ```
//!
//! ### Rolling back on a business error
//!
//! ```rust,no_run
//! use sqlx_tx_context::{params, Context, TransactionManager};
//!
//! # async fn transfer(manager: &TransactionManager, ctx: &Context) -> sqlx_tx_context::Result<()> { Ok(()) }
//! # async fn example(manager: &TransactionManager) -> Result<(), Box<dyn std::error::Error>> {
//! let ctx = manager.start(&Context::new()).await?;
//!
//! match transfer(manager, &ctx).await {
//!     Ok(()) => manager.finish(&ctx, None).await?,
//!     Err(e) => {
//!         // Rolls back; always returns Ok so `e` is not masked.
//!         manager.finish(&ctx, Some(&e)).await?;
//!         return Err(e.into());
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### Scoped helper
//!
//! [`with_transaction`] bundles the start/finish protocol around a closure:
//!
//! ```rust,no_run
//! use sqlx_tx_context::{params, with_transaction, Context, TransactionManager};
//!
//! # async fn example(manager: &'static TransactionManager) -> sqlx_tx_context::Result<()> {
//! with_transaction(manager, &Context::new(), |tx_ctx| {
//!     Box::pin(async move {
//!         manager
//!             .exec(tx_ctx, "UPDATE users SET name = ? WHERE id = ?", &params!["John Doe", 1])
//!             .await
//!     })
//! })
//! .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## How It Works
//!
//! 1. **Context**: an immutable key/value overlay with structural sharing;
//!    deriving a child never mutates the parent
//! 2. **Transaction Slot**: the handle is bound under a crate-private key
//!    type, so unrelated code can neither read nor spoof it
//! 3. **Adapter Dispatch**: query/exec check the context for a handle of
//!    their own driver variant and run on its connection, else autocommit on
//!    the pool
//! 4. **Settlement**: `finish` commits or rolls back exactly once; a handle
//!    already settled is a no-op
//!
//! ## Limitations
//!
//! - Savepoints/nested transactions, distributed transactions, and
//!   retry-on-serialization-failure are out of scope
//! - Parameters and scanned columns go through [`SqlValue`]; exotic
//!   driver-specific column types are not decoded
//! - A single transaction must be driven sequentially by the request that
//!   owns it
//!
//! ## License
//!
//! Licensed under either of Apache License, Version 2.0 or MIT license at
//! your option.

pub mod adapter;
pub mod context;
pub mod error;
pub mod executor;
pub mod handle;
pub mod log;
pub mod manager;
pub mod rows;
pub mod value;

#[cfg(feature = "anyhow")]
pub mod anyhow_compat;

pub use adapter::{Adapter, PgAdapter, SqlAdapter};
pub use context::{Context, ContextKey};
pub use error::{Error, Result};
pub use executor::with_transaction;
pub use handle::{current_transaction, TransactionHandle};
pub use log::{LogSink, TracingLog};
pub use manager::{TransactionManager, TransactionManagerBuilder};
pub use rows::Rows;
pub use value::{ScanTarget, SqlValue};

#[cfg(feature = "anyhow")]
pub use anyhow_compat::with_transaction_anyhow;

/// Convenience re-exports for common use cases
pub mod prelude {
    pub use crate::adapter::Adapter;
    pub use crate::context::Context;
    pub use crate::error::{Error, Result};
    pub use crate::executor::with_transaction;
    pub use crate::manager::TransactionManager;
    pub use crate::params;
    pub use crate::rows::Rows;
    pub use crate::value::SqlValue;

    #[cfg(feature = "anyhow")]
    pub use crate::anyhow_compat::with_transaction_anyhow;
}
