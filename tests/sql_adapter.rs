//! End-to-end tests for the generic adapter, driven through `sqlx::Any` over
//! an in-memory SQLite database. The pool is capped at one connection so the
//! whole test sees a single in-memory database.

use std::any::Any;
use std::sync::{Arc, Once};

use async_trait::async_trait;
use sqlx::any::AnyPoolOptions;
use sqlx_tx_context::{
    params, Adapter, Context, Error, Result, Rows, SqlValue, TransactionHandle, TransactionManager,
};

fn install_drivers() {
    static INIT: Once = Once::new();
    INIT.call_once(sqlx::any::install_default_drivers);
}

async fn setup() -> TransactionManager {
    install_drivers();
    let pool = AnyPoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("connect in-memory sqlite");

    sqlx::query("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)")
        .execute(&pool)
        .await
        .expect("create table");
    sqlx::query("INSERT INTO users (id, name) VALUES (1, 'Alice')")
        .execute(&pool)
        .await
        .expect("seed row");

    TransactionManager::builder().sql_adapter(pool).build()
}

async fn name_of_user_1(manager: &TransactionManager, ctx: &Context) -> String {
    let mut rows = manager
        .query(ctx, "SELECT name FROM users WHERE id = ?", &params![1])
        .await
        .unwrap();
    assert!(rows.next());
    let mut name = String::new();
    rows.scan(&mut [&mut name]).unwrap();
    rows.close();
    name
}

#[tokio::test]
async fn select_one_in_transaction_and_commit() {
    let manager = setup().await;

    let ctx = manager.start(&Context::new()).await.unwrap();
    let mut rows = manager.query(&ctx, "SELECT 1", &params![]).await.unwrap();

    assert!(rows.next());
    let mut number = 0i64;
    rows.scan(&mut [&mut number]).unwrap();
    assert_eq!(number, 1);
    assert!(!rows.next());
    rows.close();

    manager.finish(&ctx, None).await.unwrap();
}

#[tokio::test]
async fn committed_update_is_visible_afterwards() {
    let manager = setup().await;

    let ctx = manager.start(&Context::new()).await.unwrap();
    manager
        .exec(
            &ctx,
            "UPDATE users SET name = ? WHERE id = ?",
            &params!["John Doe", 1],
        )
        .await
        .unwrap();
    // Visible inside the transaction before commit.
    assert_eq!(name_of_user_1(&manager, &ctx).await, "John Doe");

    manager.finish(&ctx, None).await.unwrap();

    // And on the pool path after commit.
    assert_eq!(name_of_user_1(&manager, &Context::new()).await, "John Doe");
}

#[tokio::test]
async fn rolled_back_update_is_discarded() {
    let manager = setup().await;

    let ctx = manager.start(&Context::new()).await.unwrap();
    manager
        .exec(
            &ctx,
            "UPDATE users SET name = ? WHERE id = ?",
            &params!["Bob", 1],
        )
        .await
        .unwrap();

    let business_err = std::io::Error::new(std::io::ErrorKind::Other, "validation failed");
    let result = manager.finish(&ctx, Some(&business_err)).await;
    assert!(result.is_ok());

    assert_eq!(name_of_user_1(&manager, &Context::new()).await, "Alice");
}

#[tokio::test]
async fn exec_without_transaction_autocommits() {
    let manager = setup().await;

    let ctx = Context::new();
    manager
        .exec(
            &ctx,
            "UPDATE users SET name = ? WHERE id = ?",
            &params!["Carol", 1],
        )
        .await
        .unwrap();

    assert_eq!(name_of_user_1(&manager, &ctx).await, "Carol");
}

#[tokio::test]
async fn statement_failure_leaves_transaction_open_for_finish() {
    let manager = setup().await;

    let ctx = manager.start(&Context::new()).await.unwrap();
    let err = manager
        .exec(&ctx, "UPDATE no_such_table SET x = 1", &params![])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ExecInTransaction(_)));
    assert!(err.to_string().contains("cannot exec in transaction"));

    // The transaction is still open; the caller decides the outcome.
    let result = manager.finish(&ctx, Some(&err)).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn double_finish_is_a_noop() {
    let manager = setup().await;

    let ctx = manager.start(&Context::new()).await.unwrap();
    manager.finish(&ctx, None).await.unwrap();
    // The handle is already consumed; a second settle does nothing.
    manager.finish(&ctx, None).await.unwrap();
}

#[tokio::test]
async fn query_after_finish_reports_closed_transaction() {
    let manager = setup().await;

    let ctx = manager.start(&Context::new()).await.unwrap();
    manager.finish(&ctx, None).await.unwrap();

    let err = manager
        .query(&ctx, "SELECT 1", &params![])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::TransactionClosed));
}

#[tokio::test]
async fn null_column_scans_into_option() {
    let manager = setup().await;

    let ctx = Context::new();
    manager
        .exec(&ctx, "INSERT INTO users (id, name) VALUES (2, NULL)", &params![])
        .await
        .unwrap();

    let mut rows = manager
        .query(&ctx, "SELECT name FROM users WHERE id = ?", &params![2])
        .await
        .unwrap();
    assert!(rows.next());
    let mut name: Option<String> = Some(String::new());
    rows.scan(&mut [&mut name]).unwrap();
    assert_eq!(name, None);
}

#[tokio::test]
async fn scan_count_mismatch_is_an_error() {
    let manager = setup().await;

    let ctx = Context::new();
    let mut rows = manager
        .query(&ctx, "SELECT id, name FROM users WHERE id = ?", &params![1])
        .await
        .unwrap();
    assert!(rows.next());

    let mut id = 0i64;
    let err = rows.scan(&mut [&mut id]).unwrap_err();
    assert!(matches!(
        err,
        Error::ScanCount {
            destinations: 1,
            columns: 2
        }
    ));
}

#[tokio::test]
async fn scan_before_next_is_an_error() {
    let manager = setup().await;

    let mut rows = manager
        .query(&Context::new(), "SELECT 1", &params![])
        .await
        .unwrap();
    let mut number = 0i64;
    assert!(matches!(
        rows.scan(&mut [&mut number]).unwrap_err(),
        Error::NoRow
    ));
}

/// Handle of a foreign driver variant, as a mixed-adapter configuration
/// would produce.
struct ForeignTx;

#[async_trait]
impl TransactionHandle for ForeignTx {
    async fn commit(&self) -> Result<()> {
        Ok(())
    }

    async fn rollback(&self) -> Result<()> {
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

struct ForeignAdapter;

#[async_trait]
impl Adapter for ForeignAdapter {
    async fn begin(&self, _ctx: &Context) -> Result<Arc<dyn TransactionHandle>> {
        Ok(Arc::new(ForeignTx))
    }

    async fn query(&self, _ctx: &Context, _sql: &str, _args: &[SqlValue]) -> Result<Box<dyn Rows>> {
        unimplemented!("never called in this test")
    }

    async fn exec(&self, _ctx: &Context, _sql: &str, _args: &[SqlValue]) -> Result<()> {
        unimplemented!("never called in this test")
    }
}

#[tokio::test]
async fn wrong_variant_handle_falls_through_to_pool() {
    let manager = setup().await;

    // A context carrying a handle from a different adapter variant.
    let foreign = TransactionManager::builder().adapter(ForeignAdapter).build();
    let ctx = foreign.start(&Context::new()).await.unwrap();

    // The generic adapter ignores the foreign handle and uses its pool.
    let mut rows = manager.query(&ctx, "SELECT 1", &params![]).await.unwrap();
    assert!(rows.next());
    let mut number = 0i64;
    rows.scan(&mut [&mut number]).unwrap();
    assert_eq!(number, 1);
}
