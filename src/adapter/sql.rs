//! Generic adapter over [`sqlx::AnyPool`], usable with any installed sqlx
//! driver. Column values round-trip through [`SqlValue`], so the supported
//! type set is the `Any` driver's: booleans, integers, floats, and text.

use std::any::Any as StdAny;
use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::any::{AnyArguments, AnyRow};
use sqlx::{Any, AnyPool, Row as _, Transaction, TypeInfo as _, ValueRef as _};
use tokio::sync::Mutex;

use crate::adapter::Adapter;
use crate::context::Context;
use crate::error::{Error, Result};
use crate::handle::{current_transaction, TransactionHandle};
use crate::rows::Rows;
use crate::value::{assign_row, ScanTarget, SqlValue};

/// Adapter over a driver-agnostic [`AnyPool`].
///
/// Select this via
/// [`TransactionManagerBuilder::sql_adapter`](crate::TransactionManagerBuilder::sql_adapter).
pub struct SqlAdapter {
    pool: AnyPool,
}

impl SqlAdapter {
    pub fn new(pool: AnyPool) -> Self {
        Self { pool }
    }
}

/// Handle variant wrapping a live `Any` transaction.
///
/// The driver transaction is taken out on commit/rollback; a finished handle
/// holds `None` and further commit/rollback calls are no-ops.
struct SqlTransaction {
    inner: Mutex<Option<Transaction<'static, Any>>>,
}

#[async_trait]
impl TransactionHandle for SqlTransaction {
    async fn commit(&self) -> Result<()> {
        match self.inner.lock().await.take() {
            Some(tx) => tx.commit().await.map_err(Error::Commit),
            None => Ok(()),
        }
    }

    async fn rollback(&self) -> Result<()> {
        match self.inner.lock().await.take() {
            Some(tx) => tx.rollback().await.map_err(Error::Rollback),
            None => Ok(()),
        }
    }

    fn as_any(&self) -> &dyn StdAny {
        self
    }
}

#[async_trait]
impl Adapter for SqlAdapter {
    async fn begin(&self, _ctx: &Context) -> Result<Arc<dyn TransactionHandle>> {
        let tx = self.pool.begin().await.map_err(Error::Begin)?;
        Ok(Arc::new(SqlTransaction {
            inner: Mutex::new(Some(tx)),
        }))
    }

    async fn query(&self, ctx: &Context, sql: &str, args: &[SqlValue]) -> Result<Box<dyn Rows>> {
        if let Some(handle) = current_transaction(ctx) {
            if let Some(own) = handle.as_any().downcast_ref::<SqlTransaction>() {
                let mut guard = own.inner.lock().await;
                let tx = guard.as_mut().ok_or(Error::TransactionClosed)?;
                let rows = bind_args(sql, args)
                    .fetch_all(&mut **tx)
                    .await
                    .map_err(Error::QueryInTransaction)?;
                return Ok(Box::new(SqlRows::new(rows)));
            }
            // Wrong driver variant: fall through to the pool path.
        }

        let rows = bind_args(sql, args)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Query)?;
        Ok(Box::new(SqlRows::new(rows)))
    }

    async fn exec(&self, ctx: &Context, sql: &str, args: &[SqlValue]) -> Result<()> {
        if let Some(handle) = current_transaction(ctx) {
            if let Some(own) = handle.as_any().downcast_ref::<SqlTransaction>() {
                let mut guard = own.inner.lock().await;
                let tx = guard.as_mut().ok_or(Error::TransactionClosed)?;
                bind_args(sql, args)
                    .execute(&mut **tx)
                    .await
                    .map_err(Error::ExecInTransaction)?;
                return Ok(());
            }
        }

        bind_args(sql, args)
            .execute(&self.pool)
            .await
            .map_err(Error::Exec)?;
        Ok(())
    }
}

fn bind_args<'q>(
    sql: &'q str,
    args: &'q [SqlValue],
) -> sqlx::query::Query<'q, Any, AnyArguments<'q>> {
    let mut query = sqlx::query(sql);
    for arg in args {
        query = match arg {
            SqlValue::Null => query.bind(None::<String>),
            SqlValue::Bool(v) => query.bind(*v),
            SqlValue::Int(v) => query.bind(*v),
            SqlValue::Float(v) => query.bind(*v),
            SqlValue::Text(v) => query.bind(v.as_str()),
        };
    }
    query
}

/// Forward-only cursor over buffered `Any` rows; columns decode lazily at
/// scan time.
struct SqlRows {
    rows: VecDeque<AnyRow>,
    current: Option<AnyRow>,
}

impl SqlRows {
    fn new(rows: Vec<AnyRow>) -> Self {
        Self {
            rows: rows.into(),
            current: None,
        }
    }
}

impl Rows for SqlRows {
    fn next(&mut self) -> bool {
        self.current = self.rows.pop_front();
        self.current.is_some()
    }

    fn scan(&mut self, dest: &mut [&mut dyn ScanTarget]) -> Result<()> {
        let row = self.current.as_ref().ok_or(Error::NoRow)?;
        let values = (0..row.len())
            .map(|index| decode_column(row, index))
            .collect::<Result<Vec<_>>>()?;
        assign_row(&values, dest)
    }

    fn close(&mut self) {
        self.rows.clear();
        self.current = None;
    }
}

/// Decodes one column by categorizing the driver-reported type name. The
/// `Any` driver normalizes names (BOOL, SMALLINT, INTEGER, BIGINT, REAL,
/// DOUBLE, TEXT), but matching stays substring-based so per-backend aliases
/// also land in the right bucket.
fn decode_column(row: &AnyRow, index: usize) -> Result<SqlValue> {
    let raw = row
        .try_get_raw(index)
        .map_err(|e| Error::Decode(format!("column {index}: {e}")))?;
    if raw.is_null() {
        return Ok(SqlValue::Null);
    }
    let type_name = raw.type_info().name().to_ascii_uppercase();

    let decode_err = |e: sqlx::Error| Error::Decode(format!("column {index} ({type_name}): {e}"));

    if type_name.contains("BOOL") {
        Ok(SqlValue::Bool(row.try_get(index).map_err(decode_err)?))
    } else if type_name.contains("INT") {
        Ok(SqlValue::Int(row.try_get(index).map_err(decode_err)?))
    } else if ["REAL", "DOUBLE", "FLOAT", "NUMERIC", "DECIMAL"]
        .iter()
        .any(|t| type_name.contains(t))
    {
        Ok(SqlValue::Float(row.try_get(index).map_err(decode_err)?))
    } else if ["TEXT", "CHAR", "CLOB", "STRING", "NAME"]
        .iter()
        .any(|t| type_name.contains(t))
    {
        Ok(SqlValue::Text(row.try_get(index).map_err(decode_err)?))
    } else {
        // Last resort for backend-specific names: anything textual decodes.
        row.try_get::<String, _>(index)
            .map(SqlValue::Text)
            .map_err(|_| Error::Decode(format!("column {index}: unsupported type {type_name}")))
    }
}
