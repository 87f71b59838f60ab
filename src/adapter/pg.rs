//! PostgreSQL-native adapter over [`sqlx::PgPool`].
//!
//! Same contract as the generic adapter, but statements run on the pipelined
//! Postgres driver and columns decode with Postgres-strict typing: each
//! integer width is read at its declared size rather than coerced by the
//! driver.

use std::any::Any;
use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::{PgPool, Postgres, Row as _, Transaction, TypeInfo as _, ValueRef as _};
use tokio::sync::Mutex;

use crate::adapter::Adapter;
use crate::context::Context;
use crate::error::{Error, Result};
use crate::handle::{current_transaction, TransactionHandle};
use crate::rows::Rows;
use crate::value::{assign_row, ScanTarget, SqlValue};

/// Adapter over a PostgreSQL connection pool.
///
/// Select this via
/// [`TransactionManagerBuilder::pg_adapter`](crate::TransactionManagerBuilder::pg_adapter).
pub struct PgAdapter {
    pool: PgPool,
}

impl PgAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Handle variant wrapping a live Postgres transaction.
struct PgTransaction {
    inner: Mutex<Option<Transaction<'static, Postgres>>>,
}

#[async_trait]
impl TransactionHandle for PgTransaction {
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

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[async_trait]
impl Adapter for PgAdapter {
    async fn begin(&self, _ctx: &Context) -> Result<Arc<dyn TransactionHandle>> {
        let tx = self.pool.begin().await.map_err(Error::Begin)?;
        Ok(Arc::new(PgTransaction {
            inner: Mutex::new(Some(tx)),
        }))
    }

    async fn query(&self, ctx: &Context, sql: &str, args: &[SqlValue]) -> Result<Box<dyn Rows>> {
        if let Some(handle) = current_transaction(ctx) {
            if let Some(own) = handle.as_any().downcast_ref::<PgTransaction>() {
                let mut guard = own.inner.lock().await;
                let tx = guard.as_mut().ok_or(Error::TransactionClosed)?;
                let rows = bind_args(sql, args)
                    .fetch_all(&mut **tx)
                    .await
                    .map_err(Error::QueryInTransaction)?;
                return Ok(Box::new(PgRows::new(rows)));
            }
            // Wrong driver variant: fall through to the pool path.
        }

        let rows = bind_args(sql, args)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Query)?;
        Ok(Box::new(PgRows::new(rows)))
    }

    async fn exec(&self, ctx: &Context, sql: &str, args: &[SqlValue]) -> Result<()> {
        if let Some(handle) = current_transaction(ctx) {
            if let Some(own) = handle.as_any().downcast_ref::<PgTransaction>() {
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
) -> sqlx::query::Query<'q, Postgres, PgArguments> {
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

/// Forward-only cursor over buffered Postgres rows.
struct PgRows {
    rows: VecDeque<PgRow>,
    current: Option<PgRow>,
}

impl PgRows {
    fn new(rows: Vec<PgRow>) -> Self {
        Self {
            rows: rows.into(),
            current: None,
        }
    }
}

impl Rows for PgRows {
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

fn decode_column(row: &PgRow, index: usize) -> Result<SqlValue> {
    let raw = row
        .try_get_raw(index)
        .map_err(|e| Error::Decode(format!("column {index}: {e}")))?;
    if raw.is_null() {
        return Ok(SqlValue::Null);
    }
    let type_name = raw.type_info().name().to_ascii_uppercase();

    let decode_err = |e: sqlx::Error| Error::Decode(format!("column {index} ({type_name}): {e}"));

    match type_name.as_str() {
        "BOOL" => Ok(SqlValue::Bool(row.try_get(index).map_err(decode_err)?)),
        "INT2" => Ok(SqlValue::Int(
            row.try_get::<i16, _>(index).map_err(decode_err)?.into(),
        )),
        "INT4" => Ok(SqlValue::Int(
            row.try_get::<i32, _>(index).map_err(decode_err)?.into(),
        )),
        "INT8" => Ok(SqlValue::Int(row.try_get(index).map_err(decode_err)?)),
        "FLOAT4" => Ok(SqlValue::Float(
            row.try_get::<f32, _>(index).map_err(decode_err)?.into(),
        )),
        "FLOAT8" => Ok(SqlValue::Float(row.try_get(index).map_err(decode_err)?)),
        "TEXT" | "VARCHAR" | "CHAR" | "BPCHAR" | "NAME" => {
            Ok(SqlValue::Text(row.try_get(index).map_err(decode_err)?))
        }
        other => Err(Error::Decode(format!(
            "column {index}: unsupported type {other}"
        ))),
    }
}
