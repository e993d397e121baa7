use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::postgres::PgRow;
use sqlx::{Column, PgPool, Row as _, TypeInfo, ValueRef};
use tracing::debug;
use uuid::Uuid;

use super::{timestamp_value, QueryExecutor, Row, SqlParam, StoreError};

/// Store adapter over a sqlx Postgres pool.
pub struct PooledExecutor {
    pool: PgPool,
}

impl PooledExecutor {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QueryExecutor for PooledExecutor {
    async fn query(&self, sql: &str, params: &[SqlParam]) -> Result<Vec<Row>, StoreError> {
        // Returned to the pool when `conn` drops, whichever way this function exits.
        let mut conn = self.pool.acquire().await?;

        let mut query = sqlx::query(sql);
        for param in params {
            query = match param {
                SqlParam::Text(v) => query.bind(v.as_str()),
                SqlParam::NullableText(v) => query.bind(v.as_deref()),
                SqlParam::Int(v) => query.bind(*v),
            };
        }

        let rows = query.fetch_all(&mut *conn).await?;
        debug!("Pooled query returned {} row(s)", rows.len());

        rows.iter().map(row_to_json).collect()
    }

    fn backend(&self) -> &'static str {
        "pool"
    }
}

/// Converts a Postgres row into the column-keyed JSON shape shared by all adapters.
fn row_to_json(row: &PgRow) -> Result<Row, StoreError> {
    let mut out = Row::new();

    for column in row.columns() {
        let idx = column.ordinal();
        let name = column.name().to_string();

        if row.try_get_raw(idx)?.is_null() {
            out.insert(name, Value::Null);
            continue;
        }

        let value = match column.type_info().name() {
            "BOOL" => Value::Bool(row.try_get::<bool, _>(idx)?),
            "INT2" => Value::from(row.try_get::<i16, _>(idx)?),
            "INT4" => Value::from(row.try_get::<i32, _>(idx)?),
            "INT8" => Value::from(row.try_get::<i64, _>(idx)?),
            "FLOAT4" => Value::from(row.try_get::<f32, _>(idx)? as f64),
            "FLOAT8" => Value::from(row.try_get::<f64, _>(idx)?),
            "TIMESTAMPTZ" => timestamp_value(row.try_get::<DateTime<Utc>, _>(idx)?),
            "TIMESTAMP" => timestamp_value(row.try_get::<NaiveDateTime, _>(idx)?.and_utc()),
            "DATE" => Value::String(row.try_get::<NaiveDate, _>(idx)?.to_string()),
            "JSON" | "JSONB" => row.try_get::<Value, _>(idx)?,
            "UUID" => Value::String(row.try_get::<Uuid, _>(idx)?.to_string()),
            "NUMERIC" => Value::String(row.try_get::<Decimal, _>(idx)?.to_string()),
            "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" => Value::String(row.try_get::<String, _>(idx)?),
            // Enums, citext and friends are sent as plain text even in binary format.
            other => Value::String(row.try_get_unchecked::<String, _>(idx).map_err(|e| {
                StoreError::Decode(format!("column '{name}' of type {other}: {e}"))
            })?),
        };
        out.insert(name, value);
    }

    Ok(out)
}
