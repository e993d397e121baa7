//! Serverless SQL-over-HTTP adapter.
//!
//! Each query is one stateless `POST https://<host>/sql` carrying the
//! connection string in a header, so there is no connection to acquire or close.
//! Values come back as Postgres text output and are decoded here by type OID.

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::{timestamp_value, QueryExecutor, Row, SqlParam, StoreError};

const OID_BOOL: u32 = 16;
const OID_INT8: u32 = 20;
const OID_INT2: u32 = 21;
const OID_INT4: u32 = 23;
const OID_JSON: u32 = 114;
const OID_FLOAT4: u32 = 700;
const OID_FLOAT8: u32 = 701;
const OID_TIMESTAMP: u32 = 1114;
const OID_TIMESTAMPTZ: u32 = 1184;
const OID_JSONB: u32 = 3802;

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    query: &'a str,
    params: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct QueryField {
    name: String,
    #[serde(rename = "dataTypeID")]
    data_type_id: u32,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    fields: Vec<QueryField>,
    #[serde(default)]
    rows: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct RemoteError {
    message: String,
}

pub struct HttpExecutor {
    client: Client,
    endpoint: Url,
    connection_string: String,
}

impl HttpExecutor {
    /// Derives the `/sql` endpoint from the host part of a `postgres://` URL.
    pub fn from_connection_string(connection_string: &str) -> anyhow::Result<Self> {
        let endpoint = sql_endpoint(connection_string)?;
        debug!("HTTP store endpoint: {endpoint}");
        Ok(Self::with_client(Client::new(), endpoint, connection_string))
    }

    fn with_client(client: Client, endpoint: Url, connection_string: &str) -> Self {
        Self {
            client,
            endpoint,
            connection_string: connection_string.to_string(),
        }
    }
}

#[async_trait]
impl QueryExecutor for HttpExecutor {
    async fn query(&self, sql: &str, params: &[SqlParam]) -> Result<Vec<Row>, StoreError> {
        let body = QueryRequest {
            query: sql,
            params: params.iter().map(encode_param).collect(),
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .header("Neon-Connection-String", &self.connection_string)
            .header("Neon-Raw-Text-Output", "true")
            .header("Neon-Array-Mode", "true")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<RemoteError>(&text)
                .map(|e| e.message)
                .unwrap_or(text);
            warn!("HTTP store rejected query (status {status}): {message}");
            return Err(StoreError::Remote {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: QueryResponse = response.json().await?;
        decode_response(parsed)
    }

    fn backend(&self) -> &'static str {
        "http"
    }
}

fn sql_endpoint(connection_string: &str) -> anyhow::Result<Url> {
    let parsed = Url::parse(connection_string).context("Connection string is not a valid URL")?;
    let host = parsed
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| anyhow!("Connection string has no host"))?;
    Url::parse(&format!("https://{host}/sql")).context("Could not build SQL endpoint URL")
}

/// Parameters travel as text, the same way Postgres receives them on the wire.
fn encode_param(param: &SqlParam) -> Value {
    match param {
        SqlParam::Text(v) => Value::String(v.clone()),
        SqlParam::NullableText(Some(v)) => Value::String(v.clone()),
        SqlParam::NullableText(None) => Value::Null,
        SqlParam::Int(v) => Value::String(v.to_string()),
    }
}

fn decode_response(response: QueryResponse) -> Result<Vec<Row>, StoreError> {
    response
        .rows
        .into_iter()
        .map(|values| {
            if values.len() != response.fields.len() {
                return Err(StoreError::Decode(format!(
                    "row has {} values but {} fields were described",
                    values.len(),
                    response.fields.len()
                )));
            }
            response
                .fields
                .iter()
                .zip(values)
                .map(|(field, value)| {
                    Ok::<_, StoreError>((field.name.clone(), decode_value(field, value)?))
                })
                .collect()
        })
        .collect()
}

fn decode_value(field: &QueryField, value: Value) -> Result<Value, StoreError> {
    let text = match value {
        Value::String(text) => text,
        // Already typed (or null): nothing to decode.
        other => return Ok(other),
    };

    let bad = |what: &str| {
        StoreError::Decode(format!("column '{}': invalid {what} '{text}'", field.name))
    };

    let decoded = match field.data_type_id {
        OID_BOOL => match text.as_str() {
            "t" | "true" => Value::Bool(true),
            "f" | "false" => Value::Bool(false),
            _ => return Err(bad("boolean")),
        },
        OID_INT2 | OID_INT4 | OID_INT8 => {
            Value::from(text.parse::<i64>().map_err(|_| bad("integer"))?)
        }
        OID_FLOAT4 | OID_FLOAT8 => Value::from(text.parse::<f64>().map_err(|_| bad("float"))?),
        OID_TIMESTAMPTZ => {
            timestamp_value(parse_timestamptz(&text).ok_or_else(|| bad("timestamptz"))?)
        }
        OID_TIMESTAMP => {
            let naive = parse_naive_timestamp(&text).ok_or_else(|| bad("timestamp"))?;
            timestamp_value(naive.and_utc())
        }
        OID_JSON | OID_JSONB => serde_json::from_str(&text).map_err(|_| bad("json"))?,
        _ => Value::String(text.clone()),
    };
    Ok(decoded)
}

/// Postgres text output for timestamptz looks like `2024-05-01 09:30:00.123+00`.
fn parse_timestamptz(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f%#z")
        .or_else(|_| DateTime::parse_from_rfc3339(text))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_naive_timestamp(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
}
