//! Binding and execution of similarity queries

use crate::session::StoreSession;
use murmur_core::{
    check_arity, CellValue, Embedding, ExecutionQuery, MurmurError, QueryParam, RawResult, Result,
};
use sqlx::postgres::{PgArguments, PgRow, PgValueFormat};
use sqlx::query::Query;
use sqlx::{Column, Postgres, Row, TypeInfo, ValueRef};
use tracing::{debug, warn};

/// Binds the embedding and scalar parameters and runs the template.
///
/// `$1` is the embedding as a pgvector text literal; `params[i]` binds to
/// `$(i + 2)`. Nothing is retried.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryExecutor;

impl QueryExecutor {
    /// Create an executor
    pub fn new() -> Self {
        Self
    }

    /// Check that `query` takes exactly the embedding plus its parameters
    pub fn check(query: &ExecutionQuery) -> Result<()> {
        check_arity(&query.sql, 1 + query.params.len())
    }

    /// Bind every value to the template. Fails before any I/O on an arity mismatch.
    pub fn bind<'q>(
        query: &'q ExecutionQuery,
        embedding: &Embedding,
    ) -> Result<Query<'q, Postgres, PgArguments>> {
        Self::check(query)?;

        let mut bound = sqlx::query(&query.sql).bind(embedding.to_vector_literal());
        for param in &query.params {
            bound = match param {
                QueryParam::Int(v) => bound.bind(*v),
                QueryParam::Float(v) => bound.bind(*v),
                QueryParam::Text(v) => bound.bind(v.as_str()),
            };
        }
        Ok(bound)
    }

    /// Execute on a live session and collect every row.
    ///
    /// With zero rows the store reports no column metadata, so `columns` is
    /// empty too.
    pub async fn execute(
        &self,
        session: &mut StoreSession,
        query: &ExecutionQuery,
        embedding: &Embedding,
    ) -> Result<RawResult> {
        let bound = Self::bind(query, embedding)?;
        debug!(
            "Executing similarity query with {} scalar parameter(s)",
            query.params.len()
        );

        let rows = bound.fetch_all(session.connection()).await.map_err(|e| {
            warn!("Similarity query failed: {}", e);
            MurmurError::QueryExecution(e)
        })?;

        let columns = rows
            .first()
            .map(|row| row.columns().iter().map(|c| c.name().to_string()).collect())
            .unwrap_or_default();
        let rows = rows.iter().map(decode_row).collect::<Result<Vec<_>>>()?;

        debug!("Similarity query returned {} row(s)", rows.len());
        Ok(RawResult::new(columns, rows))
    }
}

fn decode_row(row: &PgRow) -> Result<Vec<CellValue>> {
    (0..row.len()).map(|i| decode_cell(row, i)).collect()
}

fn decode_cell(row: &PgRow, index: usize) -> Result<CellValue> {
    let (type_name, text) = {
        let raw = row.try_get_raw(index)?;
        if raw.is_null() {
            return Ok(CellValue::Null);
        }
        let text = match raw.format() {
            PgValueFormat::Text => raw.as_str().ok().map(str::to_string),
            PgValueFormat::Binary => None,
        };
        (raw.type_info().name().to_string(), text)
    };

    let value = match type_name.as_str() {
        "INT2" => CellValue::Int(row.try_get::<i16, _>(index)?.into()),
        "INT4" => CellValue::Int(row.try_get::<i32, _>(index)?.into()),
        "INT8" => CellValue::Int(row.try_get::<i64, _>(index)?),
        "FLOAT4" => CellValue::Float(row.try_get::<f32, _>(index)?.into()),
        "FLOAT8" => CellValue::Float(row.try_get::<f64, _>(index)?),
        "BOOL" => CellValue::Bool(row.try_get::<bool, _>(index)?),
        "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" => CellValue::Text(row.try_get::<String, _>(index)?),
        "UUID" => CellValue::Text(row.try_get::<sqlx::types::Uuid, _>(index)?.to_string()),
        "TIMESTAMP" => CellValue::Timestamp(row.try_get::<chrono::NaiveDateTime, _>(index)?),
        "TIMESTAMPTZ" => CellValue::Timestamp(
            row.try_get::<chrono::DateTime<chrono::Utc>, _>(index)?
                .naive_utc(),
        ),
        "DATE" => CellValue::Date(row.try_get::<chrono::NaiveDate, _>(index)?),
        "JSON" | "JSONB" => {
            CellValue::Text(row.try_get::<serde_json::Value, _>(index)?.to_string())
        }
        other => {
            let column = row.column(index).name();
            warn!(
                "Column '{}' has type {} with no decoder; showing it as text",
                column, other
            );
            fallback_cell(other, text)
        }
    };
    Ok(value)
}

/// Cell for a type without a decoder: the text form when the server sent one
fn fallback_cell(type_name: &str, text: Option<String>) -> CellValue {
    CellValue::Text(text.unwrap_or_else(|| format!("<{}>", type_name.to_lowercase())))
}
