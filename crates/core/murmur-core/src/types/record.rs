//! Raw result sets and the feedback records shaped from them

use super::filter::RatingCategory;
use crate::{MurmurError, Result};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single decoded cell from the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// SQL NULL
    Null,
    /// Boolean
    Bool(bool),
    /// Any integer width
    Int(i64),
    /// Any float width
    Float(f64),
    /// Text of any kind
    Text(String),
    /// Timestamp without zone
    Timestamp(NaiveDateTime),
    /// Calendar date
    Date(NaiveDate),
}

impl CellValue {
    /// Whether the cell is NULL
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    fn as_i64(&self) -> Option<i64> {
        match self {
            CellValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }
}

/// NULL renders as an empty string
impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Bool(v) => write!(f, "{}", v),
            CellValue::Int(v) => write!(f, "{}", v),
            CellValue::Float(v) => write!(f, "{}", v),
            CellValue::Text(v) => f.write_str(v),
            CellValue::Timestamp(v) => write!(f, "{}", v),
            CellValue::Date(v) => write!(f, "{}", v),
        }
    }
}

/// Column names plus row tuples exactly as the store returned them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawResult {
    /// Column names in select order
    pub columns: Vec<String>,
    /// Rows, each with one cell per column
    pub rows: Vec<Vec<CellValue>>,
}

impl RawResult {
    /// Build a raw result
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self { columns, rows }
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether no rows came back
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// A feedback row returned by a similarity search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    /// Feedback identifier
    pub feedback_id: Option<i64>,
    /// Customer who left the feedback
    pub customer_id: Option<i64>,
    /// Service appointment the feedback refers to
    pub schedule_id: Option<i64>,
    /// Free-text feedback
    pub feedback_text: String,
    /// Ratings that were selected, keyed by category
    pub ratings: BTreeMap<RatingCategory, i64>,
    /// When the feedback was recorded
    pub feedback_date: Option<NaiveDateTime>,
    /// Cosine distance from the query embedding; only present in results
    pub distance: f64,
}

impl FeedbackRecord {
    fn from_row(raw: &RawResult, row: &[CellValue]) -> Result<Self> {
        let cell = |name: &str| raw.column_index(name).and_then(|i| row.get(i));
        let int = |name: &str| cell(name).and_then(CellValue::as_i64);

        let distance = match cell("distance") {
            Some(value) => value.as_f64().ok_or_else(|| {
                decode_error(format!("column 'distance' is not numeric: {:?}", value))
            })?,
            None => return Err(sqlx::Error::ColumnNotFound("distance".to_string()).into()),
        };

        let feedback_text = match cell("feedback_text") {
            Some(CellValue::Text(text)) => text.clone(),
            Some(CellValue::Null) => String::new(),
            Some(other) => {
                return Err(decode_error(format!(
                    "column 'feedback_text' is not text: {:?}",
                    other
                )))
            }
            None => {
                return Err(sqlx::Error::ColumnNotFound("feedback_text".to_string()).into())
            }
        };

        let ratings = RatingCategory::ALL
            .into_iter()
            .filter_map(|c| int(c.column()).map(|v| (c, v)))
            .collect();

        let feedback_date = match cell("feedback_date") {
            Some(CellValue::Timestamp(ts)) => Some(*ts),
            Some(CellValue::Date(d)) => d.and_hms_opt(0, 0, 0),
            _ => None,
        };

        Ok(Self {
            feedback_id: int("feedback_id"),
            customer_id: int("customer_id"),
            schedule_id: int("schedule_id"),
            feedback_text,
            ratings,
            feedback_date,
            distance,
        })
    }
}

fn decode_error(msg: String) -> MurmurError {
    MurmurError::QueryExecution(sqlx::Error::Decode(msg.into()))
}

/// Search results, closest match first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    records: Vec<FeedbackRecord>,
}

impl QueryResult {
    /// Order records by ascending distance.
    ///
    /// The sort is stable, so equal distances keep the store's row order.
    pub fn from_records(mut records: Vec<FeedbackRecord>) -> Self {
        records.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        Self { records }
    }

    /// Shape raw store rows into records
    pub fn from_raw(raw: &RawResult) -> Result<Self> {
        let records = raw
            .rows
            .iter()
            .map(|row| FeedbackRecord::from_row(raw, row))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_records(records))
    }

    /// Keep at most `len` closest records
    pub fn truncate(&mut self, len: usize) {
        self.records.truncate(len);
    }

    /// Records in ascending distance order
    pub fn records(&self) -> &[FeedbackRecord] {
        &self.records
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the search matched nothing
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Consume into the record list
    pub fn into_records(self) -> Vec<FeedbackRecord> {
        self.records
    }
}
