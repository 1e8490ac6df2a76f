//! Similarity query assembly
//!
//! A [`SearchQuery`] holds the assembled predicates once; it can then be
//! rendered two ways:
//!
//! - [`SearchQuery::render_execution`] produces the `$n` template and the
//!   ordered scalar parameters. This is the only form sent to the store.
//! - [`SearchQuery::render_display`] inlines scalar values for operators to
//!   read. It is never executed.

use crate::types::{FilterSpec, RatingCategory};
use crate::{MurmurError, Result};
use serde::Serialize;
use std::fmt;
use tracing::warn;

/// Default feedback table
pub const DEFAULT_FEEDBACK_TABLE: &str = "service_feedback";

/// Cosine distance between the stored vector and the bound query embedding
const DISTANCE_EXPR: &str = "(sf.feedback_vector <=> $1::vector)";

/// Validated SQL table name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableName(String);

impl TableName {
    /// Validate a table name (optionally schema-qualified) for safe inlining
    pub fn parse(name: &str) -> Result<Self> {
        if name.len() > 64 {
            warn!("Rejected table name due to length: {} chars", name.len());
            return Err(MurmurError::config(format!(
                "Table name too long: {} (max 64 characters)",
                name.len()
            )));
        }
        let valid_part = |part: &str| {
            !part.is_empty()
                && !part.starts_with(|c: char| c.is_ascii_digit())
                && part.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        };
        let parts: Vec<&str> = name.split('.').collect();
        if parts.len() > 2 || !parts.iter().all(|p| valid_part(p)) {
            warn!("Rejected table name with invalid characters: {}", name);
            return Err(MurmurError::config(format!(
                "Invalid table name '{}': only alphanumeric characters and underscores allowed",
                name
            )));
        }
        Ok(Self(name.to_string()))
    }

    /// Table name as written in SQL
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TableName {
    fn default() -> Self {
        Self(DEFAULT_FEEDBACK_TABLE.to_string())
    }
}

/// Which columns a search returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Projection {
    /// Every feedback column plus the distance
    #[default]
    Full,
    /// Feedback text, overall rating and distance
    Compact,
}

impl Projection {
    fn columns(self) -> &'static [&'static str] {
        match self {
            Projection::Full => &[
                "sf.feedback_id",
                "sf.customer_id",
                "sf.schedule_id",
                "sf.feedback_text",
                "sf.rating_quality_of_work",
                "sf.rating_timeliness",
                "sf.rating_politeness",
                "sf.rating_cleanliness",
                "sf.rating_overall_experience",
                "sf.feedback_date",
            ],
            Projection::Compact => &["sf.feedback_text", "sf.rating_overall_experience"],
        }
    }
}

/// A scalar value bound to a placeholder
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryParam {
    /// Integer (rating ceilings)
    Int(i32),
    /// Float (distance threshold)
    Float(f64),
    /// Text (substring filter)
    Text(String),
}

impl QueryParam {
    /// SQL literal for display rendering only
    fn display_literal(&self) -> String {
        match self {
            QueryParam::Int(v) => v.to_string(),
            QueryParam::Float(v) => v.to_string(),
            QueryParam::Text(v) => format!("'{}'", v.replace('\'', "''")),
        }
    }
}

impl fmt::Display for QueryParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_literal())
    }
}

/// Kind of WHERE predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredicateKind {
    /// Exclude rows with no stored embedding
    HasEmbedding,
    /// Cosine distance at most a threshold
    MaxDistance,
    /// Rating at most a ceiling
    MaxRating(RatingCategory),
    /// Case-insensitive substring of the feedback text
    TextContains,
}

/// One WHERE predicate with its optional bound value
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    kind: PredicateKind,
    param: Option<QueryParam>,
}

impl Predicate {
    /// Predicate kind
    pub fn kind(&self) -> PredicateKind {
        self.kind
    }

    /// Bound value, if the predicate takes one
    pub fn param(&self) -> Option<&QueryParam> {
        self.param.as_ref()
    }

    fn render(&self, slot: &str) -> String {
        match self.kind {
            PredicateKind::HasEmbedding => "sf.feedback_vector IS NOT NULL".to_string(),
            PredicateKind::MaxDistance => format!("{} <= {}", DISTANCE_EXPR, slot),
            PredicateKind::MaxRating(category) => format!("sf.{} <= {}", category.column(), slot),
            PredicateKind::TextContains => {
                format!("strpos(lower(sf.feedback_text), lower({})) > 0", slot)
            }
        }
    }
}

/// Template and ordered scalar parameters ready for binding.
///
/// `$1` is always the query embedding; `params[i]` binds to `$(i + 2)`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionQuery {
    /// SQL template with `$n` placeholders
    pub sql: String,
    /// Scalar parameters in placeholder order, embedding excluded
    pub params: Vec<QueryParam>,
}

/// Assembled similarity search
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    table: TableName,
    projection: Projection,
    predicates: Vec<Predicate>,
    top_n: u32,
}

impl SearchQuery {
    /// Predicates in WHERE order
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Scalar parameters in placeholder order
    pub fn params(&self) -> Vec<QueryParam> {
        self.predicates
            .iter()
            .filter_map(|p| p.param.clone())
            .collect()
    }

    /// Placeholders in the execution template, embedding included
    pub fn placeholder_count(&self) -> usize {
        1 + self.predicates.iter().filter(|p| p.param.is_some()).count()
    }

    /// Row limit
    pub fn top_n(&self) -> u32 {
        self.top_n
    }

    fn render_with(&self, mut slot: impl FnMut(&QueryParam) -> String) -> String {
        let columns: Vec<String> = self
            .projection
            .columns()
            .iter()
            .map(|c| format!("    {}", c))
            .chain(std::iter::once(format!(
                "    {}::float8 AS distance",
                DISTANCE_EXPR
            )))
            .collect();

        let clauses: Vec<String> = self
            .predicates
            .iter()
            .map(|p| match &p.param {
                Some(param) => p.render(&slot(param)),
                None => p.render(""),
            })
            .collect();

        format!(
            "SELECT\n{}\nFROM {} sf\nWHERE\n    {}\nORDER BY distance ASC\nLIMIT {}",
            columns.join(",\n"),
            self.table.as_str(),
            clauses.join("\n    AND "),
            self.top_n
        )
    }

    /// Parameter-bound form; the only rendering ever executed
    pub fn render_execution(&self) -> ExecutionQuery {
        let mut next = 1;
        let sql = self.render_with(|_| {
            next += 1;
            format!("${}", next)
        });
        ExecutionQuery {
            sql,
            params: self.params(),
        }
    }

    /// Human-readable preview with scalar values inlined; never executed
    pub fn render_display(&self) -> String {
        format!(
            "-- $1 = embedding of the query text\n{};",
            self.render_with(QueryParam::display_literal)
        )
    }
}

/// Builds [`SearchQuery`] values from validated filters
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    table: TableName,
    projection: Projection,
}

impl QueryBuilder {
    /// Builder targeting the default feedback table with every column
    pub fn new() -> Self {
        Self::default()
    }

    /// Target a different feedback table
    pub fn table(mut self, table: TableName) -> Self {
        self.table = table;
        self
    }

    /// Select a different column set
    pub fn projection(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }

    /// Assemble the predicates for a filter. Pure and total.
    pub fn build(&self, filter: &FilterSpec) -> SearchQuery {
        let mut predicates = vec![Predicate {
            kind: PredicateKind::HasEmbedding,
            param: None,
        }];

        if let Some(threshold) = filter.distance_threshold() {
            predicates.push(Predicate {
                kind: PredicateKind::MaxDistance,
                param: Some(QueryParam::Float(threshold)),
            });
        }

        for (category, ceiling) in filter.rating_ceilings() {
            predicates.push(Predicate {
                kind: PredicateKind::MaxRating(category),
                param: Some(QueryParam::Int(ceiling)),
            });
        }

        if let Some(text) = filter.text_contains() {
            predicates.push(Predicate {
                kind: PredicateKind::TextContains,
                param: Some(QueryParam::Text(text.to_string())),
            });
        }

        SearchQuery {
            table: self.table.clone(),
            projection: self.projection,
            predicates,
            top_n: filter.top_n(),
        }
    }
}
