//! Query assembly and placeholder checks

pub mod builder;
pub mod placeholders;

pub use builder::{
    ExecutionQuery, Predicate, PredicateKind, Projection, QueryBuilder, QueryParam, SearchQuery,
    TableName, DEFAULT_FEEDBACK_TABLE,
};
pub use placeholders::{check_arity, count_placeholders, placeholder_indices};
