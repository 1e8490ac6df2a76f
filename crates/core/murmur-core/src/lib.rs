//! Murmur Core
//!
//! Types and pure logic for semantic search over customer feedback:
//!
//! - Filter validation and normalization ([`FilterSpec`])
//! - Parameterized similarity query assembly ([`QueryBuilder`])
//! - Placeholder arity checks shared with the executor
//! - Fixed-width result tables ([`ResultFormatter`])
//! - Environment configuration, credentials and the per-process [`SearchContext`]
//!
//! # Example
//!
//! ```
//! use murmur_core::*;
//!
//! let mut raw = RawFilter { top_n: 10, ..Default::default() };
//! raw.ratings.insert(RatingCategory::OverallExperience, 3);
//! let filter = FilterSpec::validate(raw).unwrap();
//!
//! let query = QueryBuilder::new().build(&filter);
//! let exec = query.render_execution();
//! assert_eq!(exec.params.len() + 1, count_placeholders(&exec.sql));
//! println!("{}", query.render_display());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod context;
pub mod credentials;
pub mod error;
pub mod formatter;
pub mod provider;
pub mod query;
pub mod types;
pub mod utils;

pub use config::{
    get_env, get_env_or, get_env_parsed, get_required_env, load_env, load_env_from_path,
    validate_env, EmbeddingSettings, SearchSettings, StoreSettings,
};
pub use context::SearchContext;
pub use credentials::{
    AccessToken, StaticTokenCredential, TokenCredential, OPENAI_SCOPE, SQL_SCOPE,
};
pub use error::{MurmurError, Result};
pub use formatter::{ResultFormatter, DEFAULT_MAX_WIDTH, NO_ROWS_MESSAGE};
pub use provider::EmbeddingProvider;
pub use query::{
    check_arity, count_placeholders, ExecutionQuery, Predicate, PredicateKind, Projection,
    QueryBuilder, QueryParam, SearchQuery, TableName,
};
pub use types::*;
pub use utils::{init_logging, init_logging_with};
