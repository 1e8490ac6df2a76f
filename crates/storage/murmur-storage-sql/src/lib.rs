//! Murmur SQL storage
//!
//! Similarity search over a PostgreSQL feedback table with `pgvector`:
//! scoped sessions, parameter binding with arity checks, and the
//! embed/build/execute pipeline behind [`FeedbackSearch`].

#![warn(missing_docs)]
#![warn(clippy::all)]

// Re-exports
pub use murmur_core;

pub mod executor;
pub mod search;
pub mod session;

pub use executor::QueryExecutor;
pub use search::{FeedbackSearch, SearchOutcome, SearchService};
pub use session::{StoreSession, APPLICATION_NAME};
