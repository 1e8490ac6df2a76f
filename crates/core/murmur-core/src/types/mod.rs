//! Core type definitions for Murmur

pub mod embedding;
pub mod filter;
pub mod record;

// Re-export commonly used types
pub use embedding::*;
pub use filter::*;
pub use record::*;
