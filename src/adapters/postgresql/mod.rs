//! PostgreSQL integration
//!
//! Source database access: the pooled client, per-table query definitions,
//! and the cursor-based [`PostgresExtractor`].

pub mod client;
pub mod extractor;
pub mod tables;

pub use client::PostgreSQLClient;
pub use extractor::{registered_extractors, PostgresExtractor};
pub use tables::{table_query, TableQuery};
