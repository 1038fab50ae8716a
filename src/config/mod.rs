//! Configuration management for Stockpile.
//!
//! Stockpile uses a TOML configuration file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `STOCKPILE_<SECTION>_<KEY>` environment overrides
//! - Default values for optional settings
//! - Validation on load
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [storage]
//! target = "s3"
//!
//! [storage.s3]
//! bucket = "analytics-exports"
//! key_prefix = "stockpile/daily"
//! region = "eu-west-1"
//!
//! [postgresql]
//! connection_string = "${STOCKPILE_DATABASE_URL}"
//!
//! [export]
//! max_concurrent_tables = 6
//!
//! [retention]
//! months = 3
//! ```
//!
//! # Loading
//!
//! ```rust,no_run
//! use stockpile::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("stockpile.toml")?;
//! println!("Storage target: {:?}", config.storage.target);
//! # Ok(())
//! # }
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, parse_config};
pub use schema::{
    ApplicationConfig, ExportConfig, LocalStorageConfig, LoggingConfig, PostgreSQLConfig,
    RetentionConfig, S3StorageConfig, StockpileConfig, StorageConfig, StorageTarget,
};
pub use secret::{secret_string, SecretString, SecretValue};
