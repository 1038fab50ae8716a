//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Stockpile configuration file.

use crate::adapters::postgresql::PostgreSQLClient;
use crate::adapters::storage::create_export_storage;
use crate::cli::commands::{EXIT_CONFIG_ERROR, EXIT_FAILURE, EXIT_SUCCESS};
use crate::config::{load_config, StockpileConfig, StorageTarget};
use crate::domain::Result;
use clap::Args;
use secrecy::ExposeSecret;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Also connect to PostgreSQL and the storage backend
    #[arg(long)]
    pub check_connection: bool,
}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // Loading also validates
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG_ERROR);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        for line in summary_lines(&config) {
            println!("  {line}");
        }
        println!();

        if self.check_connection {
            if let Err(e) = check_connections(&config).await {
                println!("❌ Connection check failed");
                println!("   Error: {e}");
                return Ok(EXIT_FAILURE);
            }
            println!("✅ PostgreSQL and storage are reachable");
        }

        Ok(EXIT_SUCCESS)
    }
}

async fn check_connections(config: &StockpileConfig) -> Result<()> {
    let client = PostgreSQLClient::new(config.postgresql.clone())?;
    client.test_connection().await?;

    let storage = create_export_storage(&config.storage).await?;
    storage.ensure_base_dir().await?;
    tracing::info!(destination = %storage.describe(), "Storage is reachable");
    Ok(())
}

/// Human-readable settings, with credentials masked
fn summary_lines(config: &StockpileConfig) -> Vec<String> {
    let mut lines = vec![format!("Log Level: {}", config.application.log_level)];

    match config.storage.target {
        StorageTarget::Local => {
            if let Some(ref local) = config.storage.local {
                lines.push("Storage Target: local".to_string());
                lines.push(format!("Export Directory: {}", local.path));
            }
        }
        StorageTarget::S3 => {
            if let Some(ref s3) = config.storage.s3 {
                lines.push("Storage Target: s3".to_string());
                lines.push(format!("Bucket: {}", s3.bucket));
                lines.push(format!("Key Prefix: {}", s3.key_prefix));
                if let Some(ref region) = s3.region {
                    lines.push(format!("Region: {region}"));
                }
            }
        }
    }

    lines.push(format!(
        "PostgreSQL: {}",
        config
            .postgresql
            .connection_string
            .expose_secret()
            .as_str()
            .rsplit('@')
            .next()
            .unwrap_or("***")
    ));
    lines.push(format!(
        "Max Connections: {}",
        config.postgresql.max_connections
    ));
    lines.push(format!("Fetch Size: {}", config.postgresql.fetch_size));
    lines.push(format!(
        "Max Concurrent Tables: {}",
        config.export.max_concurrent_tables
    ));
    lines.push(format!("Retention: {} month(s)", config.retention.months));
    lines
}
