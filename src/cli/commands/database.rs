use anyhow::Context;
use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::seed_reference_data;
use crate::server::open_store;

/// Apply the schema and seed reference data. Safe to run repeatedly.
pub async fn init(config: AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let store = open_store(&config, false).await?;
    let seeded = seed_reference_data(store.as_ref())
        .await
        .context("seeding reference data")?;

    let message = if seeded {
        "Database initialised with reference data"
    } else {
        "Database already initialised"
    };
    output_success(&output_format, message, Some(json!({ "seeded": seeded })))
}
