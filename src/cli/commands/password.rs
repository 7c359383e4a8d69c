use serde_json::json;

use crate::auth::CredentialHasher;
use crate::cli::OutputFormat;
use crate::config::AppConfig;

/// Print a PHC hash using the configured cost.
pub fn hash(config: &AppConfig, plaintext: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let security = &config.security;
    let hasher = CredentialHasher::with_cost(security.password_memory_kib, security.password_iterations)?;
    let hash = hasher.hash(plaintext)?;

    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&json!({ "hash": hash }))?),
        OutputFormat::Text => println!("{}", hash),
    }
    Ok(())
}
