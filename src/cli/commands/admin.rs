use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::seed_reference_data;
use crate::server::open_store;
use crate::state::AppState;

pub struct NewAdmin {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// Seeds reference data if needed so the admin role exists, then creates the
/// account. An existing account with the same email is reported, not changed.
pub async fn create(config: AppConfig, admin: NewAdmin, output_format: OutputFormat) -> anyhow::Result<()> {
    let store = open_store(&config, false).await?;
    seed_reference_data(store.as_ref()).await?;
    let state = AppState::new(config, store)?;

    let (user, created) = state
        .users
        .ensure_admin(&admin.email, &admin.password, &admin.first_name, &admin.last_name)
        .await?;

    let message = if created {
        "Administrator created"
    } else {
        "Administrator already exists"
    };
    output_success(
        &output_format,
        message,
        Some(json!({
            "user_id": user.id,
            "email": user.email,
            "role_id": user.role_id,
        })),
    )
}
