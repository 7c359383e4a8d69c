use tracing::info;

use crate::database::models::NewReference;
use crate::database::store::{EntityStore, StoreResult};

pub const DEFAULT_ROLES: &[&str] = &["admin", "technician", "user"];
pub const DEFAULT_STATUSES: &[&str] = &["open", "in_progress", "resolved", "closed"];
pub const DEFAULT_DEVICE_TYPES: &[&str] = &["laptop", "desktop", "printer", "phone"];

fn named(name: &str) -> NewReference {
    NewReference {
        name: name.to_string(),
    }
}

/// Inserts the default lookup rows when the role table is empty.
///
/// Returns `true` if anything was inserted. A store that already has roles is
/// considered initialised and left alone.
pub async fn seed_reference_data(store: &dyn EntityStore) -> StoreResult<bool> {
    if !store.list_roles().await?.is_empty() {
        info!("Reference data already present, skipping seed");
        return Ok(false);
    }

    for name in DEFAULT_ROLES {
        store.create_role(named(name)).await?;
    }
    for name in DEFAULT_STATUSES {
        store.create_status(named(name)).await?;
    }
    for name in DEFAULT_DEVICE_TYPES {
        store.create_device_type(named(name)).await?;
    }

    info!(
        "Seeded {} roles, {} statuses, {} device types",
        DEFAULT_ROLES.len(),
        DEFAULT_STATUSES.len(),
        DEFAULT_DEVICE_TYPES.len()
    );
    Ok(true)
}
