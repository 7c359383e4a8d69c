use async_trait::async_trait;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Device, DevicePatch, DeviceType, HistoryEntry, Incident, IncidentPatch, IncidentStatus,
    NewDevice, NewIncident, NewOffice, NewReference, NewUser, Office, OfficePatch, ReferencePatch,
    User, UserPatch, UserRole,
};

pub type StoreResult<T> = Result<T, DatabaseError>;

/// Typed access to every table.
///
/// `get`/`update` return `None` for a missing id and `delete` returns whether a
/// row was removed. Writes naming a missing parent fail with `NotFound`, unique
/// violations with `Conflict`. Deletes apply the cascade / set-null rules in a
/// single transaction.
#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn health_check(&self) -> StoreResult<()>;

    // Offices
    async fn list_offices(&self) -> StoreResult<Vec<Office>>;
    async fn get_office(&self, id: i32) -> StoreResult<Option<Office>>;
    async fn create_office(&self, new: NewOffice) -> StoreResult<Office>;
    async fn update_office(&self, id: i32, patch: OfficePatch) -> StoreResult<Option<Office>>;
    /// Cascades to the office's users, devices and incidents.
    async fn delete_office(&self, id: i32) -> StoreResult<bool>;

    // User roles
    async fn list_roles(&self) -> StoreResult<Vec<UserRole>>;
    async fn get_role(&self, id: i32) -> StoreResult<Option<UserRole>>;
    async fn create_role(&self, new: NewReference) -> StoreResult<UserRole>;
    async fn update_role(&self, id: i32, patch: ReferencePatch) -> StoreResult<Option<UserRole>>;
    async fn delete_role(&self, id: i32) -> StoreResult<bool>;

    // Device types
    async fn list_device_types(&self) -> StoreResult<Vec<DeviceType>>;
    async fn get_device_type(&self, id: i32) -> StoreResult<Option<DeviceType>>;
    async fn create_device_type(&self, new: NewReference) -> StoreResult<DeviceType>;
    async fn update_device_type(&self, id: i32, patch: ReferencePatch) -> StoreResult<Option<DeviceType>>;
    async fn delete_device_type(&self, id: i32) -> StoreResult<bool>;

    // Incident statuses
    async fn list_statuses(&self) -> StoreResult<Vec<IncidentStatus>>;
    async fn get_status(&self, id: i32) -> StoreResult<Option<IncidentStatus>>;
    async fn create_status(&self, new: NewReference) -> StoreResult<IncidentStatus>;
    async fn update_status(&self, id: i32, patch: ReferencePatch) -> StoreResult<Option<IncidentStatus>>;
    async fn delete_status(&self, id: i32) -> StoreResult<bool>;

    // Users
    async fn list_users(&self) -> StoreResult<Vec<User>>;
    async fn get_user(&self, id: i32) -> StoreResult<Option<User>>;
    async fn get_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn users_for_office(&self, office_id: i32) -> StoreResult<Vec<User>>;
    async fn create_user(&self, new: NewUser) -> StoreResult<User>;
    async fn update_user(&self, id: i32, patch: UserPatch) -> StoreResult<Option<User>>;
    /// Nulls device ownership and incident reporter/resolver links.
    async fn delete_user(&self, id: i32) -> StoreResult<bool>;

    // Devices
    async fn list_devices(&self) -> StoreResult<Vec<Device>>;
    async fn get_device(&self, id: i32) -> StoreResult<Option<Device>>;
    async fn devices_for_office(&self, office_id: i32) -> StoreResult<Vec<Device>>;
    async fn devices_for_owner(&self, owner_id: i32) -> StoreResult<Vec<Device>>;
    async fn create_device(&self, new: NewDevice) -> StoreResult<Device>;
    async fn update_device(&self, id: i32, patch: DevicePatch) -> StoreResult<Option<Device>>;
    /// Nulls the device link on incidents.
    async fn delete_device(&self, id: i32) -> StoreResult<bool>;

    // Incidents
    async fn list_incidents(&self) -> StoreResult<Vec<Incident>>;
    async fn get_incident(&self, id: i32) -> StoreResult<Option<Incident>>;
    async fn incidents_for_office(&self, office_id: i32) -> StoreResult<Vec<Incident>>;
    async fn create_incident(&self, new: NewIncident) -> StoreResult<Incident>;
    /// Applies the patch; a status change appends a history entry carrying
    /// `comment` in the same transaction.
    async fn update_incident(
        &self,
        id: i32,
        patch: IncidentPatch,
        comment: Option<String>,
    ) -> StoreResult<Option<Incident>>;
    /// Cascades to the incident's history.
    async fn delete_incident(&self, id: i32) -> StoreResult<bool>;

    // Incident history (insert-only)
    async fn insert_history(
        &self,
        incident_id: i32,
        status_id: i32,
        comment: Option<String>,
    ) -> StoreResult<HistoryEntry>;
    /// Entries ordered by date, then id.
    async fn history_for_incident(&self, incident_id: i32) -> StoreResult<Vec<HistoryEntry>>;
}
