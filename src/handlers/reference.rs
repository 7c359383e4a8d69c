//! Offices and the three name-only lookup tables share one set of CRUD
//! handlers; each table plugs in through [`ReferenceTable`].

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use crate::database::models::{
    DeviceType, IncidentStatus, NewOffice, NewReference, Office, OfficePatch, ReferencePatch,
    UserRole, Validate,
};
use crate::database::store::{EntityStore, StoreResult};

#[async_trait]
pub trait ReferenceTable: Send + Sync + 'static {
    type Record: Serialize + Send;
    type New: DeserializeOwned + Validate + Send + 'static;
    type Patch: DeserializeOwned + Validate + Send + 'static;

    /// Singular noun used in error messages.
    const NAME: &'static str;

    async fn list(store: &dyn EntityStore) -> StoreResult<Vec<Self::Record>>;
    async fn get(store: &dyn EntityStore, id: i32) -> StoreResult<Option<Self::Record>>;
    async fn create(store: &dyn EntityStore, new: Self::New) -> StoreResult<Self::Record>;
    async fn update(
        store: &dyn EntityStore,
        id: i32,
        patch: Self::Patch,
    ) -> StoreResult<Option<Self::Record>>;
    async fn delete(store: &dyn EntityStore, id: i32) -> StoreResult<bool>;
}

pub struct Offices;
pub struct Roles;
pub struct DeviceTypes;
pub struct Statuses;

#[async_trait]
impl ReferenceTable for Offices {
    type Record = Office;
    type New = NewOffice;
    type Patch = OfficePatch;
    const NAME: &'static str = "office";

    async fn list(store: &dyn EntityStore) -> StoreResult<Vec<Office>> {
        store.list_offices().await
    }

    async fn get(store: &dyn EntityStore, id: i32) -> StoreResult<Option<Office>> {
        store.get_office(id).await
    }

    async fn create(store: &dyn EntityStore, new: NewOffice) -> StoreResult<Office> {
        store.create_office(new).await
    }

    async fn update(store: &dyn EntityStore, id: i32, patch: OfficePatch) -> StoreResult<Option<Office>> {
        store.update_office(id, patch).await
    }

    async fn delete(store: &dyn EntityStore, id: i32) -> StoreResult<bool> {
        store.delete_office(id).await
    }
}

#[async_trait]
impl ReferenceTable for Roles {
    type Record = UserRole;
    type New = NewReference;
    type Patch = ReferencePatch;
    const NAME: &'static str = "user role";

    async fn list(store: &dyn EntityStore) -> StoreResult<Vec<UserRole>> {
        store.list_roles().await
    }

    async fn get(store: &dyn EntityStore, id: i32) -> StoreResult<Option<UserRole>> {
        store.get_role(id).await
    }

    async fn create(store: &dyn EntityStore, new: NewReference) -> StoreResult<UserRole> {
        store.create_role(new).await
    }

    async fn update(store: &dyn EntityStore, id: i32, patch: ReferencePatch) -> StoreResult<Option<UserRole>> {
        store.update_role(id, patch).await
    }

    async fn delete(store: &dyn EntityStore, id: i32) -> StoreResult<bool> {
        store.delete_role(id).await
    }
}

#[async_trait]
impl ReferenceTable for DeviceTypes {
    type Record = DeviceType;
    type New = NewReference;
    type Patch = ReferencePatch;
    const NAME: &'static str = "device type";

    async fn list(store: &dyn EntityStore) -> StoreResult<Vec<DeviceType>> {
        store.list_device_types().await
    }

    async fn get(store: &dyn EntityStore, id: i32) -> StoreResult<Option<DeviceType>> {
        store.get_device_type(id).await
    }

    async fn create(store: &dyn EntityStore, new: NewReference) -> StoreResult<DeviceType> {
        store.create_device_type(new).await
    }

    async fn update(store: &dyn EntityStore, id: i32, patch: ReferencePatch) -> StoreResult<Option<DeviceType>> {
        store.update_device_type(id, patch).await
    }

    async fn delete(store: &dyn EntityStore, id: i32) -> StoreResult<bool> {
        store.delete_device_type(id).await
    }
}

#[async_trait]
impl ReferenceTable for Statuses {
    type Record = IncidentStatus;
    type New = NewReference;
    type Patch = ReferencePatch;
    const NAME: &'static str = "incident status";

    async fn list(store: &dyn EntityStore) -> StoreResult<Vec<IncidentStatus>> {
        store.list_statuses().await
    }

    async fn get(store: &dyn EntityStore, id: i32) -> StoreResult<Option<IncidentStatus>> {
        store.get_status(id).await
    }

    async fn create(store: &dyn EntityStore, new: NewReference) -> StoreResult<IncidentStatus> {
        store.create_status(new).await
    }

    async fn update(
        store: &dyn EntityStore,
        id: i32,
        patch: ReferencePatch,
    ) -> StoreResult<Option<IncidentStatus>> {
        store.update_status(id, patch).await
    }

    async fn delete(store: &dyn EntityStore, id: i32) -> StoreResult<bool> {
        store.delete_status(id).await
    }
}
