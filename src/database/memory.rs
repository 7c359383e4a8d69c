//! In-process backend with the same integrity rules as the Postgres schema.
//! Used by the test suite and by `serve --in-memory`.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Device, DevicePatch, DeviceType, HistoryEntry, Incident, IncidentPatch, IncidentStatus, Named,
    NewDevice, NewIncident, NewOffice, NewReference, NewUser, Office, OfficePatch, ReferencePatch,
    User, UserPatch, UserRole,
};
use crate::database::store::{EntityStore, StoreResult};

#[derive(Debug, Clone)]
struct Table<T> {
    rows: BTreeMap<i32, T>,
    next_id: i32,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl<T: Clone> Table<T> {
    fn insert_with(&mut self, build: impl FnOnce(i32) -> T) -> T {
        let id = self.next_id;
        self.next_id += 1;
        let row = build(id);
        self.rows.insert(id, row.clone());
        row
    }

    fn get(&self, id: i32) -> Option<T> {
        self.rows.get(&id).cloned()
    }

    fn contains(&self, id: i32) -> bool {
        self.rows.contains_key(&id)
    }

    fn all(&self) -> Vec<T> {
        self.rows.values().cloned().collect()
    }

    fn matching(&self, predicate: impl Fn(&T) -> bool) -> Vec<T> {
        self.rows.values().filter(|row| predicate(*row)).cloned().collect()
    }

    fn any(&self, predicate: impl Fn(&T) -> bool) -> bool {
        self.rows.values().any(predicate)
    }
}

#[derive(Debug, Clone, Default)]
struct Tables {
    offices: Table<Office>,
    roles: Table<UserRole>,
    device_types: Table<DeviceType>,
    statuses: Table<IncidentStatus>,
    users: Table<User>,
    devices: Table<Device>,
    incidents: Table<Incident>,
    history: Table<HistoryEntry>,
}

fn require<T: Clone>(table: &Table<T>, id: i32, what: &str) -> StoreResult<()> {
    if table.contains(id) {
        Ok(())
    } else {
        Err(DatabaseError::NotFound(format!("{} {} does not exist", what, id)))
    }
}

fn require_opt<T: Clone>(table: &Table<T>, id: Option<i32>, what: &str) -> StoreResult<()> {
    match id {
        Some(id) => require(table, id, what),
        None => Ok(()),
    }
}

fn ensure_unique_name<R: Named + Clone>(
    table: &Table<R>,
    name: &str,
    except: Option<i32>,
    what: &str,
) -> StoreResult<()> {
    let taken = table
        .rows
        .iter()
        .any(|(id, row)| Some(*id) != except && row.name() == name);
    if taken {
        Err(DatabaseError::Conflict(format!("{} name '{}' already exists", what, name)))
    } else {
        Ok(())
    }
}

fn insert_named<R: Named + Clone>(
    table: &mut Table<R>,
    new: NewReference,
    what: &str,
    build: impl FnOnce(i32, String) -> R,
) -> StoreResult<R> {
    ensure_unique_name(table, &new.name, None, what)?;
    Ok(table.insert_with(|id| build(id, new.name)))
}

fn update_named<R: Named + Clone>(
    table: &mut Table<R>,
    id: i32,
    patch: ReferencePatch,
    what: &str,
) -> StoreResult<Option<R>> {
    let Some(current) = table.get(id) else {
        return Ok(None);
    };
    let updated = patch.apply(current);
    ensure_unique_name(table, updated.name(), Some(id), what)?;
    table.rows.insert(id, updated.clone());
    Ok(Some(updated))
}

impl Tables {
    fn check_user(&self, user: &User) -> StoreResult<()> {
        if self
            .users
            .any(|other| other.id != user.id && other.email == user.email)
        {
            return Err(DatabaseError::Conflict(format!(
                "user email '{}' already exists",
                user.email
            )));
        }
        require(&self.roles, user.role_id, "user role")?;
        require_opt(&self.offices, user.office_id, "office")
    }

    fn check_device(&self, device: &Device) -> StoreResult<()> {
        require(&self.offices, device.office_id, "office")?;
        require_opt(&self.users, device.owner_id, "user")?;
        require(&self.device_types, device.type_id, "device type")
    }

    fn check_incident(&self, incident: &Incident) -> StoreResult<()> {
        require(&self.statuses, incident.status_id, "incident status")?;
        require(&self.offices, incident.office_id, "office")?;
        require_opt(&self.users, incident.reporter_id, "user")?;
        require_opt(&self.users, incident.resolver_id, "user")?;
        require_opt(&self.devices, incident.device_id, "device")
    }

    fn append_history(
        &mut self,
        incident_id: i32,
        status_id: i32,
        comment: Option<String>,
    ) -> StoreResult<HistoryEntry> {
        require(&self.incidents, incident_id, "incident")?;
        require(&self.statuses, status_id, "incident status")?;
        Ok(self.history.insert_with(|id| HistoryEntry {
            id,
            incident_id,
            status_id,
            date: Utc::now(),
            comment,
        }))
    }

    fn remove_incident(&mut self, id: i32) -> bool {
        if self.incidents.rows.remove(&id).is_none() {
            return false;
        }
        self.history.rows.retain(|_, entry| entry.incident_id != id);
        true
    }

    fn remove_device(&mut self, id: i32) -> bool {
        if self.devices.rows.remove(&id).is_none() {
            return false;
        }
        for incident in self.incidents.rows.values_mut() {
            if incident.device_id == Some(id) {
                incident.device_id = None;
            }
        }
        true
    }

    fn remove_user(&mut self, id: i32) -> bool {
        if self.users.rows.remove(&id).is_none() {
            return false;
        }
        for device in self.devices.rows.values_mut() {
            if device.owner_id == Some(id) {
                device.owner_id = None;
            }
        }
        for incident in self.incidents.rows.values_mut() {
            if incident.reporter_id == Some(id) {
                incident.reporter_id = None;
            }
            if incident.resolver_id == Some(id) {
                incident.resolver_id = None;
            }
        }
        true
    }

    fn remove_office(&mut self, id: i32) -> bool {
        if !self.offices.contains(id) {
            return false;
        }
        let incidents: Vec<i32> = self
            .incidents
            .matching(|incident| incident.office_id == id)
            .into_iter()
            .map(|incident| incident.id)
            .collect();
        let devices: Vec<i32> = self
            .devices
            .matching(|device| device.office_id == id)
            .into_iter()
            .map(|device| device.id)
            .collect();
        let users: Vec<i32> = self
            .users
            .matching(|user| user.office_id == Some(id))
            .into_iter()
            .map(|user| user.id)
            .collect();

        for incident_id in incidents {
            self.remove_incident(incident_id);
        }
        for device_id in devices {
            self.remove_device(device_id);
        }
        for user_id in users {
            self.remove_user(user_id);
        }
        self.offices.rows.remove(&id);
        true
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn read<T>(&self, f: impl FnOnce(&Tables) -> T) -> T {
        let tables = self.tables.read().await;
        f(&tables)
    }

    /// Runs `f` against a copy of every table and publishes the copy only if
    /// `f` succeeds, so a failed cascade leaves nothing behind.
    async fn write<T>(&self, f: impl FnOnce(&mut Tables) -> StoreResult<T>) -> StoreResult<T> {
        let mut tables = self.tables.write().await;
        let mut draft = tables.clone();
        let out = f(&mut draft)?;
        *tables = draft;
        Ok(out)
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    // Offices

    async fn list_offices(&self) -> StoreResult<Vec<Office>> {
        Ok(self.read(|t| t.offices.all()).await)
    }

    async fn get_office(&self, id: i32) -> StoreResult<Option<Office>> {
        Ok(self.read(|t| t.offices.get(id)).await)
    }

    async fn create_office(&self, new: NewOffice) -> StoreResult<Office> {
        self.write(move |t| Ok(t.offices.insert_with(|id| Office { id, city: new.city })))
            .await
    }

    async fn update_office(&self, id: i32, patch: OfficePatch) -> StoreResult<Option<Office>> {
        self.write(move |t| {
            let Some(current) = t.offices.get(id) else {
                return Ok(None);
            };
            let updated = patch.apply(current);
            t.offices.rows.insert(id, updated.clone());
            Ok(Some(updated))
        })
        .await
    }

    async fn delete_office(&self, id: i32) -> StoreResult<bool> {
        self.write(|t| Ok(t.remove_office(id))).await
    }

    // User roles

    async fn list_roles(&self) -> StoreResult<Vec<UserRole>> {
        Ok(self.read(|t| t.roles.all()).await)
    }

    async fn get_role(&self, id: i32) -> StoreResult<Option<UserRole>> {
        Ok(self.read(|t| t.roles.get(id)).await)
    }

    async fn create_role(&self, new: NewReference) -> StoreResult<UserRole> {
        self.write(move |t| insert_named(&mut t.roles, new, "user role", |id, name| UserRole { id, name }))
            .await
    }

    async fn update_role(&self, id: i32, patch: ReferencePatch) -> StoreResult<Option<UserRole>> {
        self.write(move |t| update_named(&mut t.roles, id, patch, "user role")).await
    }

    async fn delete_role(&self, id: i32) -> StoreResult<bool> {
        self.write(|t| {
            if t.users.any(|user| user.role_id == id) {
                return Err(DatabaseError::Conflict(format!("user role {} is still referenced", id)));
            }
            Ok(t.roles.rows.remove(&id).is_some())
        })
        .await
    }

    // Device types

    async fn list_device_types(&self) -> StoreResult<Vec<DeviceType>> {
        Ok(self.read(|t| t.device_types.all()).await)
    }

    async fn get_device_type(&self, id: i32) -> StoreResult<Option<DeviceType>> {
        Ok(self.read(|t| t.device_types.get(id)).await)
    }

    async fn create_device_type(&self, new: NewReference) -> StoreResult<DeviceType> {
        self.write(move |t| {
            insert_named(&mut t.device_types, new, "device type", |id, name| DeviceType { id, name })
        })
        .await
    }

    async fn update_device_type(&self, id: i32, patch: ReferencePatch) -> StoreResult<Option<DeviceType>> {
        self.write(move |t| update_named(&mut t.device_types, id, patch, "device type")).await
    }

    async fn delete_device_type(&self, id: i32) -> StoreResult<bool> {
        self.write(|t| {
            if t.devices.any(|device| device.type_id == id) {
                return Err(DatabaseError::Conflict(format!("device type {} is still referenced", id)));
            }
            Ok(t.device_types.rows.remove(&id).is_some())
        })
        .await
    }

    // Incident statuses

    async fn list_statuses(&self) -> StoreResult<Vec<IncidentStatus>> {
        Ok(self.read(|t| t.statuses.all()).await)
    }

    async fn get_status(&self, id: i32) -> StoreResult<Option<IncidentStatus>> {
        Ok(self.read(|t| t.statuses.get(id)).await)
    }

    async fn create_status(&self, new: NewReference) -> StoreResult<IncidentStatus> {
        self.write(move |t| {
            insert_named(&mut t.statuses, new, "incident status", |id, name| IncidentStatus { id, name })
        })
        .await
    }

    async fn update_status(&self, id: i32, patch: ReferencePatch) -> StoreResult<Option<IncidentStatus>> {
        self.write(move |t| update_named(&mut t.statuses, id, patch, "incident status")).await
    }

    async fn delete_status(&self, id: i32) -> StoreResult<bool> {
        self.write(|t| {
            if t.incidents.any(|incident| incident.status_id == id)
                || t.history.any(|entry| entry.status_id == id)
            {
                return Err(DatabaseError::Conflict(format!(
                    "incident status {} is still referenced",
                    id
                )));
            }
            Ok(t.statuses.rows.remove(&id).is_some())
        })
        .await
    }

    // Users

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        Ok(self.read(|t| t.users.all()).await)
    }

    async fn get_user(&self, id: i32) -> StoreResult<Option<User>> {
        Ok(self.read(|t| t.users.get(id)).await)
    }

    async fn get_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self
            .read(|t| t.users.rows.values().find(|user| user.email == email).cloned())
            .await)
    }

    async fn users_for_office(&self, office_id: i32) -> StoreResult<Vec<User>> {
        Ok(self
            .read(|t| t.users.matching(|user| user.office_id == Some(office_id)))
            .await)
    }

    async fn create_user(&self, new: NewUser) -> StoreResult<User> {
        self.write(move |t| {
            let candidate = User {
                id: t.users.next_id,
                office_id: new.office_id,
                first_name: new.first_name,
                last_name: new.last_name,
                email: new.email,
                password_hash: new.password_hash,
                role_id: new.role_id,
            };
            t.check_user(&candidate)?;
            Ok(t.users.insert_with(|id| User { id, ..candidate }))
        })
        .await
    }

    async fn update_user(&self, id: i32, patch: UserPatch) -> StoreResult<Option<User>> {
        self.write(move |t| {
            let Some(current) = t.users.get(id) else {
                return Ok(None);
            };
            let updated = patch.apply(current);
            t.check_user(&updated)?;
            t.users.rows.insert(id, updated.clone());
            Ok(Some(updated))
        })
        .await
    }

    async fn delete_user(&self, id: i32) -> StoreResult<bool> {
        self.write(|t| Ok(t.remove_user(id))).await
    }

    // Devices

    async fn list_devices(&self) -> StoreResult<Vec<Device>> {
        Ok(self.read(|t| t.devices.all()).await)
    }

    async fn get_device(&self, id: i32) -> StoreResult<Option<Device>> {
        Ok(self.read(|t| t.devices.get(id)).await)
    }

    async fn devices_for_office(&self, office_id: i32) -> StoreResult<Vec<Device>> {
        Ok(self
            .read(|t| t.devices.matching(|device| device.office_id == office_id))
            .await)
    }

    async fn devices_for_owner(&self, owner_id: i32) -> StoreResult<Vec<Device>> {
        Ok(self
            .read(|t| t.devices.matching(|device| device.owner_id == Some(owner_id)))
            .await)
    }

    async fn create_device(&self, new: NewDevice) -> StoreResult<Device> {
        self.write(move |t| {
            let candidate = Device {
                id: t.devices.next_id,
                office_id: new.office_id,
                owner_id: new.owner_id,
                type_id: new.type_id,
            };
            t.check_device(&candidate)?;
            Ok(t.devices.insert_with(|id| Device { id, ..candidate }))
        })
        .await
    }

    async fn update_device(&self, id: i32, patch: DevicePatch) -> StoreResult<Option<Device>> {
        self.write(move |t| {
            let Some(current) = t.devices.get(id) else {
                return Ok(None);
            };
            let updated = patch.apply(current);
            t.check_device(&updated)?;
            t.devices.rows.insert(id, updated.clone());
            Ok(Some(updated))
        })
        .await
    }

    async fn delete_device(&self, id: i32) -> StoreResult<bool> {
        self.write(|t| Ok(t.remove_device(id))).await
    }

    // Incidents

    async fn list_incidents(&self) -> StoreResult<Vec<Incident>> {
        Ok(self.read(|t| t.incidents.all()).await)
    }

    async fn get_incident(&self, id: i32) -> StoreResult<Option<Incident>> {
        Ok(self.read(|t| t.incidents.get(id)).await)
    }

    async fn incidents_for_office(&self, office_id: i32) -> StoreResult<Vec<Incident>> {
        Ok(self
            .read(|t| t.incidents.matching(|incident| incident.office_id == office_id))
            .await)
    }

    async fn create_incident(&self, new: NewIncident) -> StoreResult<Incident> {
        self.write(move |t| {
            let candidate = Incident {
                id: t.incidents.next_id,
                opened_at: new.opened_at.unwrap_or_else(Utc::now),
                status_id: new.status_id,
                description: new.description,
                reporter_id: new.reporter_id,
                resolver_id: new.resolver_id,
                office_id: new.office_id,
                device_id: new.device_id,
                resolved_at: new.resolved_at,
            };
            t.check_incident(&candidate)?;
            Ok(t.incidents.insert_with(|id| Incident { id, ..candidate }))
        })
        .await
    }

    async fn update_incident(
        &self,
        id: i32,
        patch: IncidentPatch,
        comment: Option<String>,
    ) -> StoreResult<Option<Incident>> {
        self.write(move |t| {
            let Some(current) = t.incidents.get(id) else {
                return Ok(None);
            };
            let status_change = patch.status_change(&current);
            let updated = patch.apply(current);
            t.check_incident(&updated)?;
            t.incidents.rows.insert(id, updated.clone());
            if let Some(status_id) = status_change {
                t.append_history(id, status_id, comment)?;
            }
            Ok(Some(updated))
        })
        .await
    }

    async fn delete_incident(&self, id: i32) -> StoreResult<bool> {
        self.write(|t| Ok(t.remove_incident(id))).await
    }

    // Incident history

    async fn insert_history(
        &self,
        incident_id: i32,
        status_id: i32,
        comment: Option<String>,
    ) -> StoreResult<HistoryEntry> {
        self.write(move |t| t.append_history(incident_id, status_id, comment))
            .await
    }

    async fn history_for_incident(&self, incident_id: i32) -> StoreResult<Vec<HistoryEntry>> {
        let mut entries = self
            .read(|t| t.history.matching(|entry| entry.incident_id == incident_id))
            .await;
        entries.sort_by_key(|entry| (entry.date, entry.id));
        Ok(entries)
    }
}
