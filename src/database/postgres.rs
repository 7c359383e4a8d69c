//! Postgres backend. Integrity rules live in the schema; this layer maps
//! constraint failures onto `DatabaseError` and wraps every multi-step write
//! in a transaction.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{postgres::PgRow, FromRow, PgPool};
use tracing::debug;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Device, DevicePatch, DeviceType, HistoryEntry, Incident, IncidentPatch, IncidentStatus, Named,
    NewDevice, NewIncident, NewOffice, NewReference, NewUser, Office, OfficePatch, ReferencePatch,
    User, UserPatch, UserRole,
};
use crate::database::repository::Repository;
use crate::database::store::{EntityStore, StoreResult};

pub struct PgStore {
    pool: PgPool,
    offices: Repository<Office>,
    roles: Repository<UserRole>,
    device_types: Repository<DeviceType>,
    statuses: Repository<IncidentStatus>,
    users: Repository<User>,
    devices: Repository<Device>,
    incidents: Repository<Incident>,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            offices: Repository::new("offices", "office_id"),
            roles: Repository::new("user_roles", "role_id"),
            device_types: Repository::new("device_types", "type_id"),
            statuses: Repository::new("incident_statuses", "status_id"),
            users: Repository::new("users", "user_id"),
            devices: Repository::new("devices", "device_id"),
            incidents: Repository::new("incidents", "incident_id"),
        }
    }

    async fn insert_named<R>(&self, repo: &Repository<R>, new: NewReference, entity: &str) -> StoreResult<R>
    where
        R: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let sql = format!("INSERT INTO {} (name) VALUES ($1) RETURNING *", repo.table());
        sqlx::query_as::<_, R>(&sql)
            .bind(new.name)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DatabaseError::from_write(e, entity))
    }

    async fn update_named<R>(
        &self,
        repo: &Repository<R>,
        id: i32,
        patch: ReferencePatch,
        entity: &str,
    ) -> StoreResult<Option<R>>
    where
        R: for<'r> FromRow<'r, PgRow> + Send + Unpin + Named,
    {
        let mut tx = self.pool.begin().await?;
        let Some(current) = repo.select_for_update(&mut *tx, id).await? else {
            return Ok(None);
        };
        let updated = patch.apply(current);

        let sql = format!(
            "UPDATE {} SET name = $2 WHERE {} = $1 RETURNING *",
            repo.table(),
            repo.id_column()
        );
        let row = sqlx::query_as::<_, R>(&sql)
            .bind(id)
            .bind(updated.name())
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| DatabaseError::from_write(e, entity))?;
        tx.commit().await?;
        Ok(Some(row))
    }

    /// Runs the delete and every `ON DELETE` action it triggers atomically.
    async fn delete_row<R>(&self, repo: &Repository<R>, id: i32, entity: &str) -> StoreResult<bool>
    where
        R: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DatabaseError::from_delete(e, entity))?;
        let removed = repo
            .delete(&mut *tx, id)
            .await
            .map_err(|e| DatabaseError::from_delete(e, entity))?;
        tx.commit()
            .await
            .map_err(|e| DatabaseError::from_delete(e, entity))?;

        if removed {
            debug!("Deleted {} {}", entity, id);
        }
        Ok(removed)
    }
}

#[async_trait]
impl EntityStore for PgStore {
    async fn health_check(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    // Offices

    async fn list_offices(&self) -> StoreResult<Vec<Office>> {
        self.offices.select_all(&self.pool).await
    }

    async fn get_office(&self, id: i32) -> StoreResult<Option<Office>> {
        self.offices.select_one(&self.pool, id).await
    }

    async fn create_office(&self, new: NewOffice) -> StoreResult<Office> {
        sqlx::query_as::<_, Office>("INSERT INTO offices (city) VALUES ($1) RETURNING *")
            .bind(new.city)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DatabaseError::from_write(e, "office"))
    }

    async fn update_office(&self, id: i32, patch: OfficePatch) -> StoreResult<Option<Office>> {
        let mut tx = self.pool.begin().await?;
        let Some(current) = self.offices.select_for_update(&mut *tx, id).await? else {
            return Ok(None);
        };
        let updated = patch.apply(current);

        let row = sqlx::query_as::<_, Office>(
            "UPDATE offices SET city = $2 WHERE office_id = $1 RETURNING *",
        )
        .bind(id)
        .bind(updated.city)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| DatabaseError::from_write(e, "office"))?;
        tx.commit().await?;
        Ok(Some(row))
    }

    async fn delete_office(&self, id: i32) -> StoreResult<bool> {
        self.delete_row(&self.offices, id, "office").await
    }

    // User roles

    async fn list_roles(&self) -> StoreResult<Vec<UserRole>> {
        self.roles.select_all(&self.pool).await
    }

    async fn get_role(&self, id: i32) -> StoreResult<Option<UserRole>> {
        self.roles.select_one(&self.pool, id).await
    }

    async fn create_role(&self, new: NewReference) -> StoreResult<UserRole> {
        self.insert_named(&self.roles, new, "user role").await
    }

    async fn update_role(&self, id: i32, patch: ReferencePatch) -> StoreResult<Option<UserRole>> {
        self.update_named(&self.roles, id, patch, "user role").await
    }

    async fn delete_role(&self, id: i32) -> StoreResult<bool> {
        self.delete_row(&self.roles, id, "user role").await
    }

    // Device types

    async fn list_device_types(&self) -> StoreResult<Vec<DeviceType>> {
        self.device_types.select_all(&self.pool).await
    }

    async fn get_device_type(&self, id: i32) -> StoreResult<Option<DeviceType>> {
        self.device_types.select_one(&self.pool, id).await
    }

    async fn create_device_type(&self, new: NewReference) -> StoreResult<DeviceType> {
        self.insert_named(&self.device_types, new, "device type").await
    }

    async fn update_device_type(&self, id: i32, patch: ReferencePatch) -> StoreResult<Option<DeviceType>> {
        self.update_named(&self.device_types, id, patch, "device type").await
    }

    async fn delete_device_type(&self, id: i32) -> StoreResult<bool> {
        self.delete_row(&self.device_types, id, "device type").await
    }

    // Incident statuses

    async fn list_statuses(&self) -> StoreResult<Vec<IncidentStatus>> {
        self.statuses.select_all(&self.pool).await
    }

    async fn get_status(&self, id: i32) -> StoreResult<Option<IncidentStatus>> {
        self.statuses.select_one(&self.pool, id).await
    }

    async fn create_status(&self, new: NewReference) -> StoreResult<IncidentStatus> {
        self.insert_named(&self.statuses, new, "incident status").await
    }

    async fn update_status(&self, id: i32, patch: ReferencePatch) -> StoreResult<Option<IncidentStatus>> {
        self.update_named(&self.statuses, id, patch, "incident status").await
    }

    async fn delete_status(&self, id: i32) -> StoreResult<bool> {
        self.delete_row(&self.statuses, id, "incident status").await
    }

    // Users

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        self.users.select_all(&self.pool).await
    }

    async fn get_user(&self, id: i32) -> StoreResult<Option<User>> {
        self.users.select_one(&self.pool, id).await
    }

    async fn get_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn users_for_office(&self, office_id: i32) -> StoreResult<Vec<User>> {
        self.users.select_where(&self.pool, "office_id", office_id).await
    }

    async fn create_user(&self, new: NewUser) -> StoreResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (office_id, first_name, last_name, email, password_hash, role_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(new.office_id)
        .bind(new.first_name)
        .bind(new.last_name)
        .bind(new.email)
        .bind(new.password_hash)
        .bind(new.role_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DatabaseError::from_write(e, "user"))
    }

    async fn update_user(&self, id: i32, patch: UserPatch) -> StoreResult<Option<User>> {
        let mut tx = self.pool.begin().await?;
        let Some(current) = self.users.select_for_update(&mut *tx, id).await? else {
            return Ok(None);
        };
        let updated = patch.apply(current);

        let row = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET office_id = $2, first_name = $3, last_name = $4,
                email = $5, password_hash = $6, role_id = $7
            WHERE user_id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(updated.office_id)
        .bind(updated.first_name)
        .bind(updated.last_name)
        .bind(updated.email)
        .bind(updated.password_hash)
        .bind(updated.role_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| DatabaseError::from_write(e, "user"))?;
        tx.commit().await?;
        Ok(Some(row))
    }

    async fn delete_user(&self, id: i32) -> StoreResult<bool> {
        self.delete_row(&self.users, id, "user").await
    }

    // Devices

    async fn list_devices(&self) -> StoreResult<Vec<Device>> {
        self.devices.select_all(&self.pool).await
    }

    async fn get_device(&self, id: i32) -> StoreResult<Option<Device>> {
        self.devices.select_one(&self.pool, id).await
    }

    async fn devices_for_office(&self, office_id: i32) -> StoreResult<Vec<Device>> {
        self.devices.select_where(&self.pool, "office_id", office_id).await
    }

    async fn devices_for_owner(&self, owner_id: i32) -> StoreResult<Vec<Device>> {
        self.devices.select_where(&self.pool, "owner_id", owner_id).await
    }

    async fn create_device(&self, new: NewDevice) -> StoreResult<Device> {
        sqlx::query_as::<_, Device>(
            "INSERT INTO devices (office_id, owner_id, type_id) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(new.office_id)
        .bind(new.owner_id)
        .bind(new.type_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DatabaseError::from_write(e, "device"))
    }

    async fn update_device(&self, id: i32, patch: DevicePatch) -> StoreResult<Option<Device>> {
        let mut tx = self.pool.begin().await?;
        let Some(current) = self.devices.select_for_update(&mut *tx, id).await? else {
            return Ok(None);
        };
        let updated = patch.apply(current);

        let row = sqlx::query_as::<_, Device>(
            r#"
            UPDATE devices SET office_id = $2, owner_id = $3, type_id = $4
            WHERE device_id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(updated.office_id)
        .bind(updated.owner_id)
        .bind(updated.type_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| DatabaseError::from_write(e, "device"))?;
        tx.commit().await?;
        Ok(Some(row))
    }

    async fn delete_device(&self, id: i32) -> StoreResult<bool> {
        self.delete_row(&self.devices, id, "device").await
    }

    // Incidents

    async fn list_incidents(&self) -> StoreResult<Vec<Incident>> {
        self.incidents.select_all(&self.pool).await
    }

    async fn get_incident(&self, id: i32) -> StoreResult<Option<Incident>> {
        self.incidents.select_one(&self.pool, id).await
    }

    async fn incidents_for_office(&self, office_id: i32) -> StoreResult<Vec<Incident>> {
        self.incidents.select_where(&self.pool, "office_id", office_id).await
    }

    async fn create_incident(&self, new: NewIncident) -> StoreResult<Incident> {
        sqlx::query_as::<_, Incident>(
            r#"
            INSERT INTO incidents
                (opened_at, status_id, description, reporter_id, resolver_id,
                 office_id, device_id, resolved_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(new.opened_at.unwrap_or_else(Utc::now))
        .bind(new.status_id)
        .bind(new.description)
        .bind(new.reporter_id)
        .bind(new.resolver_id)
        .bind(new.office_id)
        .bind(new.device_id)
        .bind(new.resolved_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DatabaseError::from_write(e, "incident"))
    }

    async fn update_incident(
        &self,
        id: i32,
        patch: IncidentPatch,
        comment: Option<String>,
    ) -> StoreResult<Option<Incident>> {
        let mut tx = self.pool.begin().await?;
        let Some(current) = self.incidents.select_for_update(&mut *tx, id).await? else {
            return Ok(None);
        };
        let status_change = patch.status_change(&current);
        let updated = patch.apply(current);

        let row = sqlx::query_as::<_, Incident>(
            r#"
            UPDATE incidents
            SET opened_at = $2, status_id = $3, description = $4, reporter_id = $5,
                resolver_id = $6, office_id = $7, device_id = $8, resolved_at = $9
            WHERE incident_id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(updated.opened_at)
        .bind(updated.status_id)
        .bind(updated.description)
        .bind(updated.reporter_id)
        .bind(updated.resolver_id)
        .bind(updated.office_id)
        .bind(updated.device_id)
        .bind(updated.resolved_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| DatabaseError::from_write(e, "incident"))?;

        if let Some(status_id) = status_change {
            sqlx::query(
                r#"
                INSERT INTO incident_history (incident_id, status_id, date, comment)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(id)
            .bind(status_id)
            .bind(Utc::now())
            .bind(comment)
            .execute(&mut *tx)
            .await
            .map_err(|e| DatabaseError::from_write(e, "incident history"))?;
        }

        tx.commit().await?;
        Ok(Some(row))
    }

    async fn delete_incident(&self, id: i32) -> StoreResult<bool> {
        self.delete_row(&self.incidents, id, "incident").await
    }

    // Incident history

    async fn insert_history(
        &self,
        incident_id: i32,
        status_id: i32,
        comment: Option<String>,
    ) -> StoreResult<HistoryEntry> {
        sqlx::query_as::<_, HistoryEntry>(
            r#"
            INSERT INTO incident_history (incident_id, status_id, date, comment)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(incident_id)
        .bind(status_id)
        .bind(Utc::now())
        .bind(comment)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DatabaseError::from_write(e, "incident history"))
    }

    async fn history_for_incident(&self, incident_id: i32) -> StoreResult<Vec<HistoryEntry>> {
        Ok(sqlx::query_as::<_, HistoryEntry>(
            "SELECT * FROM incident_history WHERE incident_id = $1 ORDER BY date, history_id",
        )
        .bind(incident_id)
        .fetch_all(&self.pool)
        .await?)
    }
}
