use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::auth::{CredentialHasher, PasswordError};
use crate::database::manager::DatabaseError;
use crate::database::models::{CreateUser, FieldErrors, UpdateUser, User, Validate};
use crate::database::store::EntityStore;

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error(transparent)]
    Database(#[from] DatabaseError),
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error("No user roles exist; seed reference data first")]
    NoRoles,
    #[error("Invalid user fields: {0:?}")]
    Invalid(FieldErrors),
}

/// User writes that involve credentials. Plaintext passwords stop here; only
/// Argon2 hashes reach the store.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn EntityStore>,
    hasher: CredentialHasher,
}

impl UserService {
    pub fn new(store: Arc<dyn EntityStore>, hasher: CredentialHasher) -> Self {
        Self { store, hasher }
    }

    pub async fn create(&self, payload: CreateUser) -> Result<User, UserError> {
        let hash = self.hasher.hash_blocking(payload.password.clone()).await?;
        let user = self.store.create_user(payload.into_new_user(hash)).await?;
        info!("Created user {} ({})", user.id, user.email);
        Ok(user)
    }

    pub async fn update(&self, id: i32, mut payload: UpdateUser) -> Result<Option<User>, UserError> {
        let hash = match payload.password.take() {
            Some(password) => Some(self.hasher.hash_blocking(password).await?),
            None => None,
        };
        Ok(self.store.update_user(id, payload.into_patch(hash)).await?)
    }

    /// Unknown email and wrong password both yield `Ok(None)` after the same
    /// amount of hashing work.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Option<User>, UserError> {
        let user = self.store.get_user_by_email(email.trim()).await?;
        let stored = user.as_ref().map(|user| user.password_hash.clone());

        let verified = self
            .hasher
            .verify_blocking(password.to_string(), stored)
            .await?;

        if verified {
            debug!("Credentials accepted for {}", email);
            Ok(user)
        } else {
            warn!("Rejected credentials for {}", email);
            Ok(None)
        }
    }

    /// Creates the administrator account unless a user with `email` already
    /// exists. Returns the user and whether it was created.
    pub async fn ensure_admin(
        &self,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<(User, bool), UserError> {
        if let Some(existing) = self.store.get_user_by_email(email.trim()).await? {
            info!("Admin user {} already exists", existing.email);
            return Ok((existing, false));
        }

        let roles = self.store.list_roles().await?;
        let role = roles
            .iter()
            .find(|role| role.name == "admin")
            .or_else(|| roles.first())
            .ok_or(UserError::NoRoles)?;

        let payload = CreateUser {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            role_id: role.id,
            office_id: None,
        };
        payload.validate().map_err(UserError::Invalid)?;

        let user = self.create(payload).await?;
        info!("Bootstrapped admin {} with role '{}'", user.email, role.name);
        Ok((user, true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryStore;
    use crate::database::seed::seed_reference_data;
    use argon2::Params;

    async fn service() -> UserService {
        let store = Arc::new(MemoryStore::new());
        seed_reference_data(store.as_ref()).await.unwrap();
        let hasher = CredentialHasher::with_cost(Params::MIN_M_COST, 1).unwrap();
        UserService::new(store, hasher)
    }

    fn vin() -> CreateUser {
        CreateUser {
            first_name: "Vin".to_string(),
            last_name: "Venture".to_string(),
            email: "vin@luthadel.com".to_string(),
            password: "atium".to_string(),
            role_id: 3,
            office_id: None,
        }
    }

    #[tokio::test]
    async fn stores_hash_not_plaintext() {
        let users = service().await;
        let user = users.create(vin()).await.unwrap();

        assert_ne!(user.password_hash, "atium");
        assert!(user.password_hash.starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn authenticate_accepts_only_the_right_password() {
        let users = service().await;
        let created = users.create(vin()).await.unwrap();

        let found = users.authenticate("vin@luthadel.com", "atium").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(created.id));

        let wrong_password = users.authenticate("vin@luthadel.com", "pewter").await.unwrap();
        let unknown_email = users.authenticate("kelsier@luthadel.com", "atium").await.unwrap();
        assert!(wrong_password.is_none());
        assert!(unknown_email.is_none());
    }

    #[tokio::test]
    async fn duplicate_email_conflicts_and_keeps_first() {
        let users = service().await;
        let first = users.create(vin()).await.unwrap();

        let err = users.create(vin()).await.unwrap_err();
        assert!(matches!(err, UserError::Database(DatabaseError::Conflict(_))));

        let all = users.store.list_users().await.unwrap();
        assert_eq!(all, vec![first]);
    }

    #[tokio::test]
    async fn password_change_rehashes() {
        let users = service().await;
        let user = users.create(vin()).await.unwrap();

        let update = UpdateUser {
            password: Some("bronze".to_string()),
            ..Default::default()
        };
        users.update(user.id, update).await.unwrap().unwrap();

        assert!(users.authenticate("vin@luthadel.com", "bronze").await.unwrap().is_some());
        assert!(users.authenticate("vin@luthadel.com", "atium").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn ensure_admin_is_idempotent() {
        let users = service().await;

        let (admin, created) = users
            .ensure_admin("admin@incidents.local", "secret", "Admin", "User")
            .await
            .unwrap();
        assert!(created);
        assert_eq!(admin.role_id, 1);

        let (again, created) = users
            .ensure_admin("admin@incidents.local", "other", "Admin", "User")
            .await
            .unwrap();
        assert!(!created);
        assert_eq!(again.id, admin.id);
    }

    #[tokio::test]
    async fn ensure_admin_rejects_blank_password_and_bad_email() {
        let users = service().await;

        let err = users
            .ensure_admin("admin-at-incidents", "", "Admin", "User")
            .await
            .unwrap_err();
        let UserError::Invalid(fields) = err else {
            panic!("expected field errors, got {:?}", err);
        };
        assert!(fields.contains_key("password"));
        assert!(fields.contains_key("email"));

        assert!(users.store.list_users().await.unwrap().is_empty());
    }
}
