use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{nullable, Checks, FieldErrors, Validate};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct User {
    #[serde(rename = "user_id")]
    #[sqlx(rename = "user_id")]
    pub id: i32,
    pub office_id: Option<i32>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role_id: i32,
}

/// Request body for creating a user. Carries the plaintext password,
/// which never reaches the store.
#[derive(Clone, Deserialize)]
pub struct CreateUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub role_id: i32,
    #[serde(default)]
    pub office_id: Option<i32>,
}

/// Request body for updating a user. `office_id: null` detaches the office.
#[derive(Clone, Default, Deserialize)]
pub struct UpdateUser {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role_id: Option<i32>,
    #[serde(default, deserialize_with = "nullable")]
    pub office_id: Option<Option<i32>>,
}

/// Row to insert; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub office_id: Option<i32>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub role_id: i32,
}

#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub office_id: Option<Option<i32>>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub role_id: Option<i32>,
}

impl CreateUser {
    pub fn into_new_user(self, password_hash: String) -> NewUser {
        NewUser {
            office_id: self.office_id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email.trim().to_string(),
            password_hash,
            role_id: self.role_id,
        }
    }
}

impl UpdateUser {
    pub fn into_patch(self, password_hash: Option<String>) -> UserPatch {
        UserPatch {
            office_id: self.office_id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email.map(|email| email.trim().to_string()),
            password_hash,
            role_id: self.role_id,
        }
    }
}

impl UserPatch {
    pub fn apply(self, mut user: User) -> User {
        if let Some(office_id) = self.office_id {
            user.office_id = office_id;
        }
        if let Some(first_name) = self.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            user.last_name = last_name;
        }
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(password_hash) = self.password_hash {
            user.password_hash = password_hash;
        }
        if let Some(role_id) = self.role_id {
            user.role_id = role_id;
        }
        user
    }
}

impl Validate for CreateUser {
    fn validate(&self) -> Result<(), FieldErrors> {
        Checks::default()
            .text("first_name", &self.first_name, 100)
            .text("last_name", &self.last_name, 150)
            .email("email", &self.email)
            .text("password", &self.password, 1024)
            .finish()
    }
}

impl Validate for UpdateUser {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut checks = Checks::default();
        checks
            .optional_text("first_name", self.first_name.as_deref(), 100)
            .optional_text("last_name", self.last_name.as_deref(), 150)
            .optional_text("password", self.password.as_deref(), 1024);
        if let Some(email) = &self.email {
            checks.email("email", email);
        }
        checks.finish()
    }
}

// Hand-written so request bodies never print a plaintext password.
impl std::fmt::Debug for CreateUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateUser")
            .field("email", &self.email)
            .field("role_id", &self.role_id)
            .field("office_id", &self.office_id)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for UpdateUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateUser")
            .field("email", &self.email)
            .field("role_id", &self.role_id)
            .field("office_id", &self.office_id)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user() -> User {
        User {
            id: 4,
            office_id: Some(2),
            first_name: "Elend".to_string(),
            last_name: "Venture".to_string(),
            email: "mistborn@cosmere.com".to_string(),
            password_hash: "$argon2id$stored".to_string(),
            role_id: 1,
        }
    }

    #[test]
    fn password_hash_is_never_serialized() {
        let value = serde_json::to_value(user()).unwrap();
        assert!(value.get("password_hash").is_none());
        assert_eq!(value["user_id"], 4);
    }

    #[test]
    fn update_distinguishes_absent_from_null() {
        let absent: UpdateUser = serde_json::from_value(json!({ "first_name": "Vin" })).unwrap();
        assert_eq!(absent.office_id, None);

        let cleared: UpdateUser = serde_json::from_value(json!({ "office_id": null })).unwrap();
        assert_eq!(cleared.office_id, Some(None));

        let moved: UpdateUser = serde_json::from_value(json!({ "office_id": 9 })).unwrap();
        assert_eq!(moved.office_id, Some(Some(9)));
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let update: UpdateUser =
            serde_json::from_value(json!({ "last_name": "Tekiel", "is_superuser": true })).unwrap();
        assert_eq!(update.last_name.as_deref(), Some("Tekiel"));
    }

    #[test]
    fn patch_applies_only_supplied_fields() {
        let patch = UpdateUser {
            office_id: Some(None),
            first_name: Some("Vin".to_string()),
            ..Default::default()
        }
        .into_patch(None);

        let updated = patch.apply(user());
        assert_eq!(updated.first_name, "Vin");
        assert_eq!(updated.office_id, None);
        assert_eq!(updated.last_name, "Venture");
        assert_eq!(updated.password_hash, "$argon2id$stored");
    }

    #[test]
    fn create_validation_reports_fields() {
        let request: CreateUser = serde_json::from_value(json!({
            "first_name": "",
            "last_name": "Venture",
            "email": "nope",
            "password": "1234",
            "role_id": 3
        }))
        .unwrap();

        let errors = request.validate().unwrap_err();
        assert!(errors.contains_key("first_name"));
        assert!(errors.contains_key("email"));
        assert!(!errors.contains_key("password"));
    }
}
