//! Name-only lookup tables: user roles, device types and incident statuses.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{Checks, FieldErrors, Validate};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct UserRole {
    #[serde(rename = "role_id")]
    #[sqlx(rename = "role_id")]
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct DeviceType {
    #[serde(rename = "type_id")]
    #[sqlx(rename = "type_id")]
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct IncidentStatus {
    #[serde(rename = "status_id")]
    #[sqlx(rename = "status_id")]
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewReference {
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReferencePatch {
    pub name: Option<String>,
}

/// Rows whose only editable column is `name`.
pub trait Named {
    fn name(&self) -> &str;
    fn name_mut(&mut self) -> &mut String;
}

impl Named for UserRole {
    fn name(&self) -> &str {
        &self.name
    }

    fn name_mut(&mut self) -> &mut String {
        &mut self.name
    }
}

impl Named for DeviceType {
    fn name(&self) -> &str {
        &self.name
    }

    fn name_mut(&mut self) -> &mut String {
        &mut self.name
    }
}

impl Named for IncidentStatus {
    fn name(&self) -> &str {
        &self.name
    }

    fn name_mut(&mut self) -> &mut String {
        &mut self.name
    }
}

impl ReferencePatch {
    pub fn apply<R: Named>(self, mut record: R) -> R {
        if let Some(name) = self.name {
            *record.name_mut() = name;
        }
        record
    }
}

impl Validate for NewReference {
    fn validate(&self) -> Result<(), FieldErrors> {
        Checks::default().text("name", &self.name, 50).finish()
    }
}

impl Validate for ReferencePatch {
    fn validate(&self) -> Result<(), FieldErrors> {
        Checks::default().optional_text("name", self.name.as_deref(), 50).finish()
    }
}
