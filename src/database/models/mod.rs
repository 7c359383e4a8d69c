//! Typed rows for every table, plus the create and patch payloads each accepts.
//!
//! Records are one-directional: they hold foreign-key ids only. Traversal goes
//! through explicit lookups on the store (`incidents_for_office`, ...).

pub mod device;
pub mod history;
pub mod incident;
pub mod office;
pub mod reference;
pub mod user;

use std::collections::HashMap;

use serde::{Deserialize, Deserializer};

pub use device::{Device, DevicePatch, NewDevice};
pub use history::HistoryEntry;
pub use incident::{Incident, IncidentPatch, IncidentUpdate, NewIncident};
pub use office::{NewOffice, Office, OfficePatch};
pub use reference::{DeviceType, IncidentStatus, Named, NewReference, ReferencePatch, UserRole};
pub use user::{CreateUser, NewUser, UpdateUser, User, UserPatch};

/// Field name -> problem description
pub type FieldErrors = HashMap<String, String>;

/// Input checks that serde alone cannot express.
pub trait Validate {
    fn validate(&self) -> Result<(), FieldErrors>;
}

/// Collects field errors while walking a payload.
#[derive(Debug, Default)]
pub(crate) struct Checks(FieldErrors);

impl Checks {
    pub(crate) fn text(&mut self, field: &str, value: &str, max_len: usize) -> &mut Self {
        // Length counts the value as stored, padding included.
        if value.trim().is_empty() {
            self.0.insert(field.to_string(), "This field is required".to_string());
        } else if value.chars().count() > max_len {
            self.0
                .insert(field.to_string(), format!("Must be at most {} characters", max_len));
        }
        self
    }

    pub(crate) fn optional_text(&mut self, field: &str, value: Option<&str>, max_len: usize) -> &mut Self {
        if let Some(value) = value {
            self.text(field, value, max_len);
        }
        self
    }

    pub(crate) fn email(&mut self, field: &str, value: &str) -> &mut Self {
        self.text(field, value, 150);
        if !self.0.contains_key(field) {
            let mut parts = value.split('@');
            let valid = matches!(
                (parts.next(), parts.next(), parts.next()),
                (Some(local), Some(domain), None) if !local.is_empty() && domain.contains('.')
            );
            if !valid {
                self.0.insert(field.to_string(), "Invalid email format".to_string());
            }
        }
        self
    }

    pub(crate) fn finish(&mut self) -> Result<(), FieldErrors> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(std::mem::take(&mut self.0))
        }
    }
}

/// Keeps an explicit JSON `null` apart from an absent field: absent stays `None`
/// (via `#[serde(default)]`), `null` becomes `Some(None)`.
pub(crate) fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
