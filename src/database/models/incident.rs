use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{nullable, Checks, FieldErrors, Validate};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Incident {
    #[serde(rename = "incident_id")]
    #[sqlx(rename = "incident_id")]
    pub id: i32,
    pub opened_at: DateTime<Utc>,
    pub status_id: i32,
    pub description: String,
    pub reporter_id: Option<i32>,
    pub resolver_id: Option<i32>,
    pub office_id: i32,
    pub device_id: Option<i32>,
    pub resolved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewIncident {
    /// Defaults to the creation time.
    #[serde(default)]
    pub opened_at: Option<DateTime<Utc>>,
    pub status_id: i32,
    pub description: String,
    /// Defaults to the creating user when submitted over HTTP.
    #[serde(default)]
    pub reporter_id: Option<i32>,
    #[serde(default)]
    pub resolver_id: Option<i32>,
    pub office_id: i32,
    #[serde(default)]
    pub device_id: Option<i32>,
    #[serde(default)]
    pub resolved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IncidentPatch {
    pub status_id: Option<i32>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub reporter_id: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable")]
    pub resolver_id: Option<Option<i32>>,
    pub office_id: Option<i32>,
    #[serde(default, deserialize_with = "nullable")]
    pub device_id: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable")]
    pub resolved_at: Option<Option<DateTime<Utc>>>,
}

/// Body of `PUT /incidents/{id}`: the patch plus an optional note that lands
/// in the history entry when the status changes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IncidentUpdate {
    #[serde(flatten)]
    pub patch: IncidentPatch,
    #[serde(default)]
    pub comment: Option<String>,
}

impl IncidentPatch {
    pub fn apply(self, mut incident: Incident) -> Incident {
        if let Some(status_id) = self.status_id {
            incident.status_id = status_id;
        }
        if let Some(description) = self.description {
            incident.description = description;
        }
        if let Some(reporter_id) = self.reporter_id {
            incident.reporter_id = reporter_id;
        }
        if let Some(resolver_id) = self.resolver_id {
            incident.resolver_id = resolver_id;
        }
        if let Some(office_id) = self.office_id {
            incident.office_id = office_id;
        }
        if let Some(device_id) = self.device_id {
            incident.device_id = device_id;
        }
        if let Some(resolved_at) = self.resolved_at {
            incident.resolved_at = resolved_at;
        }
        incident
    }

    /// The new status, if this patch moves the incident to a different one.
    pub fn status_change(&self, current: &Incident) -> Option<i32> {
        self.status_id.filter(|status_id| *status_id != current.status_id)
    }
}

impl Validate for NewIncident {
    fn validate(&self) -> Result<(), FieldErrors> {
        Checks::default().text("description", &self.description, 10_000).finish()
    }
}

impl Validate for IncidentUpdate {
    fn validate(&self) -> Result<(), FieldErrors> {
        Checks::default()
            .optional_text("description", self.patch.description.as_deref(), 10_000)
            .finish()
    }
}
