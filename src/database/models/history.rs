use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// One status transition of an incident. Insert-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct HistoryEntry {
    #[serde(rename = "history_id")]
    #[sqlx(rename = "history_id")]
    pub id: i32,
    pub incident_id: i32,
    pub status_id: i32,
    pub date: DateTime<Utc>,
    pub comment: Option<String>,
}
