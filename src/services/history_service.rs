use std::sync::Arc;

use crate::database::manager::DatabaseError;
use crate::database::models::HistoryEntry;
use crate::database::store::{EntityStore, StoreResult};

/// Append-only log of incident status transitions.
///
/// Status changes made through `update_incident` are logged by the store itself;
/// this is the entry point for explicit entries and for reading the log.
#[derive(Clone)]
pub struct HistoryRecorder {
    store: Arc<dyn EntityStore>,
}

impl HistoryRecorder {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// Fails with `NotFound` if the incident or status does not exist.
    pub async fn record(
        &self,
        incident_id: i32,
        status_id: i32,
        comment: Option<String>,
    ) -> StoreResult<HistoryEntry> {
        self.store.insert_history(incident_id, status_id, comment).await
    }

    /// Entries ordered by date, then id.
    pub async fn history(&self, incident_id: i32) -> StoreResult<Vec<HistoryEntry>> {
        if self.store.get_incident(incident_id).await?.is_none() {
            return Err(DatabaseError::NotFound(format!(
                "incident {} does not exist",
                incident_id
            )));
        }
        self.store.history_for_incident(incident_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryStore;
    use crate::database::models::{IncidentPatch, NewIncident, NewOffice};
    use crate::database::seed::seed_reference_data;

    async fn with_incident() -> (Arc<MemoryStore>, i32) {
        let store = Arc::new(MemoryStore::new());
        seed_reference_data(store.as_ref()).await.unwrap();
        let office = store
            .create_office(NewOffice { city: "Springfield".to_string() })
            .await
            .unwrap();
        let incident = store
            .create_incident(NewIncident {
                opened_at: None,
                status_id: 1,
                description: "Printer on fire".to_string(),
                reporter_id: None,
                resolver_id: None,
                office_id: office.id,
                device_id: None,
                resolved_at: None,
            })
            .await
            .unwrap();
        (store, incident.id)
    }

    #[tokio::test]
    async fn record_requires_incident_and_status() {
        let (store, incident_id) = with_incident().await;
        let recorder = HistoryRecorder::new(store);

        let entry = recorder
            .record(incident_id, 2, Some("picked up".to_string()))
            .await
            .unwrap();
        assert_eq!(entry.status_id, 2);
        assert_eq!(entry.comment.as_deref(), Some("picked up"));

        assert!(matches!(
            recorder.record(999, 2, None).await,
            Err(DatabaseError::NotFound(_))
        ));
        assert!(matches!(
            recorder.record(incident_id, 999, None).await,
            Err(DatabaseError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn status_change_appends_exactly_one_entry() {
        let (store, incident_id) = with_incident().await;
        let recorder = HistoryRecorder::new(store.clone());
        let before = chrono::Utc::now();

        let patch = IncidentPatch {
            status_id: Some(3),
            ..Default::default()
        };
        store
            .update_incident(incident_id, patch, Some("replaced toner".to_string()))
            .await
            .unwrap()
            .unwrap();

        let entries = recorder.history(incident_id).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].status_id, 3);
        assert!(entries[0].date >= before);
        assert_eq!(entries[0].comment.as_deref(), Some("replaced toner"));

        // Same status again is not a transition.
        let patch = IncidentPatch {
            status_id: Some(3),
            ..Default::default()
        };
        store.update_incident(incident_id, patch, None).await.unwrap();
        assert_eq!(recorder.history(incident_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn history_of_missing_incident_is_not_found() {
        let (store, _) = with_incident().await;
        let recorder = HistoryRecorder::new(store);

        assert!(matches!(
            recorder.history(42).await,
            Err(DatabaseError::NotFound(_))
        ));
    }
}
