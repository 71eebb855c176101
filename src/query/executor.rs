//! Load Query Executor
//!
//! One list query per call:
//!
//! ```text
//! view scope -> list (page 1, -created) -> view predicate -> search/status/equipment
//! ```
//!
//! Callers see at most one page. Nothing is retried.

use std::time::Instant;
use tracing::{debug, error};

use super::{LoadFilter, LoadStats, LoadView, QueryError, QueryResult};
use crate::model::Load;
use crate::repository::LoadRepository;

#[derive(Clone)]
pub struct LoadQuery {
    repo: LoadRepository,
}

impl LoadQuery {
    pub fn new(repo: LoadRepository) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &LoadRepository {
        &self.repo
    }

    /// Fetch a view, newest first, with client-side filters applied
    pub async fn fetch(
        &self,
        view: LoadView,
        user_id: Option<&str>,
        filter: &LoadFilter,
    ) -> QueryResult<Vec<Load>> {
        if view.requires_user() && user_id.is_none() {
            return Err(QueryError::MissingUser(view));
        }

        let start = Instant::now();
        let loads = self.repo.list(view.scope(user_id)).await.map_err(|e| {
            error!(%view, error = %e, "Failed to load records");
            QueryError::Backend(e)
        })?;
        let fetched = loads.len();

        let loads: Vec<Load> = loads.into_iter().filter(|l| view.keeps(l)).collect();
        let loads = filter.apply(loads);

        debug!(
            %view,
            fetched,
            returned = loads.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Fetched load view"
        );

        Ok(loads)
    }

    pub async fn stats(&self) -> QueryResult<LoadStats> {
        LoadStats::fetch(&self.repo).await.map_err(|e| {
            error!(error = %e, "Failed to load stats");
            e
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{MemoryStore, RecordStore};
    use crate::model::{LoadStatus, LOADS_COLLECTION};
    use serde_json::json;
    use std::sync::Arc;

    async fn board() -> LoadQuery {
        let store = Arc::new(MemoryStore::new());
        let rows = [
            ("l1", "posted", "", "2024-01-01"),
            ("l2", "assigned", "u1", "2024-01-02"),
            ("l3", "in transit", "u1", "2024-01-03"),
            ("l4", "delivered", "u1", "2024-01-04"),
            ("l5", "assigned", "u2", "2024-01-05"),
            ("l6", "posted", "", "2024-01-06"),
            ("l7", "draft", "", "2024-01-07"),
        ];
        for (id, status, carrier, day) in rows {
            store
                .insert(
                    LOADS_COLLECTION,
                    json!({
                        "id": id,
                        "status": status,
                        "carrier": carrier,
                        "shipper": "s1",
                        "origin": "Lagos",
                        "destination": "Accra",
                        "created": format!("{} 08:00:00.000Z", day),
                    }),
                )
                .await;
        }
        LoadQuery::new(LoadRepository::new(store))
    }

    fn ids(loads: &[Load]) -> Vec<&str> {
        loads.iter().map(|l| l.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_available_view_is_exactly_posted() {
        let query = board().await;
        let loads = query
            .fetch(LoadView::Available, None, &LoadFilter::new())
            .await
            .unwrap();
        assert_eq!(ids(&loads), vec!["l6", "l1"]);
        assert!(loads.iter().all(|l| l.status == LoadStatus::Posted));
    }

    #[tokio::test]
    async fn test_mine_view_only_own_loads() {
        let query = board().await;
        let loads = query
            .fetch(LoadView::Mine, Some("u1"), &LoadFilter::new())
            .await
            .unwrap();
        assert_eq!(ids(&loads), vec!["l4", "l3", "l2"]);
        assert!(loads.iter().all(|l| l.is_carried_by("u1")));
    }

    #[tokio::test]
    async fn test_tracking_view() {
        let query = board().await;
        let loads = query
            .fetch(LoadView::Tracking, Some("u1"), &LoadFilter::new())
            .await
            .unwrap();
        assert_eq!(ids(&loads), vec!["l3", "l2"]);
    }

    #[tokio::test]
    async fn test_scoped_view_needs_user() {
        let query = board().await;
        let err = query
            .fetch(LoadView::Shipper, None, &LoadFilter::new())
            .await
            .unwrap_err();
        assert!(matches!(err, QueryError::MissingUser(LoadView::Shipper)));
    }

    #[tokio::test]
    async fn test_clearing_view_skips_drafts() {
        let query = board().await;
        let loads = query
            .fetch(LoadView::Clearing, None, &LoadFilter::new())
            .await
            .unwrap();
        assert_eq!(ids(&loads), vec!["l6", "l5", "l4", "l3", "l2", "l1"]);
    }

    #[tokio::test]
    async fn test_filters_after_view() {
        let query = board().await;
        let filter = LoadFilter::new().status(LoadStatus::InTransit);
        let loads = query
            .fetch(LoadView::Clearing, None, &filter)
            .await
            .unwrap();
        assert_eq!(ids(&loads), vec!["l3"]);
    }

    #[tokio::test]
    async fn test_stats() {
        let query = board().await;
        let stats = query.stats().await.unwrap();
        assert_eq!(stats.total, 7);
        assert_eq!(stats.under_review, 1);
        assert_eq!(stats.approved, 2);
        assert_eq!(query.repository().store().name(), "memory");
    }
}
