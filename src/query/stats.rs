//! Dashboard counters

use serde::{Deserialize, Serialize};

use crate::backend::RecordFilter;
use crate::model::LoadStatus;
use crate::repository::LoadRepository;

use super::QueryResult;

/// Load counts shown on the dashboards
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadStats {
    pub total: u64,
    /// Drafts awaiting review
    pub under_review: u64,
    /// Loads approved for the board
    pub approved: u64,
}

fn status_filter(status: LoadStatus) -> RecordFilter {
    RecordFilter::any_of("status", status.spellings().iter().copied())
}

impl LoadStats {
    /// Read each counter from a one-item list query
    pub async fn fetch(repo: &LoadRepository) -> QueryResult<Self> {
        let (total, under_review, approved) = tokio::try_join!(
            repo.count(None),
            repo.count(Some(status_filter(LoadStatus::Draft))),
            repo.count(Some(status_filter(LoadStatus::Posted))),
        )?;

        Ok(Self {
            total,
            under_review,
            approved,
        })
    }
}
