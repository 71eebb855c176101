//! Local projection of a load view
//!
//! Holds the last fetched page of a view so edits can be shown before the
//! server acknowledges them. Server replies are merged back by id; records
//! that no longer belong to the view drop out.

use chrono::{DateTime, Utc};

use super::{LoadFilter, LoadQuery, LoadView, QueryResult};
use crate::model::Load;
use crate::mutation::LoadPatch;

#[derive(Debug, Clone)]
pub struct LoadProjection {
    view: LoadView,
    user_id: Option<String>,
    filter: LoadFilter,
    loads: Vec<Load>,
    fetched_at: Option<DateTime<Utc>>,
}

impl LoadProjection {
    pub fn new(view: LoadView, user_id: Option<String>, filter: LoadFilter) -> Self {
        Self {
            view,
            user_id,
            filter,
            loads: Vec::new(),
            fetched_at: None,
        }
    }

    pub fn view(&self) -> LoadView {
        self.view
    }

    pub fn loads(&self) -> &[Load] {
        &self.loads
    }

    pub fn get(&self, id: &str) -> Option<&Load> {
        self.loads.iter().find(|l| l.id == id)
    }

    pub fn len(&self) -> usize {
        self.loads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loads.is_empty()
    }

    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    /// Replace the contents with a fresh fetch
    pub async fn refresh(&mut self, query: &LoadQuery) -> QueryResult<&[Load]> {
        let loads = query
            .fetch(self.view, self.user_id.as_deref(), &self.filter)
            .await?;
        self.loads = loads;
        self.fetched_at = Some(Utc::now());
        Ok(&self.loads)
    }

    /// Apply a patch locally before the server confirms it.
    ///
    /// Returns the previous record so the caller can roll back on failure.
    pub fn patch_local(&mut self, id: &str, patch: &LoadPatch) -> Option<Load> {
        let load = self.loads.iter_mut().find(|l| l.id == id)?;
        let previous = load.clone();
        patch.apply_to(load);
        Some(previous)
    }

    /// Put back a record saved by `patch_local`
    pub fn rollback(&mut self, previous: Load) {
        if let Some(load) = self.loads.iter_mut().find(|l| l.id == previous.id) {
            *load = previous;
        }
    }

    /// Merge the server's copy of a record.
    ///
    /// Returns `false` when the record left the view.
    pub fn apply_update(&mut self, load: Load) -> bool {
        let belongs = self.view.contains(&load, self.user_id.as_deref()) && self.filter.matches(&load);
        let position = self.loads.iter().position(|l| l.id == load.id);

        match (position, belongs) {
            (Some(i), true) => {
                self.loads[i] = load;
                true
            }
            (Some(i), false) => {
                self.loads.remove(i);
                false
            }
            // New records are picked up by the next refresh.
            (None, belongs) => belongs,
        }
    }
}
