//! Typed access to the `loads` collection

use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::backend::{BackendError, FileUpload, ListOptions, RecordFilter, RecordStore};
use crate::model::{Load, LOADS_COLLECTION};

/// Records fetched per list query; later pages are never requested
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Newest-created first
pub const DEFAULT_SORT: &str = "-created";

#[derive(Clone)]
pub struct LoadRepository {
    store: Arc<dyn RecordStore>,
    page_size: u32,
}

impl LoadRepository {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// First page of loads matching `filter`, newest first
    pub async fn list(&self, filter: Option<RecordFilter>) -> Result<Vec<Load>, BackendError> {
        let options = ListOptions::first_page(self.page_size)
            .sort(DEFAULT_SORT)
            .filter(filter);

        let page = self.store.list(LOADS_COLLECTION, &options).await?;
        if page.total_items > page.items.len() as u64 {
            debug!(
                total = page.total_items,
                returned = page.items.len(),
                "Load list truncated to first page"
            );
        }

        Ok(page.decode::<Load>()?.items)
    }

    /// Number of loads matching `filter`, read from a one-item page
    pub async fn count(&self, filter: Option<RecordFilter>) -> Result<u64, BackendError> {
        let options = ListOptions::first_page(1).filter(filter);
        let page = self.store.list(LOADS_COLLECTION, &options).await?;
        Ok(page.total_items)
    }

    pub async fn get(&self, id: &str) -> Result<Load, BackendError> {
        let record = self.store.get_one(LOADS_COLLECTION, id).await?;
        Ok(serde_json::from_value(record)?)
    }

    pub async fn create(&self, record: Value, files: Vec<FileUpload>) -> Result<Load, BackendError> {
        let record = self.store.create(LOADS_COLLECTION, record, files).await?;
        Ok(serde_json::from_value(record)?)
    }

    pub async fn update(&self, id: &str, patch: Value) -> Result<Load, BackendError> {
        let record = self.store.update(LOADS_COLLECTION, id, patch).await?;
        Ok(serde_json::from_value(record)?)
    }
}
