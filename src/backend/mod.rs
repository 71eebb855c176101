//! Record Backend
//!
//! Persistence, auth and querying live in a hosted collection backend. This
//! module defines the seam the rest of the crate talks to:
//! - `PocketBaseClient` for the remote REST API
//! - `MemoryStore` for local development and tests

mod error;
mod filter;
mod memory;
mod pocketbase;

pub use error::BackendError;
pub use filter::RecordFilter;
pub use memory::MemoryStore;
pub use pocketbase::{PocketBaseClient, PocketBaseConfig};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Collection-oriented record storage
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Short name for logs and health output
    fn name(&self) -> &str;

    /// List one page of a collection
    async fn list(&self, collection: &str, options: &ListOptions)
        -> Result<ListPage<Value>, BackendError>;

    /// Fetch a single record by id
    async fn get_one(&self, collection: &str, id: &str) -> Result<Value, BackendError>;

    /// Create a record, attaching any files to their fields
    async fn create(
        &self,
        collection: &str,
        record: Value,
        files: Vec<FileUpload>,
    ) -> Result<Value, BackendError>;

    /// Apply a partial update and return the stored record
    async fn update(&self, collection: &str, id: &str, patch: Value)
        -> Result<Value, BackendError>;

    /// Exchange an auth token for the user record it belongs to
    async fn auth_refresh(&self, token: &str) -> Result<Value, BackendError>;

    /// Check the backend is reachable
    async fn health(&self) -> Result<(), BackendError>;
}

/// Parameters of a list query
#[derive(Debug, Clone, PartialEq)]
pub struct ListOptions {
    pub page: u32,
    pub per_page: u32,
    /// Sort expression, e.g. `-created`
    pub sort: Option<String>,
    pub filter: Option<RecordFilter>,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 30,
            sort: None,
            filter: None,
        }
    }
}

impl ListOptions {
    pub fn first_page(per_page: u32) -> Self {
        Self {
            per_page,
            ..Default::default()
        }
    }

    pub fn sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    pub fn filter(mut self, filter: Option<RecordFilter>) -> Self {
        self.filter = filter;
        self
    }
}

/// One page of list results
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ListPage<T> {
    pub page: u32,
    pub per_page: u32,
    pub total_items: u64,
    pub total_pages: u64,
    pub items: Vec<T>,
}

impl ListPage<Value> {
    /// Decode every item into a typed record
    pub fn decode<T: DeserializeOwned>(self) -> Result<ListPage<T>, BackendError> {
        let items = self
            .items
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<T>, _>>()?;

        Ok(ListPage {
            page: self.page,
            per_page: self.per_page,
            total_items: self.total_items,
            total_pages: self.total_pages,
            items,
        })
    }
}

/// A file attached to a record field
#[derive(Debug, Clone, PartialEq)]
pub struct FileUpload {
    /// Record field receiving the file (e.g. `documents`)
    pub field: String,
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}
