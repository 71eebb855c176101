//! PocketBase REST API Client
//!
//! HTTP client for the collection records API.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use tracing::debug;

use super::{BackendError, FileUpload, ListOptions, ListPage, RecordStore};
use crate::model::USERS_COLLECTION;

/// PocketBase REST API client
pub struct PocketBaseClient {
    client: Client,
    config: PocketBaseConfig,
}

/// Configuration for the PocketBase client
#[derive(Debug, Clone)]
pub struct PocketBaseConfig {
    /// Base URL (e.g., "http://127.0.0.1:8090")
    pub base_url: String,
    /// Service token sent with every request
    pub token: Option<String>,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for PocketBaseConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8090".to_string(),
            token: None,
            request_timeout_ms: 10_000,
        }
    }
}

impl PocketBaseClient {
    pub fn new(config: PocketBaseConfig) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &PocketBaseConfig {
        &self.config
    }

    fn records_url(&self, collection: &str) -> String {
        format!(
            "{}/api/collections/{}/records",
            self.config.base_url.trim_end_matches('/'),
            collection
        )
    }

    fn record_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{}", self.records_url(collection), urlencoding::encode(id))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.token {
            Some(token) => request.header("Authorization", format!("Bearer {}", token)),
            None => request,
        }
    }

    /// Send a request and read the JSON body of a successful response
    async fn send_json(&self, request: RequestBuilder, what: &str) -> Result<Value, BackendError> {
        let response = request.send().await.map_err(BackendError::from_transport)?;

        let status = response.status();
        if status.is_success() {
            response.json().await.map_err(BackendError::Request)
        } else {
            let text = response.text().await.unwrap_or_default();
            Err(BackendError::from_response(status.as_u16(), &text, what))
        }
    }
}

/// Query string pairs for a list request
fn list_query(options: &ListOptions) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("page", options.page.max(1).to_string()),
        ("perPage", options.per_page.to_string()),
    ];
    if let Some(sort) = &options.sort {
        query.push(("sort", sort.clone()));
    }
    if let Some(filter) = &options.filter {
        query.push(("filter", filter.render()));
    }
    query
}

/// Multipart body: scalar fields as text parts, files as file parts
fn multipart_form(record: &Value, files: Vec<FileUpload>) -> Result<Form, BackendError> {
    let mut form = Form::new();

    if let Some(fields) = record.as_object() {
        for (key, value) in fields {
            match value {
                Value::Null => {}
                Value::String(s) => form = form.text(key.clone(), s.clone()),
                Value::Array(items) => {
                    for item in items {
                        let text = match item {
                            Value::String(s) => s.clone(),
                            other => other.to_string(),
                        };
                        form = form.text(key.clone(), text);
                    }
                }
                other => form = form.text(key.clone(), other.to_string()),
            }
        }
    }

    for file in files {
        let mut part = Part::bytes(file.bytes).file_name(file.file_name);
        if let Some(content_type) = &file.content_type {
            part = part.mime_str(content_type)?;
        }
        form = form.part(file.field, part);
    }

    Ok(form)
}

#[async_trait]
impl RecordStore for PocketBaseClient {
    fn name(&self) -> &str {
        "pocketbase"
    }

    async fn list(
        &self,
        collection: &str,
        options: &ListOptions,
    ) -> Result<ListPage<Value>, BackendError> {
        let query = list_query(options);
        debug!(collection, ?query, "Listing records");

        let request = self
            .authorized(self.client.get(self.records_url(collection)))
            .query(&query);
        let body = self.send_json(request, collection).await?;
        Ok(serde_json::from_value(body)?)
    }

    async fn get_one(&self, collection: &str, id: &str) -> Result<Value, BackendError> {
        let request = self.authorized(self.client.get(self.record_url(collection, id)));
        self.send_json(request, &format!("{}/{}", collection, id)).await
    }

    async fn create(
        &self,
        collection: &str,
        record: Value,
        files: Vec<FileUpload>,
    ) -> Result<Value, BackendError> {
        let request = self.authorized(self.client.post(self.records_url(collection)));
        let request = if files.is_empty() {
            request.json(&record)
        } else {
            debug!(collection, files = files.len(), "Creating record with attachments");
            request.multipart(multipart_form(&record, files)?)
        };

        self.send_json(request, collection).await
    }

    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<Value, BackendError> {
        let request = self
            .authorized(self.client.patch(self.record_url(collection, id)))
            .json(&patch);
        self.send_json(request, &format!("{}/{}", collection, id)).await
    }

    async fn auth_refresh(&self, token: &str) -> Result<Value, BackendError> {
        let url = format!(
            "{}/api/collections/{}/auth-refresh",
            self.config.base_url.trim_end_matches('/'),
            USERS_COLLECTION
        );

        let request = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", token));
        let body = self.send_json(request, USERS_COLLECTION).await?;

        body.get("record")
            .cloned()
            .ok_or(BackendError::Unauthorized)
    }

    async fn health(&self) -> Result<(), BackendError> {
        let url = format!("{}/api/health", self.config.base_url.trim_end_matches('/'));
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(BackendError::from_transport)?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(BackendError::Unavailable)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::RecordFilter;
    use serde_json::json;

    #[test]
    fn test_default_config() {
        let config = PocketBaseConfig::default();
        assert_eq!(config.base_url, "http://127.0.0.1:8090");
        assert!(config.token.is_none());
    }

    #[test]
    fn test_record_urls() {
        let client = PocketBaseClient::new(PocketBaseConfig {
            base_url: "http://pb.local:8090/".to_string(),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(
            client.records_url("loads"),
            "http://pb.local:8090/api/collections/loads/records"
        );
        assert_eq!(
            client.record_url("loads", "abc 1"),
            "http://pb.local:8090/api/collections/loads/records/abc%201"
        );
    }

    #[test]
    fn test_list_query() {
        let options = ListOptions::first_page(50)
            .sort("-created")
            .filter(Some(RecordFilter::eq("carrier", "u1")));
        let query = list_query(&options);

        assert_eq!(query[0], ("page", "1".to_string()));
        assert_eq!(query[1], ("perPage", "50".to_string()));
        assert_eq!(query[2], ("sort", "-created".to_string()));
        assert_eq!(query[3], ("filter", "carrier = \"u1\"".to_string()));
    }

    #[test]
    fn test_multipart_form_builds() {
        let record = json!({"origin": "Lagos", "weight": 5000, "carrier": null});
        let files = vec![FileUpload {
            field: "documents".to_string(),
            file_name: "manifest.pdf".to_string(),
            content_type: Some("application/pdf".to_string()),
            bytes: b"%PDF-1.4".to_vec(),
        }];
        assert!(multipart_form(&record, files).is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_backend() {
        let client = PocketBaseClient::new(PocketBaseConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            request_timeout_ms: 500,
            ..Default::default()
        })
        .unwrap();

        assert!(client.health().await.is_err());
    }
}
