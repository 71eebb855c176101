//! In-process record store
//!
//! Behaves like the remote backend closely enough for local development and
//! tests: generated ids, `created`/`updated` stamps, filters, sorting and
//! paging. Uploaded files are recorded by name only. Auth tokens are only
//! accepted when this store issued them through [`MemoryStore::issue_token`].

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Map, Value};
use std::cmp::Ordering;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{BackendError, FileUpload, ListOptions, ListPage, RecordStore};
use crate::auth::token::{decode_claims, encode_token};
use crate::model::serde_pb::format_timestamp;
use crate::model::USERS_COLLECTION;

/// Fields never stored or returned
const WRITE_ONLY_FIELDS: &[&str] = &["password", "passwordConfirm"];

/// Lifetime of an issued session token
const SESSION_SECS: i64 = 3600;

#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Value>>>,
    /// Issued token -> user id
    sessions: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record as-is, filling in id and timestamps when missing
    pub async fn insert(&self, collection: &str, record: Value) -> Value {
        let record = prepare(record);
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .push(record.clone());
        record
    }

    /// Start a session for a stored user and return its token
    pub async fn issue_token(&self, user_id: &str) -> Result<String, BackendError> {
        self.get_one(USERS_COLLECTION, user_id).await?;

        let claims = json!({
            "id": user_id,
            "exp": Utc::now().timestamp() + SESSION_SECS,
            "type": "authRecord",
        });
        let token = encode_token(&claims, &Uuid::new_v4().simple().to_string());
        self.sessions
            .write()
            .await
            .insert(token.clone(), user_id.to_string());
        Ok(token)
    }

    /// Number of records in a collection
    pub async fn count(&self, collection: &str) -> usize {
        let collections = self.collections.read().await;
        collections.get(collection).map(Vec::len).unwrap_or(0)
    }
}

fn email_taken(users: &[Value], email: &str) -> bool {
    users.iter().any(|u| {
        u.get("email")
            .and_then(Value::as_str)
            .is_some_and(|e| e.eq_ignore_ascii_case(email))
    })
}

fn new_id() -> String {
    Uuid::new_v4().simple().to_string()[..15].to_string()
}

fn prepare(record: Value) -> Value {
    let mut fields = match record {
        Value::Object(map) => map,
        _ => Map::new(),
    };

    for key in WRITE_ONLY_FIELDS {
        fields.remove(*key);
    }

    let now = Value::String(format_timestamp(&Utc::now()));
    let missing = |v: Option<&Value>| match v {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    };

    if missing(fields.get("id")) {
        fields.insert("id".to_string(), Value::String(new_id()));
    }
    if missing(fields.get("created")) {
        fields.insert("created".to_string(), now.clone());
    }
    if missing(fields.get("updated")) {
        fields.insert("updated".to_string(), now);
    }

    Value::Object(fields)
}

/// Order two records by a backend sort expression (`-created,id`)
fn compare(a: &Value, b: &Value, sort: &str) -> Ordering {
    for key in sort.split(',').map(str::trim).filter(|k| !k.is_empty()) {
        let (field, descending) = match key.strip_prefix('-') {
            Some(field) => (field, true),
            None => (key.trim_start_matches('+'), false),
        };

        let ordering = compare_values(a.get(field), b.get(field));
        let ordering = if descending { ordering.reverse() } else { ordering };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), _) => Ordering::Less,
        (_, None | Some(Value::Null)) => Ordering::Greater,
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn list(
        &self,
        collection: &str,
        options: &ListOptions,
    ) -> Result<ListPage<Value>, BackendError> {
        let collections = self.collections.read().await;
        let records = collections.get(collection).map(Vec::as_slice).unwrap_or(&[]);

        let mut matched: Vec<&Value> = records
            .iter()
            .filter(|r| options.filter.as_ref().map_or(true, |f| f.matches(r)))
            .collect();

        if let Some(sort) = &options.sort {
            matched.sort_by(|a, b| compare(a, b, sort));
        }

        let page = options.page.max(1);
        let per_page = options.per_page.max(1);
        let total_items = matched.len() as u64;
        let total_pages = total_items.div_ceil(per_page as u64);

        let items = matched
            .into_iter()
            .skip(((page - 1) * per_page) as usize)
            .take(per_page as usize)
            .cloned()
            .collect();

        Ok(ListPage {
            page,
            per_page,
            total_items,
            total_pages,
            items,
        })
    }

    async fn get_one(&self, collection: &str, id: &str) -> Result<Value, BackendError> {
        let collections = self.collections.read().await;
        collections
            .get(collection)
            .and_then(|records| records.iter().find(|r| r["id"] == id))
            .cloned()
            .ok_or_else(|| BackendError::NotFound(format!("{}/{}", collection, id)))
    }

    async fn create(
        &self,
        collection: &str,
        record: Value,
        files: Vec<FileUpload>,
    ) -> Result<Value, BackendError> {
        if !record.is_object() {
            return Err(BackendError::ApiError {
                status: 400,
                message: "Record body must be an object".to_string(),
            });
        }

        let mut record = record;
        if let Value::Object(fields) = &mut record {
            // Remote ids are generated server-side; ignore any supplied one.
            fields.remove("id");
            for file in files {
                let names = fields
                    .entry(file.field)
                    .or_insert_with(|| Value::Array(Vec::new()));
                match names {
                    Value::Array(list) => list.push(Value::String(file.file_name)),
                    other => *other = Value::Array(vec![Value::String(file.file_name)]),
                }
            }
        }

        let record = prepare(record);
        let mut collections = self.collections.write().await;
        let records = collections.entry(collection.to_string()).or_default();

        // Checked under the same write lock as the push
        if collection == USERS_COLLECTION {
            if let Some(email) = record.get("email").and_then(Value::as_str) {
                if email_taken(records, email) {
                    return Err(BackendError::ApiError {
                        status: 400,
                        message: "The email is invalid or already in use.".to_string(),
                    });
                }
            }
        }

        records.push(record.clone());
        Ok(record)
    }

    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<Value, BackendError> {
        let mut collections = self.collections.write().await;
        let record = collections
            .get_mut(collection)
            .and_then(|records| records.iter_mut().find(|r| r["id"] == id))
            .ok_or_else(|| BackendError::NotFound(format!("{}/{}", collection, id)))?;

        if let (Value::Object(fields), Value::Object(changes)) = (&mut *record, patch) {
            for (key, value) in changes {
                if key == "id" || key == "created" || WRITE_ONLY_FIELDS.contains(&key.as_str()) {
                    continue;
                }
                fields.insert(key, value);
            }
            fields.insert(
                "updated".to_string(),
                Value::String(format_timestamp(&Utc::now())),
            );
        }

        Ok(record.clone())
    }

    async fn auth_refresh(&self, token: &str) -> Result<Value, BackendError> {
        let user_id = self
            .sessions
            .read()
            .await
            .get(token)
            .cloned()
            .ok_or(BackendError::Unauthorized)?;

        let claims = decode_claims(token).map_err(|_| BackendError::Unauthorized)?;
        if claims.is_expired() {
            self.sessions.write().await.remove(token);
            return Err(BackendError::Unauthorized);
        }

        self.get_one(USERS_COLLECTION, &user_id)
            .await
            .map_err(|_| BackendError::Unauthorized)
    }

    async fn health(&self) -> Result<(), BackendError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token::test_token;
    use crate::backend::RecordFilter;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_create_assigns_id_and_stamps() {
        let store = MemoryStore::new();
        let record = store
            .create("loads", json!({"origin": "Lagos", "id": "ignored"}), vec![])
            .await
            .unwrap();

        let id = record["id"].as_str().unwrap();
        assert_eq!(id.len(), 15);
        assert_ne!(id, "ignored");
        assert!(record["created"].as_str().unwrap().ends_with('Z'));
        assert_eq!(store.count("loads").await, 1);
    }

    #[tokio::test]
    async fn test_create_with_files_records_names() {
        let store = MemoryStore::new();
        let files = vec![FileUpload {
            field: "documents".to_string(),
            file_name: "bol.pdf".to_string(),
            content_type: None,
            bytes: vec![1, 2, 3],
        }];
        let record = store.create("loads", json!({}), files).await.unwrap();
        assert_eq!(record["documents"], json!(["bol.pdf"]));
    }

    #[tokio::test]
    async fn test_list_filter_sort_page() {
        let store = MemoryStore::new();
        for (i, carrier) in ["u1", "u2", "u1", "u1"].iter().enumerate() {
            store
                .insert(
                    "loads",
                    json!({
                        "id": format!("load{}", i),
                        "carrier": carrier,
                        "created": format!("2024-01-0{} 00:00:00.000Z", i + 1),
                    }),
                )
                .await;
        }

        let options = ListOptions::first_page(2)
            .sort("-created")
            .filter(Some(RecordFilter::eq("carrier", "u1")));
        let page = store.list("loads", &options).await.unwrap();

        assert_eq!(page.total_items, 3);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0]["id"], "load3");
        assert_eq!(page.items[1]["id"], "load2");
    }

    #[tokio::test]
    async fn test_list_unknown_collection_is_empty() {
        let store = MemoryStore::new();
        let page = store.list("trucks", &ListOptions::default()).await.unwrap();
        assert_eq!(page.total_items, 0);
        assert!(page.items.is_empty());
    }

    #[tokio::test]
    async fn test_update_merges_patch() {
        let store = MemoryStore::new();
        let record = store
            .insert("loads", json!({"id": "a", "status": "posted", "created": "2024-01-01 00:00:00.000Z"}))
            .await;
        assert_eq!(record["id"], "a");

        let updated = store
            .update("loads", "a", json!({"status": "assigned", "created": "x"}))
            .await
            .unwrap();
        assert_eq!(updated["status"], "assigned");
        assert_eq!(updated["created"], "2024-01-01 00:00:00.000Z");

        let missing = store.update("loads", "nope", json!({})).await;
        assert!(matches!(missing, Err(BackendError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_passwords_not_stored() {
        let store = MemoryStore::new();
        let user = store
            .create(
                "users",
                json!({"email": "a@b.co", "password": "secret123", "passwordConfirm": "secret123"}),
                vec![],
            )
            .await
            .unwrap();
        assert!(user.get("password").is_none());
        assert!(user.get("passwordConfirm").is_none());
    }

    #[tokio::test]
    async fn test_auth_refresh() {
        let store = MemoryStore::new();
        store
            .insert("users", json!({"id": "user1", "user_type": "carrier"}))
            .await;

        let token = store.issue_token("user1").await.unwrap();
        let user = store.auth_refresh(&token).await.unwrap();
        assert_eq!(user["user_type"], "carrier");

        // Well-formed but never issued
        assert!(store.auth_refresh(&test_token("user1")).await.is_err());
        assert!(store.auth_refresh("garbage").await.is_err());
        assert!(store.issue_token("ghost").await.is_err());
    }

    #[tokio::test]
    async fn test_concurrent_signups_same_email() {
        let store = Arc::new(MemoryStore::new());
        let attempts = (0..8).map(|i| {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                let email = if i % 2 == 0 { "dup@haul.test" } else { "DUP@haul.test" };
                store
                    .create(USERS_COLLECTION, json!({"email": email}), vec![])
                    .await
            })
        });

        let mut created = 0;
        for attempt in attempts.collect::<Vec<_>>() {
            if attempt.await.unwrap().is_ok() {
                created += 1;
            }
        }
        assert_eq!(created, 1);
        assert_eq!(store.count(USERS_COLLECTION).await, 1);
    }
}
