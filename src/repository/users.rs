//! Typed access to the `users` collection

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::backend::{BackendError, ListOptions, RecordFilter, RecordStore};
use crate::model::{User, UserRole, USERS_COLLECTION};

const USERS_PAGE_SIZE: u32 = 200;

/// Fields sent when registering a user
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    #[serde(rename = "passwordConfirm")]
    pub password_confirm: String,
    pub first_name: String,
    pub last_name: String,
    pub user_type: UserRole,
}

#[derive(Clone)]
pub struct UserDirectory {
    store: Arc<dyn RecordStore>,
}

impl UserDirectory {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn get(&self, id: &str) -> Result<User, BackendError> {
        let record = self.store.get_one(USERS_COLLECTION, id).await?;
        Ok(serde_json::from_value(record)?)
    }

    /// Every user with `role`, walking all pages
    pub async fn list_by_role(
        &self,
        role: UserRole,
        verified_only: bool,
    ) -> Result<Vec<User>, BackendError> {
        let mut filter = RecordFilter::eq("user_type", role.as_str());
        if verified_only {
            filter = filter.and(RecordFilter::flag("verified", true));
        }

        let mut users = Vec::new();
        let mut page = 1;
        loop {
            let options = ListOptions {
                page,
                per_page: USERS_PAGE_SIZE,
                sort: Some("created".to_string()),
                filter: Some(filter.clone()),
            };
            let result = self.store.list(USERS_COLLECTION, &options).await?;
            let total_pages = result.total_pages;
            users.extend(result.decode::<User>()?.items);

            if u64::from(page) >= total_pages {
                break;
            }
            page += 1;
        }

        Ok(users)
    }

    pub async fn create(&self, user: &NewUser) -> Result<User, BackendError> {
        let record: Value = serde_json::to_value(user)?;
        let created = self.store.create(USERS_COLLECTION, record, Vec::new()).await?;
        Ok(serde_json::from_value(created)?)
    }

    /// Resolve an auth token to its user through the backend
    pub async fn verify_token(&self, token: &str) -> Result<User, BackendError> {
        let record = self.store.auth_refresh(token).await?;
        Ok(serde_json::from_value(record)?)
    }
}
