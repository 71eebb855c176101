//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use std::sync::Arc;
use std::time::Instant;

use crate::backend::RecordStore;
use crate::config::Config;
use crate::mutation::{LoadService, MutationOptions};
use crate::notify::Notifier;
use crate::query::LoadQuery;
use crate::repository::{LoadRepository, UserDirectory};

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Record store every service reads and writes through
    pub store: Arc<dyn RecordStore>,
    /// Role-scoped load reads
    pub query: LoadQuery,
    /// Load create, update and claim
    pub service: LoadService,
    /// User lookups and registration
    pub users: UserDirectory,
    /// Outbound email channel
    pub notifier: Arc<dyn Notifier>,
    pub config: Arc<Config>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>, notifier: Arc<dyn Notifier>, config: Config) -> Self {
        let loads = LoadRepository::new(Arc::clone(&store)).with_page_size(config.api.page_size);
        let users = UserDirectory::new(Arc::clone(&store));

        let options = MutationOptions {
            strict_transitions: config.api.strict_transitions,
            notify_carriers: config.notifications.enabled,
            verified_carriers_only: config.notifications.verified_only,
        };
        let service = LoadService::new(
            loads.clone(),
            users.clone(),
            Arc::clone(&notifier),
            options,
        );

        Self {
            store,
            query: LoadQuery::new(loads),
            service,
            users,
            notifier,
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
