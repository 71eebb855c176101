//! # Loadboard
//!
//! Freight marketplace service: shippers post loads, carriers browse and
//! claim them, clearing agents follow customs progress. Records live in a
//! hosted PocketBase backend; this crate owns the load lifecycle on top of it.
//!
//! ## Modules
//!
//! - [`backend`]: Record store seam with the PocketBase client and an in-memory store
//! - [`repository`]: Typed access to loads and users
//! - [`query`]: Role-scoped views, filtering, stats and local projections
//! - [`mutation`]: Create, update and claim
//! - [`forms`]: Wizard field rules and step navigation
//! - [`notify`]: New-load and welcome emails
//! - [`auth`]: Auth token inspection and route protection
//! - [`api`]: REST API server with Axum
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use loadboard::backend::MemoryStore;
//! use loadboard::mutation::{LoadService, MutationOptions, NewLoad};
//! use loadboard::notify::NoopNotifier;
//! use loadboard::query::{LoadFilter, LoadQuery, LoadView};
//! use loadboard::repository::{LoadRepository, UserDirectory};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(MemoryStore::new());
//!     let loads = LoadRepository::new(store.clone());
//!     let service = LoadService::new(
//!         loads.clone(),
//!         UserDirectory::new(store),
//!         Arc::new(NoopNotifier),
//!         MutationOptions::default(),
//!     );
//!
//!     let new_load = NewLoad {
//!         origin: "Lagos".into(),
//!         destination: "Accra".into(),
//!         ..Default::default()
//!     };
//!     let created = service.create(new_load, Vec::new(), Some("shipper-1")).await?;
//!     println!("Created {}", created.load.reference_number);
//!
//!     let board = LoadQuery::new(loads)
//!         .fetch(LoadView::Available, None, &LoadFilter::new())
//!         .await?;
//!     println!("{} loads on the board", board.len());
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod backend;
pub mod config;
pub mod forms;
pub mod model;
pub mod mutation;
pub mod notify;
pub mod query;
pub mod repository;

// Re-export top-level types for convenience
pub use model::{
    ClearanceStatus, DocumentStatus, EquipmentType, Load, LoadStatus, User, UserRole, Visibility,
};

pub use backend::{BackendError, MemoryStore, PocketBaseClient, RecordFilter, RecordStore};

pub use query::{LoadFilter, LoadQuery, LoadStats, LoadView, QueryError};

pub use mutation::{LoadPatch, LoadService, MutationError, NewLoad};

pub use forms::{LoadForm, ValidationError, Wizard, WizardStep};

pub use api::{build_router, serve, ApiError, AppState};

pub use config::{Config, ConfigError};
