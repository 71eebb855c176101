//! Load Query Layer
//!
//! Reads loads for the dashboards:
//!
//! - **View**: role-scoped slices (available, mine, shipper, tracking, clearing)
//! - **Filter**: client-side search plus status and equipment equality
//! - **Executor**: one capped list query per fetch
//! - **Stats**: dashboard counters
//! - **Projection**: an in-memory copy of a view with optimistic patches
//!
//! # Example
//!
//! ```rust,ignore
//! use loadboard::query::{LoadFilter, LoadQuery, LoadView};
//!
//! let filter = LoadFilter::new().search("lagos");
//! let loads = query.fetch(LoadView::Mine, Some(&user_id), &filter).await?;
//! ```

mod error;
mod executor;
mod filter;
mod projection;
mod stats;
mod view;

pub use error::{QueryError, QueryResult};
pub use executor::LoadQuery;
pub use filter::LoadFilter;
pub use projection::LoadProjection;
pub use stats::LoadStats;
pub use view::LoadView;
