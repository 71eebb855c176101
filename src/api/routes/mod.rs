//! API Routes
//!
//! Route handlers organized by functionality.

pub mod forms;
pub mod health;
pub mod loads;
pub mod users;
