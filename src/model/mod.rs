//! Domain model
//!
//! - **load**: the `Load` record and its visibility
//! - **clearance**: customs clearance status and documents
//! - **status**: canonical lifecycle status with legacy spellings
//! - **equipment**: equipment types (code or label input)
//! - **user**: users and their roles
//! - **serde_pb**: adapters for record backend field conventions

pub mod clearance;
pub mod equipment;
pub mod load;
pub mod serde_pb;
pub mod status;
pub mod user;

pub use clearance::{
    ClearanceDocument, ClearancePriority, ClearanceStatus, DocumentCounts, DocumentStatus,
};
pub use equipment::EquipmentType;
pub use load::{Load, Visibility, LOADS_COLLECTION};
pub use status::{LoadStatus, ParseStatusError};
pub use user::{User, UserRole, USERS_COLLECTION};
