//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! Loads and users are returned in their backend field naming.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::forms::{FieldError, WizardStep};
use crate::model::{ClearancePriority, ClearanceStatus, DocumentCounts, Load, User, UserRole};
use crate::query::LoadView;

// ============================================
// LOAD DTOs
// ============================================

/// Query string of `GET /api/v1/loads`
#[derive(Debug, Default, Deserialize)]
pub struct ListLoadsQuery {
    /// Defaults to the caller's role view, or `available` when anonymous
    #[serde(default)]
    pub view: Option<String>,
    /// Case-insensitive substring over id, reference, places and names
    #[serde(default)]
    pub search: Option<String>,
    /// Any status spelling; empty or `all` means no filter
    #[serde(default)]
    pub status: Option<String>,
    /// Equipment code or label; empty or `all` means no filter
    #[serde(default)]
    pub equipment: Option<String>,
    /// Customs clearance status; empty or `all` means no filter
    #[serde(default)]
    pub clearance: Option<String>,
}

/// Load list response
#[derive(Debug, Serialize)]
pub struct LoadListResponse {
    pub view: LoadView,
    pub total: usize,
    pub loads: Vec<Load>,
    /// Per-load customs summary, filled for the clearing view only
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub clearance: Vec<ClearanceSummary>,
}

/// Customs progress of one load
#[derive(Debug, Serialize)]
pub struct ClearanceSummary {
    pub load_id: String,
    pub status: ClearanceStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<ClearancePriority>,
    pub documents: DocumentCounts,
}

impl From<&Load> for ClearanceSummary {
    fn from(load: &Load) -> Self {
        Self {
            load_id: load.id.clone(),
            status: load.clearance(),
            priority: load.priority,
            documents: load.document_counts(),
        }
    }
}

/// Claim response
#[derive(Debug, Serialize)]
pub struct ClaimResponse {
    pub load: Load,
    pub claimed_by: String,
}

// ============================================
// FORM DTOs
// ============================================

/// Wizard validation request
#[derive(Debug, Deserialize)]
pub struct ValidateFormRequest {
    /// Step number or name; every step when absent
    #[serde(default)]
    pub step: Option<String>,
    /// Raw form values keyed by field name
    #[serde(default)]
    pub values: Value,
}

/// Wizard validation response
#[derive(Debug, Serialize)]
pub struct ValidateFormResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<WizardStep>,
    /// Step the wizard may move to when this one passed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_step: Option<WizardStep>,
    pub errors: Vec<FieldError>,
}

// ============================================
// USER DTOs
// ============================================

/// Registration request
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    #[serde(alias = "passwordConfirm")]
    pub password_confirm: String,
    #[serde(default, alias = "firstName")]
    pub first_name: String,
    #[serde(default, alias = "lastName")]
    pub last_name: String,
    #[serde(alias = "userType")]
    pub user_type: UserRole,
}

/// Registration response
#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub user: User,
    /// Dashboard for the new user's role
    pub dashboard: String,
    pub welcome_sent: bool,
}

/// Current auth state
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user_id: String,
    pub role: Option<UserRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dashboard: Option<String>,
    /// Load view shown to this user by default
    pub default_view: LoadView,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Full health status response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status: "healthy" or "degraded"
    pub status: String,
    /// Record store status: "ok" or "error"
    pub backend: String,
    /// Record store implementation
    pub backend_kind: String,
    /// Notification channel in use
    pub notifier: String,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Server version
    pub version: String,
}
