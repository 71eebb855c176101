//! User Routes
//!
//! - POST /api/v1/signup - Register a user and send the welcome email
//! - GET /api/v1/session - Auth state of the caller

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::{SessionResponse, SignupRequest, SignupResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::auth::AuthContext;
use crate::backend::BackendError;
use crate::forms::{FieldError, ValidationError};
use crate::notify::WelcomeMessage;
use crate::query::LoadView;
use crate::repository::NewUser;

const MIN_PASSWORD_LEN: usize = 8;

fn validate_signup(req: &SignupRequest) -> ApiResult<()> {
    let email_re = regex::Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
        .map_err(|_| ApiError::Internal("Regex error".to_string()))?;

    let mut errors = ValidationError::default();
    if !email_re.is_match(req.email.trim()) {
        errors.push(FieldError::new("email", "Enter a valid email address"));
    }
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(FieldError::new(
            "password",
            format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
        ));
    }
    if req.password != req.password_confirm {
        errors.push(FieldError::new("passwordConfirm", "Passwords do not match"));
    }
    if req.first_name.trim().is_empty() {
        errors.push(FieldError::new("first_name", "First name is required"));
    }

    Ok(errors.into_result()?)
}

/// POST /api/v1/signup
///
/// The welcome email is best effort: a failed send is logged and reported
/// as `welcome_sent: false`.
pub async fn signup(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignupRequest>,
) -> ApiResult<(StatusCode, Json<SignupResponse>)> {
    validate_signup(&req)?;

    let new_user = NewUser {
        email: req.email.trim().to_string(),
        password: req.password,
        password_confirm: req.password_confirm,
        first_name: req.first_name.trim().to_string(),
        last_name: req.last_name.trim().to_string(),
        user_type: req.user_type,
    };

    let user = state.users.create(&new_user).await.map_err(|e| match e {
        // Duplicate emails and backend field rules come back as 400
        BackendError::ApiError { status: 400, message } => ApiError::BadRequest(message),
        other => ApiError::from(other),
    })?;
    tracing::info!(user_id = %user.id, user_type = %req.user_type, "User registered");

    let welcome_sent = if state.config.notifications.enabled {
        let welcome = WelcomeMessage {
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            user_type: req.user_type,
        };
        match state.notifier.send_welcome(&welcome).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(user_id = %user.id, error = %e, "Failed to send welcome email");
                false
            }
        }
    } else {
        false
    };

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            dashboard: req.user_type.dashboard_path().to_string(),
            user,
            welcome_sent,
        }),
    ))
}

/// GET /api/v1/session
pub async fn session(auth: AuthContext) -> Json<SessionResponse> {
    Json(SessionResponse {
        dashboard: auth.role.map(|r| r.dashboard_path().to_string()),
        default_view: auth.role.map(LoadView::for_role).unwrap_or_default(),
        role: auth.role,
        user_id: auth.user_id,
    })
}
