//! Route protection
//!
//! Every request passes through [`auth_middleware`]. A token is read from
//! the `pb_auth` cookie or an `Authorization: Bearer` header and confirmed
//! with the backend; only a confirmed token becomes an [`AuthContext`],
//! carrying the backend's user id and role. Requests on a protected
//! prefix without valid auth are redirected to the login page; signed-in
//! requests are never redirected.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;

use super::context::AuthContext;
use super::token::{cookie_value, decode_claims, AuthCookie, AUTH_COOKIE};
use crate::config::AuthConfig;
use crate::repository::UserDirectory;

/// Pull the auth token from the auth cookie, then the bearer header
pub fn request_token(headers: &HeaderMap) -> Option<String> {
    let from_cookie = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|raw| cookie_value(raw, AUTH_COOKIE))
        .and_then(AuthCookie::parse)
        .map(|cookie| cookie.token);

    from_cookie.or_else(|| {
        let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
        let token = value.strip_prefix("Bearer ")?.trim();
        (!token.is_empty()).then(|| token.to_string())
    })
}

pub struct AuthGate {
    config: AuthConfig,
    users: UserDirectory,
}

impl AuthGate {
    pub fn new(config: AuthConfig, users: UserDirectory) -> Self {
        Self { config, users }
    }

    /// Whether `path` sits under one of the protected prefixes
    pub fn is_protected(&self, path: &str) -> bool {
        self.config.protected_prefixes.iter().any(|prefix| {
            let prefix = prefix.trim_end_matches('/');
            path == prefix
                || path
                    .strip_prefix(prefix)
                    .is_some_and(|rest| rest.starts_with('/'))
        })
    }

    /// Login location carrying the originally requested path
    pub fn login_redirect(&self, path: &str) -> String {
        format!(
            "{}?redirect={}",
            self.config.login_path,
            urlencoding::encode(path)
        )
    }

    /// Resolve the request's auth state, `None` when absent or not
    /// confirmed by the backend
    pub async fn resolve(&self, headers: &HeaderMap) -> Option<AuthContext> {
        let token = request_token(headers)?;

        let claims = match decode_claims(&token) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring undecodable auth token");
                return None;
            }
        };
        if claims.is_expired() {
            tracing::debug!(user_id = %claims.id, "Auth token expired");
            return None;
        }

        match self.users.verify_token(&token).await {
            Ok(user) if user.id == claims.id => {
                Some(AuthContext::new(user.id, user.user_type, token))
            }
            Ok(user) => {
                tracing::warn!(claimed = %claims.id, actual = %user.id, "Auth token subject mismatch");
                None
            }
            Err(e) => {
                tracing::warn!(user_id = %claims.id, error = %e, "Auth token rejected by backend");
                None
            }
        }
    }
}

/// Attach auth state to the request and guard protected prefixes
pub async fn auth_middleware(
    State(gate): State<Arc<AuthGate>>,
    mut request: Request,
    next: Next,
) -> Response {
    match gate.resolve(request.headers()).await {
        Some(ctx) => {
            request.extensions_mut().insert(ctx);
            next.run(request).await
        }
        None if gate.is_protected(request.uri().path()) => {
            let path = request.uri().path();
            tracing::debug!(path = %path, "Redirecting unauthenticated request to login");
            Redirect::to(&gate.login_redirect(path)).into_response()
        }
        None => next.run(request).await,
    }
}
