//! Request auth state

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use serde::Serialize;

use crate::api::ApiError;
use crate::model::UserRole;

/// The signed-in user behind a request.
///
/// Inserted into request extensions by the auth gate; handlers take it as
/// an extractor. Requests without it are rejected with 401.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthContext {
    pub user_id: String,
    pub role: Option<UserRole>,
    #[serde(skip)]
    pub token: String,
}

impl AuthContext {
    pub fn new(user_id: impl Into<String>, role: Option<UserRole>, token: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            role,
            token: token.into(),
        }
    }

    pub fn is(&self, role: UserRole) -> bool {
        self.role == Some(role)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or(ApiError::Unauthorized)
    }
}

/// Auth state for handlers that also serve anonymous requests
#[derive(Debug, Clone)]
pub struct MaybeAuth(pub Option<AuthContext>);

impl MaybeAuth {
    pub fn user_id(&self) -> Option<&str> {
        self.0.as_ref().map(|ctx| ctx.user_id.as_str())
    }

    pub fn role(&self) -> Option<UserRole> {
        self.0.as_ref().and_then(|ctx| ctx.role)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for MaybeAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeAuth(parts.extensions.get::<AuthContext>().cloned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    #[tokio::test]
    async fn test_extract_missing_context() {
        let (mut parts, _) = Request::builder().body(()).unwrap().into_parts();
        let result = AuthContext::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(ApiError::Unauthorized)));

        let maybe = MaybeAuth::from_request_parts(&mut parts, &()).await.unwrap();
        assert!(maybe.0.is_none());
    }

    #[tokio::test]
    async fn test_extract_context() {
        let (mut parts, _) = Request::builder().body(()).unwrap().into_parts();
        parts
            .extensions
            .insert(AuthContext::new("u1", Some(UserRole::Carrier), "tok"));

        let ctx = AuthContext::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(ctx.user_id, "u1");
        assert!(ctx.is(UserRole::Carrier));

        let maybe = MaybeAuth::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(maybe.user_id(), Some("u1"));
        assert_eq!(maybe.role(), Some(UserRole::Carrier));
    }
}
