//! Auth Gate
//!
//! Reads the backend's auth tokens off incoming requests. Sessions (login,
//! refresh, logout) belong to the backend; this module only inspects them.

mod context;
mod gate;
pub mod token;

pub use context::{AuthContext, MaybeAuth};
pub use gate::{auth_middleware, request_token, AuthGate};
pub use token::{decode_claims, AuthCookie, TokenClaims, TokenError, AUTH_COOKIE};
