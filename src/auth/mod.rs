//! Bearer token authentication.
//!
//! Tokens are issued by an external identity provider. This module only
//! verifies them and hands the user ID to the route handlers.

mod middleware;
mod token;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

pub use middleware::{AuthState, auth_guard};
pub use token::{Claims, TokenVerifier, issue_hs256_token};

/// The reasons a request may fail authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// The request did not have an `Authorization: Bearer` header.
    #[error("missing bearer token")]
    MissingToken,

    /// The bearer token was malformed, expired, or signed by someone else.
    #[error("invalid bearer token")]
    InvalidToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.to_string(),
        }));

        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}
