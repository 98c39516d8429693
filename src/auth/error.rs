// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.
//!
//! Two layers:
//!
//! - [`AuthFailure`] is the closed set of reasons a request could not be
//!   authenticated. It never leaves the server: the interceptor logs it and
//!   lets the request continue unauthenticated.
//! - [`AuthError`] is what the authorization layer (extractors, login route)
//!   returns to the client. It does not say which token check failed.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Why a token or request could not be resolved to a principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthFailure {
    /// Header or token does not have the expected shape
    #[error("token is malformed")]
    Malformed,
    /// Token was tampered with or signed with another key
    #[error("token signature does not match")]
    SignatureMismatch,
    /// Token is past its expiry
    #[error("token has expired")]
    Expired,
    /// Token was minted by another issuer
    #[error("token issuer does not match")]
    IssuerMismatch,
    /// Token is valid but its subject has no principal record
    #[error("no principal matches the token subject")]
    PrincipalNotFound,
}

impl AuthFailure {
    /// Stable label used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthFailure::Malformed => "malformed",
            AuthFailure::SignatureMismatch => "signature_mismatch",
            AuthFailure::Expired => "expired",
            AuthFailure::IssuerMismatch => "issuer_mismatch",
            AuthFailure::PrincipalNotFound => "principal_not_found",
        }
    }
}

/// Token encoding failed while issuing.
#[derive(Debug, thiserror::Error)]
#[error("failed to sign token: {0}")]
pub struct SigningError(#[from] pub jsonwebtoken::errors::Error);

/// Authentication error returned to HTTP clients.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Route requires an authenticated principal and none is attached
    #[error("Authentication is required")]
    Unauthenticated,
    /// Login with an unknown user or a wrong password
    #[error("Invalid login or password")]
    InvalidCredentials,
    /// Principal lacks the capability the route requires
    #[error("Insufficient permissions for this operation")]
    InsufficientPermissions,
    /// Internal error
    #[error("Internal authentication error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    error_code: String,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::Unauthenticated => "unauthenticated",
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::InsufficientPermissions => "insufficient_permissions",
            AuthError::Internal(_) => "internal_error",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Unauthenticated | AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::InsufficientPermissions => StatusCode::FORBIDDEN,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<SigningError> for AuthError {
    fn from(err: SigningError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(AuthErrorBody {
            error: self.to_string(),
            error_code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}
