// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies of the REST API. All types derive `ToSchema`
//! for OpenAPI documentation.
//!
//! ## Model Categories
//!
//! - **Auth**: Login and registration
//! - **Principals**: The current user and the admin listing

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{AuthenticatedPrincipal, IssuedToken, Principal, UserRole};

// =============================================================================
// Auth
// =============================================================================

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Login (email address)
    pub login: String,
    pub password: String,
}

/// Signed bearer token returned by a successful login.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    /// Always `Bearer`
    pub token_type: String,
    /// Seconds until the token expires
    pub expires_in: i64,
}

impl From<IssuedToken> for LoginResponse {
    fn from(issued: IssuedToken) -> Self {
        Self {
            expires_in: issued.expires_in(),
            token: issued.token,
            token_type: "Bearer".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RegisterRequest {
    /// Login (email address)
    pub login: String,
    pub password: String,
    /// Defaults to `user`
    #[serde(default)]
    pub role: Option<UserRole>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterResponse {
    pub id: i64,
    pub login: String,
    pub role: UserRole,
}

// =============================================================================
// Principals
// =============================================================================

/// A principal as exposed over the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PrincipalResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    pub login: String,
    pub capabilities: Vec<String>,
}

impl From<Principal> for PrincipalResponse {
    fn from(principal: Principal) -> Self {
        Self {
            user_id: principal.id,
            login: principal.login,
            capabilities: principal.capabilities.into_iter().collect(),
        }
    }
}

impl From<AuthenticatedPrincipal> for PrincipalResponse {
    fn from(user: AuthenticatedPrincipal) -> Self {
        user.principal.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    #[test]
    fn login_response_from_issued_token() {
        let issued_at: DateTime<Utc> = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let response: LoginResponse = IssuedToken {
            token: "a.b.c".to_string(),
            issued_at,
            expires_at: issued_at + chrono::Duration::hours(2),
        }
        .into();

        assert_eq!(response.token, "a.b.c");
        assert_eq!(response.token_type, "Bearer");
        assert_eq!(response.expires_in, 7200);
    }

    #[test]
    fn register_request_role_defaults_to_none() {
        let request: RegisterRequest =
            serde_json::from_str(r#"{"login":"a@b.com","password":"pw"}"#).unwrap();
        assert!(request.role.is_none());

        let request: RegisterRequest =
            serde_json::from_str(r#"{"login":"a@b.com","password":"pw","role":"admin"}"#).unwrap();
        assert_eq!(request.role, Some(UserRole::Admin));
    }

    #[test]
    fn register_request_role_is_case_insensitive() {
        let request: RegisterRequest =
            serde_json::from_str(r#"{"login":"a@b.com","password":"pw","role":"ADMIN"}"#).unwrap();
        assert_eq!(request.role, Some(UserRole::Admin));

        let request: RegisterRequest =
            serde_json::from_str(r#"{"login":"a@b.com","password":"pw","role":"User"}"#).unwrap();
        assert_eq!(request.role, Some(UserRole::User));

        assert!(serde_json::from_str::<RegisterRequest>(
            r#"{"login":"a@b.com","password":"pw","role":"root"}"#
        )
        .is_err());
    }

    #[test]
    fn principal_response_lists_capabilities_in_order() {
        let principal = Principal::new("a@b.com")
            .with_id(5)
            .with_capabilities(["ROLE_USER", "ROLE_ADMIN"]);
        let response = PrincipalResponse::from(principal);

        assert_eq!(response.user_id, Some(5));
        assert_eq!(response.capabilities, ["ROLE_ADMIN", "ROLE_USER"]);
    }
}
