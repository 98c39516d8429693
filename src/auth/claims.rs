// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token claims and the authenticated principal attached to a request.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::principal::Principal;

/// Custom claim carrying the principal's numeric id.
pub const USER_ID_CLAIM: &str = "userId";

/// Claims embedded in every token payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimSet {
    /// Issuer (this service)
    pub iss: String,

    /// Subject (principal login)
    pub sub: String,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// Custom claims (`userId` and anything else the issuer adds)
    #[serde(flatten)]
    pub custom: Map<String, Value>,
}

impl ClaimSet {
    /// Build the claim set for `principal`, valid from `issued_at` to `expires_at`.
    pub fn for_principal(
        principal: &Principal,
        issuer: &str,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        let mut custom = Map::new();
        if let Some(id) = principal.id {
            custom.insert(USER_ID_CLAIM.to_string(), Value::from(id));
        }

        Self {
            iss: issuer.to_string(),
            sub: principal.login.clone(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            custom,
        }
    }

    /// The `userId` custom claim, if present and numeric.
    pub fn user_id(&self) -> Option<i64> {
        self.custom.get(USER_ID_CLAIM).and_then(Value::as_i64)
    }
}

/// Identity recovered from a valid token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenIdentity {
    pub subject: String,
    pub user_id: Option<i64>,
    /// Token expiration (Unix timestamp)
    pub expires_at: i64,
}

impl From<ClaimSet> for TokenIdentity {
    fn from(claims: ClaimSet) -> Self {
        let user_id = claims.user_id();
        Self {
            subject: claims.sub,
            user_id,
            expires_at: claims.exp,
        }
    }
}

/// Principal attached to a request by the authentication interceptor.
///
/// Lives in the request extensions and is dropped with the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedPrincipal {
    pub principal: Principal,

    /// Token expiration (Unix timestamp)
    pub expires_at: i64,
}

impl AuthenticatedPrincipal {
    pub fn new(principal: Principal, identity: &TokenIdentity) -> Self {
        Self {
            principal,
            expires_at: identity.expires_at,
        }
    }

    pub fn login(&self) -> &str {
        &self.principal.login
    }

    pub fn capabilities(&self) -> &BTreeSet<String> {
        &self.principal.capabilities
    }

    pub fn has_capability(&self, capability: &str) -> bool {
        self.principal.has_capability(capability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn t0() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn claims_include_user_id_when_principal_has_one() {
        let principal = Principal::new("a@b.com").with_id(42);
        let claims = ClaimSet::for_principal(&principal, "auth-api", t0(), t0() + Duration::hours(2));

        assert_eq!(claims.sub, "a@b.com");
        assert_eq!(claims.exp - claims.iat, 7200);
        assert_eq!(claims.user_id(), Some(42));

        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["userId"], 42);
        assert_eq!(json["iss"], "auth-api");
    }

    #[test]
    fn claims_omit_user_id_without_id() {
        let principal = Principal::new("a@b.com");
        let claims = ClaimSet::for_principal(&principal, "auth-api", t0(), t0() + Duration::hours(2));

        let json = serde_json::to_value(&claims).unwrap();
        assert!(json.get("userId").is_none());
        assert_eq!(claims.user_id(), None);
    }

    #[test]
    fn identity_from_claims() {
        let principal = Principal::new("a@b.com").with_id(3);
        let claims = ClaimSet::for_principal(&principal, "auth-api", t0(), t0() + Duration::hours(1));
        let identity = TokenIdentity::from(claims);

        assert_eq!(identity.subject, "a@b.com");
        assert_eq!(identity.user_id, Some(3));
        assert_eq!(identity.expires_at, t0().timestamp() + 3600);
    }
}
