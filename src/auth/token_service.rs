// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token issuance and validation.
//!
//! [`TokenService`] owns the immutable token configuration (secret, issuer,
//! lifetime). It is built once at startup and shared behind an `Arc`.

use std::time::Duration;

use chrono::{DateTime, Utc};

use super::claims::{ClaimSet, TokenIdentity};
use super::error::{AuthFailure, SigningError};
use super::principal::Principal;
use super::signer::TokenSigner;
use crate::config::TokenSettings;

/// A freshly signed token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl IssuedToken {
    /// Seconds from issuance to expiry.
    pub fn expires_in(&self) -> i64 {
        (self.expires_at - self.issued_at).num_seconds()
    }
}

/// Issues and validates bearer tokens.
#[derive(Clone)]
pub struct TokenService {
    signer: TokenSigner,
    issuer: String,
    lifetime: Duration,
}

impl TokenService {
    pub fn new(settings: &TokenSettings) -> Self {
        Self {
            signer: TokenSigner::new(settings),
            issuer: settings.issuer.clone(),
            lifetime: settings.lifetime,
        }
    }

    /// Issue a token for `principal` with the configured lifetime.
    pub fn issue(&self, principal: &Principal) -> Result<IssuedToken, SigningError> {
        self.issue_with_lifetime(principal, self.lifetime, Utc::now())
    }

    /// Issue a token for `principal` valid from `now` for `lifetime`.
    pub fn issue_with_lifetime(
        &self,
        principal: &Principal,
        lifetime: Duration,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, SigningError> {
        // Whole seconds only: `iat`/`exp` are second-resolution claims.
        let issued_at = DateTime::from_timestamp(now.timestamp(), 0).unwrap_or(now);
        let expires_at = chrono::Duration::from_std(lifetime)
            .ok()
            .and_then(|lifetime| issued_at.checked_add_signed(lifetime))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let claims = ClaimSet::for_principal(principal, &self.issuer, issued_at, expires_at);
        let token = self.signer.sign(&claims)?;

        tracing::debug!(
            subject = %claims.sub,
            expires_at = claims.exp,
            "Issued token"
        );

        Ok(IssuedToken {
            token,
            issued_at,
            expires_at,
        })
    }

    /// Verify `token` now, reporting why it failed.
    pub fn verify(&self, token: &str) -> Result<TokenIdentity, AuthFailure> {
        self.verify_at(token, Utc::now())
    }

    /// Verify `token` as of `now`, reporting why it failed.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<TokenIdentity, AuthFailure> {
        self.signer.verify(token, now).map(TokenIdentity::from)
    }

    /// Validate `token` now. Every failure is "no identity".
    pub fn validate(&self, token: &str) -> Option<TokenIdentity> {
        self.validate_at(token, Utc::now())
    }

    /// Validate `token` as of `now`. Every failure is "no identity".
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Option<TokenIdentity> {
        self.verify_at(token, now).ok()
    }
}
