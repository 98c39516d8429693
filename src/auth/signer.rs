// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HS256 token signing and verification.
//!
//! Tokens use the compact `header.payload.signature` serialization. The
//! signature is an HMAC-SHA256 over `header.payload` keyed with the process
//! secret; `jsonwebtoken` compares it in constant time.
//!
//! Expiry is checked here against a caller-supplied clock reading rather than
//! inside `jsonwebtoken`, so validation at a given instant is reproducible.

use chrono::{DateTime, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};

use super::claims::ClaimSet;
use super::error::{AuthFailure, SigningError};
use crate::config::TokenSettings;

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Signs claim sets and verifies tokens with one symmetric secret.
#[derive(Clone)]
pub struct TokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    /// Clock skew tolerance on `exp`, in seconds
    leeway: i64,
}

impl TokenSigner {
    pub fn new(settings: &TokenSettings) -> Self {
        let secret = settings.secret.as_bytes();

        let mut validation = Validation::new(ALGORITHM);
        validation.set_issuer(&[settings.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation.validate_exp = false;
        validation.validate_aud = false;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            leeway: i64::try_from(settings.leeway.as_secs()).unwrap_or(i64::MAX),
        }
    }

    /// Encode and sign `claims`.
    pub fn sign(&self, claims: &ClaimSet) -> Result<String, SigningError> {
        Ok(encode(&Header::new(ALGORITHM), claims, &self.encoding_key)?)
    }

    /// Check signature, issuer and expiry of `token` as of `now`.
    ///
    /// The signature is verified before any claim is looked at.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<ClaimSet, AuthFailure> {
        let claims = decode::<ClaimSet>(token, &self.decoding_key, &self.validation)
            .map_err(|e| map_error_kind(e.kind()))?
            .claims;

        if now.timestamp() > claims.exp.saturating_add(self.leeway) {
            return Err(AuthFailure::Expired);
        }

        Ok(claims)
    }
}

fn map_error_kind(kind: &ErrorKind) -> AuthFailure {
    match kind {
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => AuthFailure::SignatureMismatch,
        ErrorKind::InvalidIssuer => AuthFailure::IssuerMismatch,
        ErrorKind::ExpiredSignature => AuthFailure::Expired,
        _ => AuthFailure::Malformed,
    }
}
