// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors reading the principal attached by the interceptor.
//!
//! These form the authorization layer: the interceptor never rejects a
//! request, so a protected handler asks for `Auth` (or `AdminOnly`) and an
//! anonymous request is turned away here.
//!
//! ```rust,ignore
//! async fn my_handler(Auth(user): Auth) -> impl IntoResponse {
//!     // user is AuthenticatedPrincipal
//! }
//! ```

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};

use super::roles::CAPABILITY_ADMIN;
use super::{AuthError, AuthenticatedPrincipal};

/// The principal of the current request, if any. Never rejects.
pub struct CurrentPrincipal(pub Option<AuthenticatedPrincipal>);

impl<S: Send + Sync> FromRequestParts<S> for CurrentPrincipal {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(CurrentPrincipal(
            parts.extensions.get::<AuthenticatedPrincipal>().cloned(),
        ))
    }
}

/// Extractor for authenticated principals.
///
/// Rejects with 401 when the interceptor did not authenticate the request.
pub struct Auth(pub AuthenticatedPrincipal);

impl<S: Send + Sync> FromRequestParts<S> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedPrincipal>()
            .cloned()
            .map(Auth)
            .ok_or(AuthError::Unauthenticated)
    }
}

/// Extractor that requires the `ROLE_ADMIN` capability.
pub struct AdminOnly(pub AuthenticatedPrincipal);

impl<S: Send + Sync> FromRequestParts<S> for AdminOnly {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Auth(user) = Auth::from_request_parts(parts, state).await?;

        if !user.has_capability(CAPABILITY_ADMIN) {
            return Err(AuthError::InsufficientPermissions);
        }

        Ok(AdminOnly(user))
    }
}
