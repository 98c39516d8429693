// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Stateless bearer-token authentication for the Relational Auth API.
//!
//! ## Auth Flow
//!
//! 1. Client posts credentials to `/auth/login`
//! 2. Server verifies them and returns an HS256 token
//!    (`iss`, `sub`, `iat`, `exp`, optional `userId`)
//! 3. Client sends `Authorization: Bearer <token>` on later requests
//! 4. The interceptor, once per request:
//!    - verifies signature, issuer and expiry
//!    - looks up the principal named by `sub`
//!    - attaches it (with its capabilities) to the request extensions
//! 5. Extractors (`Auth`, `AdminOnly`) reject protected routes that are
//!    still unauthenticated
//!
//! ## Security
//!
//! - No server-side session or token storage; tokens expire on their own
//! - One process-wide secret; rotating it invalidates every token
//! - Clients never learn which token check failed

pub mod claims;
pub mod error;
pub mod extractor;
pub mod interceptor;
pub mod principal;
pub mod roles;
pub mod signer;
pub mod token_service;

pub use claims::{AuthenticatedPrincipal, ClaimSet, TokenIdentity};
pub use error::{AuthError, AuthFailure, SigningError};
pub use extractor::{AdminOnly, Auth, CurrentPrincipal};
pub use interceptor::{authenticate, Authenticator};
pub use principal::{CredentialVerifier, DirectoryError, Principal, PrincipalLookup};
pub use roles::{UserRole, CAPABILITY_ADMIN, CAPABILITY_USER};
pub use token_service::{IssuedToken, TokenService};
