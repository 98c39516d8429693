// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Principals and the collaborator traits that produce them.
//!
//! The authentication core never stores principals itself. It asks a
//! [`PrincipalLookup`] to resolve the subject of a validated token, and the
//! login route asks a [`CredentialVerifier`] to check a login and password.

use std::collections::BTreeSet;

use async_trait::async_trait;

/// Identity used to mint a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Numeric identifier, if the backing store assigns one
    pub id: Option<i64>,
    /// Login (email) written into the token subject
    pub login: String,
    /// Granted capability strings
    pub capabilities: BTreeSet<String>,
}

impl Principal {
    pub fn new(login: impl Into<String>) -> Self {
        Self {
            id: None,
            login: login.into(),
            capabilities: BTreeSet::new(),
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_capabilities<I, S>(mut self, capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.capabilities.extend(capabilities.into_iter().map(Into::into));
        self
    }

    pub fn has_capability(&self, capability: &str) -> bool {
        self.capabilities.contains(capability)
    }
}

/// Errors raised by a principal store.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("principal already exists: {0}")]
    AlreadyExists(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("principal store unavailable: {0}")]
    Unavailable(String),
}

/// Resolves the subject of a validated token to a principal.
#[async_trait]
pub trait PrincipalLookup: Send + Sync {
    /// Returns `Ok(None)` when no principal matches `subject`.
    async fn find_principal_by_identifier(
        &self,
        subject: &str,
    ) -> Result<Option<Principal>, DirectoryError>;
}

/// Checks a login and password pair.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// Returns `Ok(None)` for an unknown login or a wrong password.
    async fn verify_credentials(
        &self,
        login: &str,
        password: &str,
    ) -> Result<Option<Principal>, DirectoryError>;
}
