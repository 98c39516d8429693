// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory principal directory.
//!
//! Holds registered users with Argon2 (PHC string) password hashes and their
//! roles. Implements [`PrincipalLookup`] for the interceptor and
//! [`CredentialVerifier`] for the login route. Nothing is persisted.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::LazyLock;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use tokio::sync::RwLock;
use unicode_normalization::UnicodeNormalization;

use crate::auth::{CredentialVerifier, DirectoryError, Principal, PrincipalLookup, UserRole};

#[derive(Debug, Clone)]
struct UserRecord {
    id: i64,
    login: String,
    password_hash: String,
    role: UserRole,
}

impl UserRecord {
    fn principal(&self) -> Principal {
        Principal::new(self.login.clone())
            .with_id(self.id)
            .with_capabilities(self.role.capabilities().iter().copied())
    }
}

/// Hash checked on unknown logins so a miss costs the same as a wrong password.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("relational-auth-unknown-login").ok());

/// Canonical form of a login: NFKC, trimmed, lowercased.
pub fn normalize_login(login: &str) -> String {
    login.nfkc().collect::<String>().trim().to_lowercase()
}

#[derive(Default)]
pub struct InMemoryDirectory {
    users: RwLock<HashMap<String, UserRecord>>,
    next_id: AtomicI64,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new principal.
    ///
    /// # Errors
    /// `InvalidInput` for an empty login or password, `AlreadyExists` when the
    /// normalized login is taken.
    pub async fn register(
        &self,
        login: &str,
        password: &str,
        role: UserRole,
    ) -> Result<Principal, DirectoryError> {
        let login = normalize_login(login);
        if login.is_empty() {
            return Err(DirectoryError::InvalidInput("login must not be empty".to_string()));
        }
        if password.is_empty() {
            return Err(DirectoryError::InvalidInput("password must not be empty".to_string()));
        }

        if self.users.read().await.contains_key(&login) {
            return Err(DirectoryError::AlreadyExists(login));
        }

        let password = password.to_string();
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| DirectoryError::Hashing(e.to_string()))??;

        let mut users = self.users.write().await;
        if users.contains_key(&login) {
            return Err(DirectoryError::AlreadyExists(login));
        }

        let record = UserRecord {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            login: login.clone(),
            password_hash,
            role,
        };
        let principal = record.principal();
        users.insert(login, record);

        tracing::info!(login = %principal.login, role = %role, "Registered principal");
        Ok(principal)
    }

    /// All registered principals, ordered by id.
    pub async fn list_principals(&self) -> Vec<Principal> {
        let users = self.users.read().await;
        let mut records: Vec<&UserRecord> = users.values().collect();
        records.sort_by_key(|r| r.id);
        records.into_iter().map(UserRecord::principal).collect()
    }

}

#[async_trait]
impl PrincipalLookup for InMemoryDirectory {
    async fn find_principal_by_identifier(
        &self,
        subject: &str,
    ) -> Result<Option<Principal>, DirectoryError> {
        let login = normalize_login(subject);
        let users = self.users.read().await;
        Ok(users.get(&login).map(UserRecord::principal))
    }
}

#[async_trait]
impl CredentialVerifier for InMemoryDirectory {
    async fn verify_credentials(
        &self,
        login: &str,
        password: &str,
    ) -> Result<Option<Principal>, DirectoryError> {
        let login = normalize_login(login);
        let record = self.users.read().await.get(&login).cloned();
        let Some(record) = record else {
            let password = password.to_string();
            tokio::task::spawn_blocking(move || {
                if let Some(hash) = DUMMY_HASH.as_deref() {
                    let _ = verify_password(&password, hash);
                }
            })
            .await
            .map_err(|e| DirectoryError::Hashing(e.to_string()))?;
            return Ok(None);
        };

        let password = password.to_string();
        let hash = record.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| DirectoryError::Hashing(e.to_string()))??;

        Ok(matches.then(|| record.principal()))
    }
}

fn hash_password(password: &str) -> Result<String, DirectoryError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| DirectoryError::Hashing(e.to_string()))
}

fn verify_password(password: &str, hash: &str) -> Result<bool, DirectoryError> {
    let parsed = PasswordHash::new(hash).map_err(|e| DirectoryError::Hashing(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{CAPABILITY_ADMIN, CAPABILITY_USER};

    #[test]
    fn logins_are_normalized() {
        assert_eq!(normalize_login("  Alice@Example.COM "), "alice@example.com");
        // Fullwidth letters fold under NFKC.
        assert_eq!(normalize_login("ａｂｃ"), "abc");
    }

    #[tokio::test]
    async fn register_assigns_ids_and_capabilities() {
        let directory = InMemoryDirectory::new();
        let admin = directory
            .register("root@example.com", "pw", UserRole::Admin)
            .await
            .unwrap();
        let user = directory
            .register("user@example.com", "pw", UserRole::User)
            .await
            .unwrap();

        assert_eq!(admin.id, Some(1));
        assert_eq!(user.id, Some(2));
        assert!(admin.has_capability(CAPABILITY_ADMIN));
        assert!(user.has_capability(CAPABILITY_USER));
        assert!(!user.has_capability(CAPABILITY_ADMIN));
        assert_eq!(directory.list_principals().await.len(), 2);
    }

    #[tokio::test]
    async fn duplicate_login_is_rejected() {
        let directory = InMemoryDirectory::new();
        directory
            .register("a@b.com", "pw", UserRole::User)
            .await
            .unwrap();

        let err = directory
            .register("A@B.com ", "other", UserRole::User)
            .await
            .unwrap_err();
        assert!(matches!(err, DirectoryError::AlreadyExists(login) if login == "a@b.com"));
    }

    #[tokio::test]
    async fn empty_input_is_rejected() {
        let directory = InMemoryDirectory::new();
        assert!(matches!(
            directory.register("  ", "pw", UserRole::User).await,
            Err(DirectoryError::InvalidInput(_))
        ));
        assert!(matches!(
            directory.register("a@b.com", "", UserRole::User).await,
            Err(DirectoryError::InvalidInput(_))
        ));
        assert!(directory.list_principals().await.is_empty());
    }

    #[tokio::test]
    async fn verify_credentials_checks_password() {
        let directory = InMemoryDirectory::new();
        directory
            .register("a@b.com", "correct horse", UserRole::User)
            .await
            .unwrap();

        let found = directory
            .verify_credentials("a@b.com", "correct horse")
            .await
            .unwrap();
        assert_eq!(found.map(|p| p.login), Some("a@b.com".to_string()));

        assert!(directory
            .verify_credentials("a@b.com", "wrong")
            .await
            .unwrap()
            .is_none());
        assert!(directory
            .verify_credentials("nobody@b.com", "correct horse")
            .await
            .unwrap()
            .is_none());
    }

    #[test]
    fn unknown_login_hash_is_a_valid_phc_string() {
        let hash = DUMMY_HASH.as_deref().unwrap();
        assert!(PasswordHash::new(hash).is_ok());
        assert!(!verify_password("anything", hash).unwrap());
    }

    #[tokio::test]
    async fn lookup_by_subject() {
        let directory = InMemoryDirectory::new();
        directory
            .register("a@b.com", "pw", UserRole::Admin)
            .await
            .unwrap();

        let principal = directory
            .find_principal_by_identifier("a@b.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(principal.id, Some(1));
        assert!(directory
            .find_principal_by_identifier("missing@b.com")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn list_is_ordered_by_id() {
        let directory = InMemoryDirectory::new();
        for login in ["c@x.com", "a@x.com", "b@x.com"] {
            directory.register(login, "pw", UserRole::User).await.unwrap();
        }
        let logins: Vec<String> = directory
            .list_principals()
            .await
            .into_iter()
            .map(|p| p.login)
            .collect();
        assert_eq!(logins, ["c@x.com", "a@x.com", "b@x.com"]);
    }
}
