// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User roles and the capabilities they grant.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Capability granted to every registered user.
pub const CAPABILITY_USER: &str = "ROLE_USER";

/// Capability granted to administrators.
pub const CAPABILITY_ADMIN: &str = "ROLE_ADMIN";

/// User roles assigned at registration.
///
/// ## Role Hierarchy
///
/// - `Admin` - Grants `ROLE_ADMIN` and `ROLE_USER`
/// - `User` - Grants `ROLE_USER`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum UserRole {
    /// Full administrative access
    Admin,
    /// Normal user
    #[default]
    User,
}

impl UserRole {
    /// Capability strings granted by this role.
    pub fn capabilities(&self) -> &'static [&'static str] {
        match self {
            UserRole::Admin => &[CAPABILITY_ADMIN, CAPABILITY_USER],
            UserRole::User => &[CAPABILITY_USER],
        }
    }

    /// Parse role from string (case-insensitive).
    pub fn parse(s: &str) -> Option<UserRole> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Some(UserRole::Admin),
            "user" => Some(UserRole::User),
            _ => None,
        }
    }
}

impl TryFrom<String> for UserRole {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        UserRole::parse(&value).ok_or_else(|| format!("unknown role `{value}`"))
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Admin => write!(f, "admin"),
            UserRole::User => write!(f, "user"),
        }
    }
}
