// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names, default values and the
//! settings structs built from them. Configuration is loaded once at startup
//! and never mutated afterwards; a missing secret is fatal.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `TOKEN_SECRET` | HMAC-SHA256 secret for signing tokens | Required |
//! | `TOKEN_ISSUER` | Issuer claim written into and expected in tokens | `auth-api` |
//! | `TOKEN_LIFETIME_SECS` | Lifetime of issued tokens in seconds | `7200` |
//! | `TOKEN_LEEWAY_SECS` | Clock skew tolerance on expiry in seconds | `0` |
//! | `AUTH_ALLOW_UNPREFIXED_TOKEN` | Accept `Authorization` values without `Bearer ` | `false` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `SEED_ADMIN_LOGIN` | Login of an admin principal created at startup | Optional |
//! | `SEED_ADMIN_PASSWORD` | Password of the seeded admin | Optional |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::fmt;
use std::time::Duration;

/// Environment variable name for the token signing secret.
///
/// Rotating this value invalidates every outstanding token.
pub const TOKEN_SECRET_ENV: &str = "TOKEN_SECRET";

/// Environment variable name for the token issuer.
pub const TOKEN_ISSUER_ENV: &str = "TOKEN_ISSUER";

/// Environment variable name for the token lifetime, in seconds.
pub const TOKEN_LIFETIME_ENV: &str = "TOKEN_LIFETIME_SECS";

/// Environment variable name for the expiry leeway, in seconds.
pub const TOKEN_LEEWAY_ENV: &str = "TOKEN_LEEWAY_SECS";

/// Environment variable name enabling the legacy unprefixed header parsing.
pub const ALLOW_UNPREFIXED_TOKEN_ENV: &str = "AUTH_ALLOW_UNPREFIXED_TOKEN";

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const SEED_ADMIN_LOGIN_ENV: &str = "SEED_ADMIN_LOGIN";
pub const SEED_ADMIN_PASSWORD_ENV: &str = "SEED_ADMIN_PASSWORD";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_ISSUER: &str = "auth-api";

/// Default token lifetime (2 hours).
pub const DEFAULT_TOKEN_LIFETIME_SECS: u64 = 2 * 60 * 60;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Configuration errors. All of them stop the process before it serves traffic.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("{name} has an invalid value {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Symmetric signing secret. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenSecret(String);

impl TokenSecret {
    pub fn new(secret: impl Into<String>) -> Result<Self, ConfigError> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(ConfigError::Empty(TOKEN_SECRET_ENV));
        }
        Ok(Self(secret))
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for TokenSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TokenSecret(<redacted>)")
    }
}

/// How the `Authorization` header value is turned into a token candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BearerMode {
    /// The value must start with `Bearer `.
    #[default]
    Strict,
    /// A value without the `Bearer ` prefix is used as the token unchanged.
    Permissive,
}

/// Process-wide token configuration.
#[derive(Debug, Clone)]
pub struct TokenSettings {
    pub secret: TokenSecret,
    pub issuer: String,
    pub lifetime: Duration,
    pub leeway: Duration,
}

impl TokenSettings {
    /// Settings with the default issuer, lifetime and no leeway.
    pub fn new(secret: TokenSecret) -> Self {
        Self {
            secret,
            issuer: DEFAULT_ISSUER.to_string(),
            lifetime: Duration::from_secs(DEFAULT_TOKEN_LIFETIME_SECS),
            leeway: Duration::ZERO,
        }
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    pub fn with_lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = lifetime;
        self
    }

    pub fn with_leeway(mut self, leeway: Duration) -> Self {
        self.leeway = leeway;
        self
    }
}

/// Credentials of an admin principal created at startup.
#[derive(Clone)]
pub struct SeedAdmin {
    pub login: String,
    pub password: String,
}

impl fmt::Debug for SeedAdmin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeedAdmin")
            .field("login", &self.login)
            .finish_non_exhaustive()
    }
}

/// Everything the server reads from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub token: TokenSettings,
    pub bearer_mode: BearerMode,
    pub host: String,
    pub port: u16,
    pub seed_admin: Option<SeedAdmin>,
}

impl Settings {
    /// Load settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load settings through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup(TOKEN_SECRET_ENV).ok_or(ConfigError::Missing(TOKEN_SECRET_ENV))?;
        let secret = TokenSecret::new(secret)?;

        let issuer = lookup(TOKEN_ISSUER_ENV).unwrap_or_else(|| DEFAULT_ISSUER.to_string());
        if issuer.trim().is_empty() {
            return Err(ConfigError::Empty(TOKEN_ISSUER_ENV));
        }

        let lifetime = parse_secs(&lookup, TOKEN_LIFETIME_ENV, DEFAULT_TOKEN_LIFETIME_SECS)?;
        if lifetime.is_zero() {
            return Err(ConfigError::Invalid {
                name: TOKEN_LIFETIME_ENV,
                value: "0".to_string(),
                reason: "lifetime must be positive",
            });
        }
        let leeway = parse_secs(&lookup, TOKEN_LEEWAY_ENV, 0)?;

        let bearer_mode = match lookup(ALLOW_UNPREFIXED_TOKEN_ENV) {
            None => BearerMode::Strict,
            Some(value) => match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => BearerMode::Permissive,
                "0" | "false" | "no" | "" => BearerMode::Strict,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: ALLOW_UNPREFIXED_TOKEN_ENV,
                        value,
                        reason: "expected a boolean",
                    })
                }
            },
        };

        let host = lookup(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match lookup(PORT_ENV) {
            None => DEFAULT_PORT,
            Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
                name: PORT_ENV,
                value,
                reason: "expected a port number",
            })?,
        };

        let seed_admin = match (lookup(SEED_ADMIN_LOGIN_ENV), lookup(SEED_ADMIN_PASSWORD_ENV)) {
            (Some(login), Some(password)) => Some(SeedAdmin { login, password }),
            (Some(_), None) => return Err(ConfigError::Missing(SEED_ADMIN_PASSWORD_ENV)),
            _ => None,
        };

        Ok(Self {
            token: TokenSettings {
                secret,
                issuer,
                lifetime,
                leeway,
            },
            bearer_mode,
            host,
            port,
            seed_admin,
        })
    }

    /// Bind the configured host and port. The host may be a name
    /// (`localhost`) or a bare IPv4/IPv6 address.
    pub async fn bind(&self) -> std::io::Result<tokio::net::TcpListener> {
        tokio::net::TcpListener::bind((self.host.as_str(), self.port)).await
    }
}

fn parse_secs<F>(lookup: &F, name: &'static str, default: u64) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(Duration::from_secs(default)),
        Some(value) => value
            .trim()
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| ConfigError::Invalid {
                name,
                value,
                reason: "expected a whole number of seconds",
            }),
    }
}
