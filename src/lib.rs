// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Relational Auth - Stateless Bearer Token Authentication Service
//!
//! Clients exchange credentials for an HS256-signed token and present it as
//! `Authorization: Bearer <token>` on later requests. No session state is kept
//! on the server.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Token signing, token service, request interceptor, extractors
//! - `config` - Environment configuration
//! - `directory` - In-memory principal store (Argon2 password hashes)
//! - `telemetry` - Tracing subscriber setup

pub mod api;
pub mod auth;
pub mod config;
pub mod directory;
pub mod error;
pub mod models;
pub mod state;
pub mod telemetry;
