// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::{Authenticator, TokenService};
use crate::config::{BearerMode, TokenSettings};
use crate::directory::InMemoryDirectory;

#[derive(Clone)]
pub struct AppState {
    pub tokens: Arc<TokenService>,
    pub directory: Arc<InMemoryDirectory>,
    pub authenticator: Authenticator,
}

impl AppState {
    pub fn new(settings: &TokenSettings, bearer_mode: BearerMode, directory: InMemoryDirectory) -> Self {
        let tokens = Arc::new(TokenService::new(settings));
        let directory = Arc::new(directory);
        let authenticator = Authenticator::new(tokens.clone(), directory.clone(), bearer_mode);

        Self {
            tokens,
            directory,
            authenticator,
        }
    }
}
