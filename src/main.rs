// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use relational_auth_server::{
    api::router,
    auth::UserRole,
    config::Settings,
    directory::InMemoryDirectory,
    state::AppState,
    telemetry,
};

#[tokio::main]
async fn main() {
    telemetry::init();

    // Configuration errors are fatal: nothing is served without a secret.
    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };

    let directory = InMemoryDirectory::new();
    if let Some(seed) = &settings.seed_admin {
        if let Err(e) = directory
            .register(&seed.login, &seed.password, UserRole::Admin)
            .await
        {
            tracing::error!(error = %e, "Failed to seed admin principal");
            std::process::exit(1);
        }
    }

    let state = AppState::new(&settings.token, settings.bearer_mode, directory);
    let app = router(state);

    let listener = match settings.bind().await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(
                error = %e,
                host = %settings.host,
                port = settings.port,
                "Failed to bind"
            );
            std::process::exit(1);
        }
    };
    let addr = match listener.local_addr() {
        Ok(addr) => addr,
        Err(e) => {
            tracing::error!(error = %e, "Failed to read bound address");
            std::process::exit(1);
        }
    };

    tracing::info!(
        %addr,
        issuer = %settings.token.issuer,
        token_lifetime_secs = settings.token.lifetime.as_secs(),
        bearer_mode = ?settings.bearer_mode,
        "Relational Auth server listening (docs at /docs)"
    );

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "Server failed");
        std::process::exit(1);
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
