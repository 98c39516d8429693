// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{authenticate, UserRole},
    models::{LoginRequest, LoginResponse, PrincipalResponse, RegisterRequest, RegisterResponse},
    state::AppState,
};

pub mod auth;
pub mod health;
pub mod users;

/// Build the application router.
///
/// The authentication interceptor wraps every route, so it runs exactly once
/// per request before any handler.
pub fn router(state: AppState) -> Router {
    let authenticator = state.authenticator.clone();

    let routes = Router::new()
        .route("/health", get(health::liveness))
        .route("/auth/login", post(auth::login))
        .route("/auth/register", post(auth::register))
        .route("/v1/users/me", get(users::get_current_user))
        .route("/v1/admin/users", get(users::list_users))
        .with_state(state);

    Router::new()
        .merge(routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(middleware::from_fn_with_state(authenticator, authenticate))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::liveness,
        auth::login,
        auth::register,
        users::get_current_user,
        users::list_users
    ),
    components(
        schemas(
            LoginRequest,
            LoginResponse,
            RegisterRequest,
            RegisterResponse,
            PrincipalResponse,
            UserRole,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Health", description = "Liveness"),
        (name = "Auth", description = "Login and registration"),
        (name = "Users", description = "Current principal"),
        (name = "Admin", description = "Administrative views")
    ),
    modifiers(&SecurityAddon)
)]
struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
