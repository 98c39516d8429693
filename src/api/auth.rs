// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Login and registration endpoints. Both are public.

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    auth::{AuthError, CredentialVerifier},
    error::ApiError,
    models::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse},
    state::AppState,
};

/// Exchange credentials for a signed bearer token.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    tag = "Auth",
    responses(
        (status = 200, description = "Token issued", body = LoginResponse),
        (status = 401, description = "Invalid login or password"),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AuthError> {
    let principal = state
        .directory
        .verify_credentials(&request.login, &request.password)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Credential verification failed");
            AuthError::Internal("credential verification failed".to_string())
        })?
        .ok_or_else(|| {
            tracing::info!("Login rejected");
            AuthError::InvalidCredentials
        })?;

    let issued = state.tokens.issue(&principal)?;
    tracing::info!(login = %principal.login, "Login succeeded");

    Ok(Json(issued.into()))
}

/// Register a new principal.
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    tag = "Auth",
    responses(
        (status = 201, description = "Principal registered", body = RegisterResponse),
        (status = 400, description = "Login taken or input invalid"),
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let role = request.role.unwrap_or_default();
    let principal = state
        .directory
        .register(&request.login, &request.password, role)
        .await?;

    let id = principal
        .id
        .ok_or_else(|| ApiError::internal("Registered principal has no id"))?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            id,
            login: principal.login,
            role,
        }),
    ))
}
