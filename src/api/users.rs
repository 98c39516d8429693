// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User endpoints.

use axum::{extract::State, Json};

use crate::{
    auth::{AdminOnly, Auth},
    models::PrincipalResponse,
    state::AppState,
};

/// Get the current authenticated principal.
///
/// Returns the login, id and capabilities resolved by the interceptor.
#[utoipa::path(
    get,
    path = "/v1/users/me",
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Principal information", body = PrincipalResponse),
        (status = 401, description = "Unauthorized - invalid or missing token"),
    )
)]
pub async fn get_current_user(Auth(user): Auth) -> Json<PrincipalResponse> {
    Json(user.into())
}

/// List every registered principal. Requires `ROLE_ADMIN`.
#[utoipa::path(
    get,
    path = "/v1/admin/users",
    tag = "Admin",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Registered principals", body = [PrincipalResponse]),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 403, description = "Forbidden - admin capability required"),
    )
)]
pub async fn list_users(
    AdminOnly(admin): AdminOnly,
    State(state): State<AppState>,
) -> Json<Vec<PrincipalResponse>> {
    tracing::debug!(admin = %admin.login(), "Listing principals");
    let principals = state.directory.list_principals().await;
    Json(principals.into_iter().map(Into::into).collect())
}
