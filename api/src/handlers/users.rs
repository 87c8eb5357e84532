use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use entities::{PublicUser, QueryParams};

use crate::{
    error::{ApiErrorResponse, ApiResult},
    extract::JsonBody,
    models::ApiResponse,
    session::AdminUser,
    AppState,
};

/// List accounts (admin only)
///
/// GET /api/users
#[utoipa::path(
    get,
    path = "/api/users",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 10, max: 100)"),
        ("username" = Option<String>, Query, description = "Case-insensitive username substring")
    ),
    responses(
        (status = 200, description = "Page of users, newest first", body = [PublicUser]),
        (status = 401, description = "Authentication required", body = ApiErrorResponse),
        (status = 403, description = "Insufficient permissions", body = ApiErrorResponse)
    ),
    tag = "users"
)]
pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Query(params): Query<QueryParams>,
) -> ApiResult<impl IntoResponse> {
    let listing = state.catalog.users.list(&params).await?;
    Ok(Json(ApiResponse::page(listing)))
}

/// Change an account's role (admin only)
///
/// PATCH /api/users/{id}/role
#[utoipa::path(
    patch,
    path = "/api/users/{id}/role",
    params(("id" = String, Path, description = "User identifier")),
    request_body = serde_json::Value,
    responses(
        (status = 200, description = "Role updated successfully", body = PublicUser),
        (status = 400, description = "Invalid identifier or role", body = ApiErrorResponse),
        (status = 403, description = "Insufficient permissions", body = ApiErrorResponse),
        (status = 404, description = "User not found", body = ApiErrorResponse)
    ),
    tag = "users"
)]
pub async fn change_role(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody,
) -> ApiResult<impl IntoResponse> {
    let user = state.catalog.users.change_role(&id, &payload, &admin).await?;
    Ok(Json(ApiResponse::with_message("Role updated successfully", user)))
}
