use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use entities::{QueryParams, ReviewResponse};

use crate::{
    error::{ApiErrorResponse, ApiResult},
    extract::JsonBody,
    models::ApiResponse,
    session::{AuthUser, MaybeUser},
    AppState,
};

/// List reviews
///
/// GET /api/reviews
#[utoipa::path(
    get,
    path = "/api/reviews",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 10, max: 100)"),
        ("bookId" = Option<String>, Query, description = "Only reviews of this book"),
        ("ownerId" = Option<String>, Query, description = "Only reviews by this user"),
        ("minRating" = Option<f64>, Query, description = "Minimum rating, 1 to 5"),
        ("sortBy" = Option<String>, Query, description = "Sort field"),
        ("sortOrder" = Option<String>, Query, description = "asc or desc")
    ),
    responses(
        (status = 200, description = "Page of reviews with pagination meta", body = [ReviewResponse]),
        (status = 400, description = "Invalid query", body = ApiErrorResponse)
    ),
    tag = "reviews"
)]
pub async fn list_reviews(
    State(state): State<AppState>,
    MaybeUser(principal): MaybeUser,
    Query(params): Query<QueryParams>,
) -> ApiResult<impl IntoResponse> {
    let listing = state.catalog.reviews.list(&params, principal.as_ref()).await?;
    Ok(Json(ApiResponse::page(listing)))
}

/// Read a single review
///
/// GET /api/reviews/{id}
#[utoipa::path(
    get,
    path = "/api/reviews/{id}",
    params(("id" = String, Path, description = "Review identifier")),
    responses(
        (status = 200, description = "Review found", body = ReviewResponse),
        (status = 400, description = "Malformed identifier", body = ApiErrorResponse),
        (status = 404, description = "Review not found", body = ApiErrorResponse)
    ),
    tag = "reviews"
)]
pub async fn get_review(
    State(state): State<AppState>,
    MaybeUser(principal): MaybeUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let review = state.catalog.reviews.get(&id, principal.as_ref()).await?;
    Ok(Json(ApiResponse::data(review)))
}

/// Review an existing book
///
/// POST /api/reviews
#[utoipa::path(
    post,
    path = "/api/reviews",
    request_body = serde_json::Value,
    responses(
        (status = 201, description = "Review created successfully", body = ReviewResponse),
        (status = 400, description = "Invalid payload", body = ApiErrorResponse),
        (status = 401, description = "Authentication required", body = ApiErrorResponse),
        (status = 404, description = "Book not found", body = ApiErrorResponse),
        (status = 409, description = "Already reviewed", body = ApiErrorResponse)
    ),
    tag = "reviews"
)]
pub async fn create_review(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    JsonBody(payload): JsonBody,
) -> ApiResult<impl IntoResponse> {
    let review = state.catalog.reviews.create(&payload, &principal).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message("Review created successfully", review)),
    ))
}

/// Partially update a review
///
/// PUT /api/reviews/{id}
#[utoipa::path(
    put,
    path = "/api/reviews/{id}",
    params(("id" = String, Path, description = "Review identifier")),
    request_body = serde_json::Value,
    responses(
        (status = 200, description = "Review updated successfully", body = ReviewResponse),
        (status = 400, description = "Invalid identifier or payload", body = ApiErrorResponse),
        (status = 401, description = "Authentication required", body = ApiErrorResponse),
        (status = 403, description = "Not the owner", body = ApiErrorResponse),
        (status = 404, description = "Review not found", body = ApiErrorResponse)
    ),
    tag = "reviews"
)]
pub async fn update_review(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody,
) -> ApiResult<impl IntoResponse> {
    let review = state.catalog.reviews.update(&id, &payload, &principal).await?;
    Ok(Json(ApiResponse::with_message("Review updated successfully", review)))
}

/// Delete a review
///
/// DELETE /api/reviews/{id}
#[utoipa::path(
    delete,
    path = "/api/reviews/{id}",
    params(("id" = String, Path, description = "Review identifier")),
    responses(
        (status = 200, description = "Review deleted successfully"),
        (status = 401, description = "Authentication required", body = ApiErrorResponse),
        (status = 403, description = "Not the owner", body = ApiErrorResponse),
        (status = 404, description = "Review not found", body = ApiErrorResponse)
    ),
    tag = "reviews"
)]
pub async fn delete_review(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    state.catalog.reviews.delete(&id, &principal).await?;
    Ok(Json(ApiResponse::message("Review deleted successfully")))
}
