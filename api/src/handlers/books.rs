use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use entities::{BookResponse, QueryParams};

use crate::{
    error::{ApiErrorResponse, ApiResult},
    extract::JsonBody,
    models::{ApiResponse, BookDeletedData},
    session::{AuthUser, MaybeUser},
    AppState,
};

/// List books
///
/// GET /api/books
#[utoipa::path(
    get,
    path = "/api/books",
    params(
        ("page" = Option<u64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<u64>, Query, description = "Items per page (default: 10, max: 100)"),
        ("title" = Option<String>, Query, description = "Case-insensitive title substring"),
        ("author" = Option<String>, Query, description = "Case-insensitive author substring"),
        ("genre" = Option<String>, Query, description = "Case-insensitive genre substring"),
        ("minRating" = Option<f64>, Query, description = "Minimum rating, 0 to 10"),
        ("ownerId" = Option<String>, Query, description = "Only books owned by this user"),
        ("sortBy" = Option<String>, Query, description = "Sort field"),
        ("sortOrder" = Option<String>, Query, description = "asc or desc"),
        ("fields" = Option<String>, Query, description = "Comma-separated projection"),
        ("mine" = Option<bool>, Query, description = "Only the caller's books; requires a session")
    ),
    responses(
        (status = 200, description = "Page of books with pagination meta", body = [BookResponse]),
        (status = 400, description = "Invalid query", body = ApiErrorResponse),
        (status = 401, description = "mine=true without a session", body = ApiErrorResponse)
    ),
    tag = "books"
)]
pub async fn list_books(
    State(state): State<AppState>,
    MaybeUser(principal): MaybeUser,
    Query(params): Query<QueryParams>,
) -> ApiResult<impl IntoResponse> {
    let listing = state.catalog.books.list(&params, principal.as_ref()).await?;
    Ok(Json(ApiResponse::page(listing)))
}

/// Read a single book
///
/// GET /api/books/{id}
#[utoipa::path(
    get,
    path = "/api/books/{id}",
    params(("id" = String, Path, description = "Book identifier")),
    responses(
        (status = 200, description = "Book found", body = BookResponse),
        (status = 400, description = "Malformed identifier", body = ApiErrorResponse),
        (status = 404, description = "Book not found", body = ApiErrorResponse)
    ),
    tag = "books"
)]
pub async fn get_book(
    State(state): State<AppState>,
    MaybeUser(principal): MaybeUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let book = state.catalog.books.get(&id, principal.as_ref()).await?;
    Ok(Json(ApiResponse::data(book)))
}

/// Create a book owned by the caller
///
/// POST /api/books
#[utoipa::path(
    post,
    path = "/api/books",
    request_body = serde_json::Value,
    responses(
        (status = 201, description = "Book created successfully", body = BookResponse),
        (status = 400, description = "Invalid payload", body = ApiErrorResponse),
        (status = 401, description = "Authentication required", body = ApiErrorResponse)
    ),
    tag = "books"
)]
pub async fn create_book(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    JsonBody(payload): JsonBody,
) -> ApiResult<impl IntoResponse> {
    let book = state.catalog.books.create(&payload, &principal).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message("Book created successfully", book)),
    ))
}

/// Partially update a book
///
/// PUT /api/books/{id}
#[utoipa::path(
    put,
    path = "/api/books/{id}",
    params(("id" = String, Path, description = "Book identifier")),
    request_body = serde_json::Value,
    responses(
        (status = 200, description = "Book updated successfully", body = BookResponse),
        (status = 400, description = "Invalid identifier or payload", body = ApiErrorResponse),
        (status = 401, description = "Authentication required", body = ApiErrorResponse),
        (status = 403, description = "Not the owner", body = ApiErrorResponse),
        (status = 404, description = "Book not found", body = ApiErrorResponse)
    ),
    tag = "books"
)]
pub async fn update_book(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody,
) -> ApiResult<impl IntoResponse> {
    let book = state.catalog.books.update(&id, &payload, &principal).await?;
    Ok(Json(ApiResponse::with_message("Book updated successfully", book)))
}

/// Delete a book and its reviews
///
/// DELETE /api/books/{id}
#[utoipa::path(
    delete,
    path = "/api/books/{id}",
    params(("id" = String, Path, description = "Book identifier")),
    responses(
        (status = 200, description = "Book deleted successfully", body = BookDeletedData),
        (status = 401, description = "Authentication required", body = ApiErrorResponse),
        (status = 403, description = "Not the owner", body = ApiErrorResponse),
        (status = 404, description = "Book not found", body = ApiErrorResponse)
    ),
    tag = "books"
)]
pub async fn delete_book(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let deletion = state.catalog.books.delete(&id, &principal).await?;
    Ok(Json(ApiResponse::with_message(
        "Book deleted successfully",
        BookDeletedData::from(deletion),
    )))
}
