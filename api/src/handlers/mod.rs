pub mod auth;
pub mod books;
pub mod health;
pub mod reviews;
pub mod users;

use crate::error::ApiError;

/// Fallback for unmatched routes.
pub async fn not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}
