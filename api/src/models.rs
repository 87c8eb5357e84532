use authz::{Principal, Role};
use catalog::{BookDeletion, Listing};
use chrono::{DateTime, Utc};
use entities::{PageMeta, PublicUser};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Envelope wrapped around every successful response.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<PageMeta>,
}

impl<T> ApiResponse<T> {
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            meta: None,
        }
    }

    pub fn with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
            meta: None,
        }
    }
}

impl<T> ApiResponse<Vec<T>> {
    pub fn page(listing: Listing<T>) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(listing.items),
            meta: Some(listing.meta),
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
            meta: None,
        }
    }
}

/// Identity kept in the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SessionUser {
    pub id: String,
    pub username: String,
    pub role: Role,
}

impl From<Principal> for SessionUser {
    fn from(principal: Principal) -> Self {
        Self {
            id: principal.id,
            username: principal.username,
            role: principal.role,
        }
    }
}

/// Body of a successful register or login.
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthData {
    pub user: PublicUser,
}

/// Who the current session belongs to, if anyone.
#[derive(Debug, Serialize, ToSchema)]
pub struct MeData {
    pub authenticated: bool,
    pub user: Option<SessionUser>,
}

/// Result of deleting a book.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookDeletedData {
    pub deleted_reviews_count: u64,
}

impl From<BookDeletion> for BookDeletedData {
    fn from(deletion: BookDeletion) -> Self {
        Self {
            deleted_reviews_count: deletion.deleted_reviews_count,
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub database: DatabaseHealth,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DatabaseHealth {
    pub connected: bool,
    pub message: String,
}
