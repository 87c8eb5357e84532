//! Error types for catalog operations

use authz::{Action, AuthzError};
use database::DatabaseError;
use entities::EntitiesError;
use fields::ValidationErrors;
use thiserror::Error;

/// Errors that can occur during catalog operations.
///
/// Every variant except `Unexpected` carries the message meant for the caller.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Input failed validation; every message is kept, the first is shown.
    #[error("{0}")]
    Validation(#[from] ValidationErrors),

    #[error("{0}")]
    NotFound(String),

    /// No principal, or the credentials did not match.
    #[error("{0}")]
    Unauthenticated(String),

    /// A principal is present but not allowed to act.
    #[error("{0}")]
    Forbidden(String),

    /// A uniqueness rule rejected the write.
    #[error("{0}")]
    Conflict(String),

    /// Anything the caller cannot fix.
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

pub type Result<T> = std::result::Result<T, CatalogError>;

impl CatalogError {
    pub fn not_found(message: impl Into<String>) -> Self {
        CatalogError::NotFound(message.into())
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        CatalogError::Validation(ValidationErrors::single(message))
    }

    /// Translate an authorization failure, naming the resource in 403 messages.
    pub fn denied(err: AuthzError, plural_noun: &str) -> Self {
        match err {
            AuthzError::Unauthenticated => {
                CatalogError::Unauthenticated("Authentication required".to_string())
            }
            AuthzError::Forbidden {
                action: Action::Edit,
            } => CatalogError::Forbidden(format!("You can modify only your own {}", plural_noun)),
            AuthzError::Forbidden {
                action: Action::Delete,
            } => CatalogError::Forbidden(format!("You can delete only your own {}", plural_noun)),
        }
    }

    pub fn is_unexpected(&self) -> bool {
        matches!(self, CatalogError::Unexpected(_))
    }
}

impl From<DatabaseError> for CatalogError {
    fn from(err: DatabaseError) -> Self {
        CatalogError::Unexpected(err.to_string())
    }
}

impl From<EntitiesError> for CatalogError {
    fn from(err: EntitiesError) -> Self {
        match err {
            EntitiesError::Validation(errors) => CatalogError::Validation(errors),
            other => CatalogError::Unexpected(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_denied_messages() {
        let err = CatalogError::denied(
            AuthzError::Forbidden {
                action: Action::Edit,
            },
            "books",
        );
        assert_eq!(err.to_string(), "You can modify only your own books");

        let err = CatalogError::denied(
            AuthzError::Forbidden {
                action: Action::Delete,
            },
            "reviews",
        );
        assert_eq!(err.to_string(), "You can delete only your own reviews");

        let err = CatalogError::denied(AuthzError::Unauthenticated, "books");
        assert!(matches!(err, CatalogError::Unauthenticated(_)));
    }

    #[test]
    fn test_storage_errors_are_unexpected() {
        let err = CatalogError::from(DatabaseError::Other("disk full".into()));
        assert!(err.is_unexpected());
    }
}
