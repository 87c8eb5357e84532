//! Error types for the authorization system.

use crate::types::Action;
use thiserror::Error;

/// Errors that can occur during authorization checks.
///
/// `Unauthenticated` and `Forbidden` are kept apart so callers can answer
/// 401 and 403 respectively.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthzError {
    /// No principal was supplied for an action that needs one.
    #[error("Authentication required")]
    Unauthenticated,

    /// The principal is known but not allowed to perform the action.
    #[error("Not allowed to {action} this resource")]
    Forbidden { action: Action },
}

/// A specialized Result type for authorization operations.
pub type Result<T> = std::result::Result<T, AuthzError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(AuthzError::Unauthenticated.to_string(), "Authentication required");

        let err = AuthzError::Forbidden {
            action: Action::Delete,
        };
        assert_eq!(err.to_string(), "Not allowed to delete this resource");
    }
}
