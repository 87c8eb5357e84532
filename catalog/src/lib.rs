//! Catalog operations over books, reviews and users.
//!
//! Every operation receives its store handle at construction and the caller's
//! principal per call; nothing here reads request or session state.

pub mod books;
pub mod credentials;
pub mod error;
pub mod reviews;
pub mod users;

pub use books::{BookDeletion, BookService};
pub use credentials::{Argon2Credentials, CredentialVerifier};
pub use error::{CatalogError, Result};
pub use reviews::ReviewService;
pub use users::{AdminAccount, AdminSecret, SignedIn, UserService};

use database::DocumentStore;
use entities::PageMeta;
use std::sync::Arc;

/// One page of shaped items plus its metadata.
#[derive(Debug, Clone)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}

/// All catalog services sharing one store.
#[derive(Clone)]
pub struct Catalog {
    pub books: BookService,
    pub reviews: ReviewService,
    pub users: UserService,
    store: Arc<dyn DocumentStore>,
}

impl Catalog {
    pub fn new(store: Arc<dyn DocumentStore>, credentials: Arc<dyn CredentialVerifier>) -> Self {
        Self {
            books: BookService::new(store.clone()),
            reviews: ReviewService::new(store.clone()),
            users: UserService::new(store.clone(), credentials),
            store,
        }
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }
}

/// Validate a path identifier before it reaches the store.
pub(crate) fn parse_id(raw: &str, message: &str) -> Result<String> {
    let trimmed = raw.trim();
    if fields::is_valid_id(trimmed) {
        Ok(trimmed.to_ascii_lowercase())
    } else {
        Err(CatalogError::bad_request(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        assert_eq!(
            parse_id("65A1B2C3D4E5F60718293A4B", "bad").unwrap(),
            "65a1b2c3d4e5f60718293a4b"
        );
        let err = parse_id("123", "Invalid book ID format").unwrap_err();
        assert_eq!(err.to_string(), "Invalid book ID format");
    }
}
