//! Domain model for the book library: stored shapes, list query builders,
//! write payload validators and response shapers.

use serde::{Deserialize, Deserializer};
use std::collections::HashMap;

pub mod book;
pub mod error;
pub mod owner;
pub mod pagination;
pub mod query;
pub mod review;
pub mod user;

pub use book::{Book, BookResponse};
pub use error::{EntitiesError, Result};
pub use owner::{OwnerView, SYSTEM_OWNER, UNKNOWN_OWNER};
pub use pagination::{PageMeta, Pagination, PaginationOptions};
pub use query::ListQuery;
pub use review::{Review, ReviewResponse};
pub use user::{PublicUser, Registration, User};

// Re-export the validation vocabulary used by callers
pub use fields::{ValidatedPayload, ValidationErrors, ValidationMode};

/// Raw query-string parameters of a list request.
pub type QueryParams = HashMap<String, String>;

/// Deserialize `null` the same way as a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Deserialize a number that may have been stored as a float into an integer.
pub(crate) fn optional_int<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.map(|n| n as i64))
}

/// Parse a stored document into a typed model.
pub(crate) fn from_document<T: serde::de::DeserializeOwned>(document: database::Document) -> Result<T> {
    Ok(serde_json::from_value(serde_json::Value::Object(document))?)
}
