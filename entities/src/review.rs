use crate::owner::OwnerView;
use crate::query::ListQuery;
use crate::{from_document, null_as_default, QueryParams, Result};
use authz::{Owned, Permissions, Principal};
use database::{Document, SortDirection};
use fields::{Field, FieldValidator, ValidatedPayload, ValidationMode};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use utoipa::ToSchema;

pub const SORT_FIELDS: &[&str] = &["id", "rating", "created_at", "updated_at"];

/// A review as stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Review {
    pub id: String,
    #[serde(rename = "bookId", deserialize_with = "null_as_default")]
    pub book_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub rating: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub comment: String,
    #[serde(rename = "ownerId")]
    pub owner_id: Option<String>,
    #[serde(rename = "ownerUsername")]
    pub owner_username: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Review {
    pub fn from_document(document: Document) -> Result<Self> {
        from_document(document)
    }
}

impl Owned for Review {
    fn owner_id(&self) -> Option<&str> {
        self.owner_id.as_deref()
    }
}

/// Writable review fields. `bookId` is fixed once the review exists.
pub fn review_fields() -> Vec<Field> {
    vec![
        Field::reference("bookId").required().immutable(),
        Field::float("rating")
            .required()
            .range(1.0, 5.0)
            .decimals(1)
            .range_message("rating must be a number between 1 and 5"),
        Field::text("comment").required().max_length(1000),
    ]
}

pub fn validate_review_payload(payload: &JsonValue, mode: ValidationMode) -> ValidatedPayload {
    FieldValidator::validate_payload(&review_fields(), payload, mode)
}

/// Build the filter and sort of a review list request.
pub fn build_review_query(params: &QueryParams) -> ListQuery {
    let mut query = ListQuery::default();

    query.id_filter(params, "bookId");
    query.id_filter(params, "ownerId");
    query.min_rating(params, 1.0, 5.0);
    query.sort(params, SORT_FIELDS, SortDirection::Descending);

    query
}

/// A review as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ReviewResponse {
    pub id: String,
    #[serde(rename = "bookId")]
    pub book_id: String,
    /// Title of the reviewed book, `None` once the book is gone.
    #[serde(rename = "bookTitle")]
    pub book_title: Option<String>,
    pub rating: f64,
    pub comment: String,
    pub owner: OwnerView,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub permissions: Permissions,
}

impl ReviewResponse {
    pub fn new(review: Review, book_title: Option<String>, principal: Option<&Principal>) -> Self {
        let permissions = authz::permissions(&review, principal);
        let owner = OwnerView::resolve(review.owner_id.as_deref(), review.owner_username.as_deref());
        Self {
            id: review.id,
            book_id: review.book_id,
            book_title,
            rating: review.rating,
            comment: review.comment,
            owner,
            created_at: review.created_at,
            updated_at: review.updated_at,
            permissions,
        }
    }

    /// Shape a batch of reviews using a `bookId -> title` lookup.
    pub fn many(
        reviews: Vec<Review>,
        titles: &HashMap<String, String>,
        principal: Option<&Principal>,
    ) -> Vec<Self> {
        reviews
            .into_iter()
            .map(|review| {
                let title = titles.get(&review.book_id).cloned();
                Self::new(review, title, principal)
            })
            .collect()
    }
}
