use crate::owner::OwnerView;
use crate::query::{param, ListQuery};
use crate::{from_document, null_as_default, optional_int, QueryParams, Result};
use authz::{Owned, Permissions, Principal};
use chrono::{Datelike, Utc};
use database::{Document, SortDirection};
use fields::{Field, FieldValidator, ValidatedPayload, ValidationMode};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;

/// Fields accepted by `sortBy`.
pub const SORT_FIELDS: &[&str] = &[
    "id",
    "title",
    "author",
    "genre",
    "pages",
    "published_year",
    "rating",
    "created_at",
    "updated_at",
];

/// Fields accepted by the `fields` projection parameter.
pub const PROJECTION_FIELDS: &[&str] = &[
    "id",
    "title",
    "author",
    "description",
    "isbn",
    "genre",
    "pages",
    "published_year",
    "rating",
    "ownerId",
    "ownerUsername",
    "created_at",
    "updated_at",
];

/// A book as stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Book {
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub author: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub isbn: String,
    #[serde(deserialize_with = "null_as_default")]
    pub genre: String,
    #[serde(deserialize_with = "optional_int")]
    pub pages: Option<i64>,
    #[serde(deserialize_with = "optional_int")]
    pub published_year: Option<i64>,
    #[serde(deserialize_with = "null_as_default")]
    pub rating: f64,
    #[serde(rename = "ownerId")]
    pub owner_id: Option<String>,
    #[serde(rename = "ownerUsername")]
    pub owner_username: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Book {
    pub fn from_document(document: Document) -> Result<Self> {
        from_document(document)
    }
}

impl Owned for Book {
    fn owner_id(&self) -> Option<&str> {
        self.owner_id.as_deref()
    }
}

/// Writable book fields. The publication year is capped at the current year.
pub fn book_fields() -> Vec<Field> {
    let current_year = Utc::now().year() as f64;
    vec![
        Field::text("title").required().max_length(200),
        Field::text("author").required().max_length(200),
        Field::text("description").max_length(1500),
        Field::text("isbn").max_length(40),
        Field::text("genre").max_length(100),
        Field::integer("pages").range(1.0, 10000.0),
        Field::integer("published_year").range(1000.0, current_year),
        Field::float("rating").range(0.0, 10.0).default_value(0),
    ]
}

pub fn validate_book_payload(payload: &JsonValue, mode: ValidationMode) -> ValidatedPayload {
    FieldValidator::validate_payload(&book_fields(), payload, mode)
}

/// Build the filter, sort and projection of a book list request.
pub fn build_book_query(params: &QueryParams) -> ListQuery {
    let mut query = ListQuery::default();

    for field in ["title", "author", "genre"] {
        query.text_filter(params, field);
    }
    query.id_filter(params, "ownerId");
    query.min_rating(params, 0.0, 10.0);
    query.sort(params, SORT_FIELDS, SortDirection::Ascending);

    if let Some(requested) = param(params, "fields") {
        let mut projection: Vec<String> = Vec::new();
        for field in requested.split(',').map(str::trim) {
            if PROJECTION_FIELDS.contains(&field) && !projection.iter().any(|f| f == field) {
                projection.push(field.to_string());
            }
        }
        if projection.is_empty() {
            query.errors.push("No valid fields requested");
        } else {
            // Owner data drives the permission flags.
            for required in ["ownerId", "ownerUsername"] {
                if !projection.iter().any(|f| f == required) {
                    projection.push(required.to_string());
                }
            }
            query.projection = Some(projection);
        }
    }

    query.mine = param(params, "mine").is_some_and(|v| v.eq_ignore_ascii_case("true"));

    query
}

/// A book as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct BookResponse {
    pub id: String,
    pub title: String,
    pub author: String,
    pub description: String,
    pub isbn: String,
    pub genre: String,
    pub pages: Option<i64>,
    pub published_year: Option<i64>,
    pub rating: f64,
    pub owner: OwnerView,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub permissions: Permissions,
}

impl BookResponse {
    pub fn new(book: Book, principal: Option<&Principal>) -> Self {
        let permissions = authz::permissions(&book, principal);
        let owner = OwnerView::resolve(book.owner_id.as_deref(), book.owner_username.as_deref());
        Self {
            id: book.id,
            title: book.title,
            author: book.author,
            description: book.description,
            isbn: book.isbn,
            genre: book.genre,
            pages: book.pages,
            published_year: book.published_year,
            rating: book.rating,
            owner,
            created_at: book.created_at,
            updated_at: book.updated_at,
            permissions,
        }
    }
}
