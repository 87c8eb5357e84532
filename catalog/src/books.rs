//! Book operations.

use crate::error::{CatalogError, Result};
use crate::{parse_id, Listing};
use authz::{Action, Principal};
use database::{collections, now_timestamp, Document, DocumentStore, Filter, FindQuery};
use entities::book::{build_book_query, validate_book_payload};
use entities::{Book, BookResponse, Pagination, QueryParams, ValidationMode};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::{debug, info};

const INVALID_ID: &str = "Invalid book ID format";
const NOT_FOUND: &str = "Book not found";

/// Outcome of deleting a book together with its reviews.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookDeletion {
    pub deleted_reviews_count: u64,
}

#[derive(Clone)]
pub struct BookService {
    store: Arc<dyn DocumentStore>,
}

impl BookService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// List books. Anonymous callers may list; `mine=true` needs a principal.
    pub async fn list(
        &self,
        params: &QueryParams,
        principal: Option<&Principal>,
    ) -> Result<Listing<BookResponse>> {
        let query = build_book_query(params).validate()?;

        let mut filter = query.filter;
        if query.mine {
            let principal = principal.ok_or_else(|| {
                CatalogError::Unauthenticated("Authentication required for mine=true".to_string())
            })?;
            filter = filter.eq("ownerId", principal.id.clone());
        }

        let pagination = Pagination::from_params(params);
        let total_items = self.store.count(collections::BOOKS, &filter).await?;

        debug!(?filter, page = pagination.page, limit = pagination.limit, "Listing books");

        let find = FindQuery::new(filter)
            .sort(query.sort)
            .page(pagination.skip, pagination.limit)
            .projection(query.projection);
        let documents = self.store.find(collections::BOOKS, &find).await?;

        let items = documents
            .into_iter()
            .map(|doc| -> Result<BookResponse> {
                Ok(BookResponse::new(Book::from_document(doc)?, principal))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Listing {
            items,
            meta: pagination.meta(total_items),
        })
    }

    pub async fn get(&self, id: &str, principal: Option<&Principal>) -> Result<BookResponse> {
        let id = parse_id(id, INVALID_ID)?;
        let book = self.require(&id).await?;
        Ok(BookResponse::new(book, principal))
    }

    /// Create a book owned by the principal.
    pub async fn create(&self, payload: &JsonValue, principal: &Principal) -> Result<BookResponse> {
        let mut document = validate_book_payload(payload, ValidationMode::Create).into_result()?;

        document.insert("ownerId".into(), JsonValue::String(principal.id.clone()));
        document.insert("ownerUsername".into(), JsonValue::String(principal.username.clone()));
        stamp_created(&mut document);

        let id = self.store.insert_one(collections::BOOKS, document.clone()).await?;
        document.insert("id".into(), JsonValue::String(id.clone()));

        info!(book_id = %id, owner = %principal.id, "Book created");

        Ok(BookResponse::new(Book::from_document(document)?, Some(principal)))
    }

    /// Apply a partial update. Existence and ownership are checked before
    /// anything is written.
    pub async fn update(
        &self,
        id: &str,
        payload: &JsonValue,
        principal: &Principal,
    ) -> Result<BookResponse> {
        let id = parse_id(id, INVALID_ID)?;
        let mut changes = validate_book_payload(payload, ValidationMode::Update).into_result()?;

        let existing = self.require(&id).await?;
        authz::authorize(Action::Edit, &existing, Some(principal))
            .map_err(|e| CatalogError::denied(e, "books"))?;

        changes.insert("updated_at".into(), JsonValue::String(now_timestamp()));
        self.store
            .update_one(collections::BOOKS, &Filter::by_id(&id), changes)
            .await?;

        info!(book_id = %id, by = %principal.id, "Book updated");

        let updated = self.require(&id).await?;
        Ok(BookResponse::new(updated, Some(principal)))
    }

    /// Delete a book, then every review pointing at it.
    ///
    /// The two deletes are not atomic; a failure between them leaves orphan
    /// reviews behind.
    pub async fn delete(&self, id: &str, principal: &Principal) -> Result<BookDeletion> {
        let id = parse_id(id, INVALID_ID)?;
        let existing = self.require(&id).await?;
        authz::authorize(Action::Delete, &existing, Some(principal))
            .map_err(|e| CatalogError::denied(e, "books"))?;

        self.store
            .delete_one(collections::BOOKS, &Filter::by_id(&id))
            .await?;
        let deleted_reviews_count = self
            .store
            .delete_many(collections::REVIEWS, &Filter::new().eq("bookId", id.clone()))
            .await?;

        info!(book_id = %id, by = %principal.id, deleted_reviews_count, "Book deleted");

        Ok(BookDeletion {
            deleted_reviews_count,
        })
    }

    /// Insert a system-owned book unless one with the same ISBN exists.
    /// Returns whether a document was inserted.
    pub async fn seed(&self, payload: &JsonValue) -> Result<bool> {
        let mut document = validate_book_payload(payload, ValidationMode::Create).into_result()?;

        let isbn = document
            .get("isbn")
            .and_then(JsonValue::as_str)
            .unwrap_or_default()
            .to_string();
        if !isbn.is_empty() {
            let existing = self
                .store
                .find_one(collections::BOOKS, &Filter::new().eq("isbn", isbn), None)
                .await?;
            if existing.is_some() {
                return Ok(false);
            }
        }

        document.insert("ownerId".into(), JsonValue::Null);
        document.insert("ownerUsername".into(), JsonValue::Null);
        stamp_created(&mut document);
        self.store.insert_one(collections::BOOKS, document).await?;
        Ok(true)
    }

    pub async fn count(&self) -> Result<u64> {
        Ok(self.store.count(collections::BOOKS, &Filter::new()).await?)
    }

    async fn require(&self, id: &str) -> Result<Book> {
        let document = self
            .store
            .find_one(collections::BOOKS, &Filter::by_id(id), None)
            .await?
            .ok_or_else(|| CatalogError::not_found(NOT_FOUND))?;
        Ok(Book::from_document(document)?)
    }
}

pub(crate) fn stamp_created(document: &mut Document) {
    let now = JsonValue::String(now_timestamp());
    document.insert("created_at".into(), now.clone());
    document.insert("updated_at".into(), now);
}
