//! Review operations.

use crate::books::stamp_created;
use crate::error::{CatalogError, Result};
use crate::{parse_id, Listing};
use authz::{Action, Principal};
use database::{collections, now_timestamp, DatabaseError, DocumentStore, Filter, FindQuery};
use entities::review::{build_review_query, validate_review_payload};
use entities::{Book, Pagination, QueryParams, Review, ReviewResponse, ValidationMode};
use serde_json::Value as JsonValue;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, info, warn};

const INVALID_ID: &str = "Invalid review ID format";
const NOT_FOUND: &str = "Review not found";
const DUPLICATE: &str = "You already reviewed this book";

#[derive(Clone)]
pub struct ReviewService {
    store: Arc<dyn DocumentStore>,
}

impl ReviewService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn list(
        &self,
        params: &QueryParams,
        principal: Option<&Principal>,
    ) -> Result<Listing<ReviewResponse>> {
        let query = build_review_query(params).validate()?;
        let pagination = Pagination::from_params(params);

        let total_items = self.store.count(collections::REVIEWS, &query.filter).await?;

        debug!(filter = ?query.filter, page = pagination.page, "Listing reviews");

        let find = FindQuery::new(query.filter)
            .sort(query.sort)
            .page(pagination.skip, pagination.limit);
        let reviews = self
            .store
            .find(collections::REVIEWS, &find)
            .await?
            .into_iter()
            .map(Review::from_document)
            .collect::<entities::Result<Vec<_>>>()?;

        let titles = self.book_titles(&reviews).await?;

        Ok(Listing {
            items: ReviewResponse::many(reviews, &titles, principal),
            meta: pagination.meta(total_items),
        })
    }

    pub async fn get(&self, id: &str, principal: Option<&Principal>) -> Result<ReviewResponse> {
        let id = parse_id(id, INVALID_ID)?;
        let review = self.require(&id).await?;
        self.shape(review, principal).await
    }

    /// Create a review of an existing book. One review per book and owner.
    pub async fn create(&self, payload: &JsonValue, principal: &Principal) -> Result<ReviewResponse> {
        let mut document = validate_review_payload(payload, ValidationMode::Create).into_result()?;

        let book_id = document
            .get("bookId")
            .and_then(JsonValue::as_str)
            .unwrap_or_default()
            .to_string();
        let book = self
            .store
            .find_one(collections::BOOKS, &Filter::by_id(&book_id), None)
            .await?
            .ok_or_else(|| CatalogError::not_found("Book not found"))?;
        let book = Book::from_document(book)?;

        document.insert("ownerId".into(), JsonValue::String(principal.id.clone()));
        document.insert("ownerUsername".into(), JsonValue::String(principal.username.clone()));
        stamp_created(&mut document);

        let id = match self.store.insert_one(collections::REVIEWS, document.clone()).await {
            Ok(id) => id,
            Err(DatabaseError::UniqueViolation(_)) => {
                warn!(book_id = %book_id, owner = %principal.id, "Duplicate review rejected");
                return Err(CatalogError::Conflict(DUPLICATE.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        document.insert("id".into(), JsonValue::String(id.clone()));

        info!(review_id = %id, book_id = %book_id, owner = %principal.id, "Review created");

        let review = Review::from_document(document)?;
        Ok(ReviewResponse::new(review, Some(book.title), Some(principal)))
    }

    /// Apply a partial update. `bookId` never changes.
    pub async fn update(
        &self,
        id: &str,
        payload: &JsonValue,
        principal: &Principal,
    ) -> Result<ReviewResponse> {
        let id = parse_id(id, INVALID_ID)?;
        let mut changes = validate_review_payload(payload, ValidationMode::Update).into_result()?;

        let existing = self.require(&id).await?;
        authz::authorize(Action::Edit, &existing, Some(principal))
            .map_err(|e| CatalogError::denied(e, "reviews"))?;

        changes.insert("updated_at".into(), JsonValue::String(now_timestamp()));
        self.store
            .update_one(collections::REVIEWS, &Filter::by_id(&id), changes)
            .await?;

        info!(review_id = %id, by = %principal.id, "Review updated");

        let updated = self.require(&id).await?;
        self.shape(updated, Some(principal)).await
    }

    pub async fn delete(&self, id: &str, principal: &Principal) -> Result<()> {
        let id = parse_id(id, INVALID_ID)?;
        let existing = self.require(&id).await?;
        authz::authorize(Action::Delete, &existing, Some(principal))
            .map_err(|e| CatalogError::denied(e, "reviews"))?;

        self.store
            .delete_one(collections::REVIEWS, &Filter::by_id(&id))
            .await?;

        info!(review_id = %id, by = %principal.id, "Review deleted");
        Ok(())
    }

    /// Resolve the titles of every distinct book referenced by `reviews`
    /// with a single lookup.
    async fn book_titles(&self, reviews: &[Review]) -> Result<HashMap<String, String>> {
        let ids: BTreeSet<&str> = reviews.iter().map(|r| r.book_id.as_str()).collect();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let find = FindQuery::new(Filter::new().any_of(
            "id",
            ids.into_iter().map(|id| JsonValue::String(id.to_string())).collect(),
        ))
        .projection(Some(vec!["title".to_string()]));

        let titles = self
            .store
            .find(collections::BOOKS, &find)
            .await?
            .into_iter()
            .filter_map(|doc| {
                let id = doc.get("id")?.as_str()?.to_string();
                let title = doc.get("title").and_then(JsonValue::as_str).unwrap_or_default();
                Some((id, title.to_string()))
            })
            .collect();
        Ok(titles)
    }

    async fn shape(&self, review: Review, principal: Option<&Principal>) -> Result<ReviewResponse> {
        let titles = self.book_titles(std::slice::from_ref(&review)).await?;
        let title = titles.get(&review.book_id).cloned();
        Ok(ReviewResponse::new(review, title, principal))
    }

    async fn require(&self, id: &str) -> Result<Review> {
        let document = self
            .store
            .find_one(collections::REVIEWS, &Filter::by_id(id), None)
            .await?
            .ok_or_else(|| CatalogError::not_found(NOT_FOUND))?;
        Ok(Review::from_document(document)?)
    }
}
