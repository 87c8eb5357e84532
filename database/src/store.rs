use crate::document::{Condition, Document, Filter, FindQuery, SortSpec};
use crate::{generate_id, Database, DatabaseError, Result};
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::sqlite::SqliteArguments;
use sqlx::query::Query;
use sqlx::{Row, Sqlite};
use tracing::{debug, info};

/// Collection-oriented document persistence.
///
/// Every document returned carries its identifier under `id`. Writes are
/// atomic per document; nothing spans documents.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Number of documents matching the filter.
    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64>;

    /// Documents matching the query, sorted, paged and projected.
    async fn find(&self, collection: &str, query: &FindQuery) -> Result<Vec<Document>>;

    /// First document matching the filter.
    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
        projection: Option<&[String]>,
    ) -> Result<Option<Document>> {
        let query = FindQuery {
            filter: filter.clone(),
            sort: Vec::new(),
            skip: 0,
            limit: Some(1),
            projection: projection.map(|fields| fields.to_vec()),
        };
        Ok(self.find(collection, &query).await?.into_iter().next())
    }

    /// Insert a new document and return its generated identifier.
    ///
    /// Fails with [`DatabaseError::UniqueViolation`] when a unique index
    /// already holds the same key.
    async fn insert_one(&self, collection: &str, document: Document) -> Result<String>;

    /// Merge `fields` into the first matching document. A `null` value removes
    /// the key. Returns the number of documents changed (0 or 1).
    async fn update_one(&self, collection: &str, filter: &Filter, fields: Document) -> Result<u64>;

    /// Delete the first matching document. Returns 0 or 1.
    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<u64>;

    /// Delete every matching document and return how many were removed.
    async fn delete_many(&self, collection: &str, filter: &Filter) -> Result<u64>;

    /// Verify the backing store is reachable.
    async fn ping(&self) -> Result<()>;
}

/// [`DocumentStore`] keeping each collection in a `doc_<name>` table of
/// `(id, body)` rows where `body` is the JSON document.
#[derive(Debug, Clone)]
pub struct SqliteDocumentStore {
    db: Database,
}

impl SqliteDocumentStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

pub(crate) fn table_name(collection: &str) -> Result<String> {
    let valid = !collection.is_empty()
        && collection
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if !valid {
        return Err(DatabaseError::InvalidCollection(collection.to_string()));
    }
    Ok(format!("doc_{}", collection))
}

/// SQL expression reading a document field.
pub(crate) fn field_expr(field: &str) -> Result<String> {
    if field == "id" {
        return Ok("id".to_string());
    }
    let valid = !field.is_empty()
        && field
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        return Err(DatabaseError::InvalidField(field.to_string()));
    }
    Ok(format!("json_extract(body, '$.{}')", field))
}

/// Translate a filter into a `WHERE` body plus the values to bind in order.
fn where_clause(filter: &Filter) -> Result<(String, Vec<JsonValue>)> {
    if filter.is_empty() {
        return Ok(("1 = 1".to_string(), Vec::new()));
    }

    let mut clauses = Vec::new();
    let mut values = Vec::new();

    for (field, condition) in filter.conditions() {
        let expr = field_expr(field)?;
        match condition {
            Condition::Eq(JsonValue::Null) => clauses.push(format!("{} IS NULL", expr)),
            Condition::Eq(value) => {
                clauses.push(format!("{} = ?", expr));
                values.push(value.clone());
            }
            Condition::Gte(bound) => {
                clauses.push(format!("{} >= ?", expr));
                values.push(JsonValue::from(*bound));
            }
            Condition::In(candidates) if candidates.is_empty() => clauses.push("0 = 1".to_string()),
            Condition::In(candidates) => {
                let placeholders = vec!["?"; candidates.len()].join(", ");
                clauses.push(format!("{} IN ({})", expr, placeholders));
                values.extend(candidates.iter().cloned());
            }
            Condition::Matches(pattern) => {
                clauses.push(format!("COALESCE({}, '') REGEXP ?", expr));
                values.push(JsonValue::String(format!("(?i){}", pattern)));
            }
        }
    }

    Ok((clauses.join(" AND "), values))
}

fn order_clause(sort: &[SortSpec]) -> Result<String> {
    let mut parts = Vec::with_capacity(sort.len() + 1);
    for spec in sort {
        parts.push(format!("{} {}", field_expr(&spec.field)?, spec.direction.as_sql()));
    }
    if !sort.iter().any(|spec| spec.field == "id") {
        let direction = sort
            .last()
            .map(|spec| spec.direction.as_sql())
            .unwrap_or("ASC");
        parts.push(format!("id {}", direction));
    }
    Ok(format!(" ORDER BY {}", parts.join(", ")))
}

fn bind_values<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    values: Vec<JsonValue>,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for value in values {
        query = match value {
            JsonValue::String(s) => query.bind(s),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    query.bind(i)
                } else if let Some(f) = n.as_f64() {
                    query.bind(f)
                } else {
                    query.bind(n.to_string())
                }
            }
            JsonValue::Bool(b) => query.bind(b as i32),
            JsonValue::Null => query.bind(None::<String>),
            other => query.bind(other.to_string()),
        };
    }
    query
}

fn project(mut document: Document, projection: Option<&[String]>) -> Document {
    if let Some(fields) = projection {
        document.retain(|key, _| key == "id" || fields.iter().any(|field| field == key));
    }
    document
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64> {
        let table = table_name(collection)?;
        let (clause, values) = where_clause(filter)?;
        let sql = format!("SELECT COUNT(*) AS count FROM {} WHERE {}", table, clause);

        debug!("Executing SQL: {}", sql);

        let row = bind_values(sqlx::query(&sql), values)
            .fetch_one(self.db.pool())
            .await?;
        let count: i64 = row.try_get("count")?;
        Ok(count.max(0) as u64)
    }

    async fn find(&self, collection: &str, query: &FindQuery) -> Result<Vec<Document>> {
        let table = table_name(collection)?;
        let (clause, values) = where_clause(&query.filter)?;
        let order = if query.sort.is_empty() {
            String::new()
        } else {
            order_clause(&query.sort)?
        };
        let limit = query.limit.map(|l| l as i64).unwrap_or(-1);
        let sql = format!(
            "SELECT id, body FROM {} WHERE {}{} LIMIT {} OFFSET {}",
            table, clause, order, limit, query.skip
        );

        debug!("Executing SQL: {}", sql);

        let rows = bind_values(sqlx::query(&sql), values)
            .fetch_all(self.db.pool())
            .await?;

        let mut documents = Vec::with_capacity(rows.len());
        for row in rows {
            let id: String = row.try_get("id")?;
            let body: String = row.try_get("body")?;
            let mut document: Document = serde_json::from_str(&body)?;
            document.insert("id".to_string(), JsonValue::String(id));
            documents.push(project(document, query.projection.as_deref()));
        }
        Ok(documents)
    }

    async fn insert_one(&self, collection: &str, mut document: Document) -> Result<String> {
        let table = table_name(collection)?;
        let id = generate_id();
        document.remove("id");
        let body = serde_json::to_string(&document)?;
        let sql = format!("INSERT INTO {} (id, body) VALUES (?, ?)", table);

        debug!("Executing SQL: {}", sql);

        sqlx::query(&sql)
            .bind(&id)
            .bind(body)
            .execute(self.db.pool())
            .await
            .map_err(DatabaseError::from_write)?;

        info!("Inserted document {} into {}", id, collection);

        Ok(id)
    }

    async fn update_one(&self, collection: &str, filter: &Filter, mut fields: Document) -> Result<u64> {
        let table = table_name(collection)?;
        fields.remove("id");
        if fields.is_empty() {
            return self.count(collection, filter).await.map(|n| n.min(1));
        }
        let (clause, values) = where_clause(filter)?;
        let sql = format!(
            "UPDATE {table} SET body = json_patch(body, ?) WHERE id = (SELECT id FROM {table} WHERE {clause} LIMIT 1)"
        );

        debug!("Executing SQL: {}", sql);

        let patch = serde_json::to_string(&fields)?;
        let result = bind_values(sqlx::query(&sql).bind(patch), values)
            .execute(self.db.pool())
            .await
            .map_err(DatabaseError::from_write)?;

        Ok(result.rows_affected())
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<u64> {
        let table = table_name(collection)?;
        let (clause, values) = where_clause(filter)?;
        let sql = format!(
            "DELETE FROM {table} WHERE id = (SELECT id FROM {table} WHERE {clause} LIMIT 1)"
        );

        debug!("Executing SQL: {}", sql);

        let result = bind_values(sqlx::query(&sql), values)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_many(&self, collection: &str, filter: &Filter) -> Result<u64> {
        let table = table_name(collection)?;
        let (clause, values) = where_clause(filter)?;
        let sql = format!("DELETE FROM {} WHERE {}", table, clause);

        debug!("Executing SQL: {}", sql);

        let result = bind_values(sqlx::query(&sql), values)
            .execute(self.db.pool())
            .await?;

        info!("Deleted {} documents from {}", result.rows_affected(), collection);

        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<()> {
        self.db.ping().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{SortDirection, SortSpec};
    use crate::init::{collections, ensure_collections};
    use serde_json::json;

    async fn store() -> SqliteDocumentStore {
        let db = Database::in_memory().await.unwrap();
        ensure_collections(&db).await.unwrap();
        SqliteDocumentStore::new(db)
    }

    fn doc(value: JsonValue) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_find_by_id() {
        let store = store().await;
        let id = store
            .insert_one(collections::BOOKS, doc(json!({"title": "Dune", "rating": 8.5})))
            .await
            .unwrap();

        let found = store
            .find_one(collections::BOOKS, &Filter::by_id(&id), None)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(found["id"], json!(id));
        assert_eq!(found["title"], json!("Dune"));
        assert_eq!(found["rating"], json!(8.5));
    }

    #[tokio::test]
    async fn test_filters_sort_and_paging() {
        let store = store().await;
        for (title, rating) in [("Dune", 9.0), ("Emma", 7.0), ("Dune Messiah", 9.5), ("Ulysses", 6.0)] {
            store
                .insert_one(collections::BOOKS, doc(json!({"title": title, "rating": rating})))
                .await
                .unwrap();
        }

        let filter = Filter::new().matches("title", "dune").gte("rating", 9.0);
        assert_eq!(store.count(collections::BOOKS, &filter).await.unwrap(), 2);

        let query = FindQuery::new(Filter::new())
            .sort(vec![SortSpec::new("rating", SortDirection::Descending)])
            .page(1, 2);
        let page = store.find(collections::BOOKS, &query).await.unwrap();
        let titles: Vec<_> = page.iter().map(|d| d["title"].clone()).collect();
        assert_eq!(titles, vec![json!("Dune"), json!("Emma")]);
    }

    #[tokio::test]
    async fn test_regex_metacharacters_need_escaping_by_caller() {
        let store = store().await;
        store
            .insert_one(collections::BOOKS, doc(json!({"title": "C++ Primer"})))
            .await
            .unwrap();
        store
            .insert_one(collections::BOOKS, doc(json!({"title": "Cats"})))
            .await
            .unwrap();

        let filter = Filter::new().matches("title", r"c\+\+");
        let found = store
            .find(collections::BOOKS, &FindQuery::new(filter))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0]["title"], json!("C++ Primer"));
    }

    #[tokio::test]
    async fn test_projection_keeps_id() {
        let store = store().await;
        store
            .insert_one(collections::BOOKS, doc(json!({"title": "Dune", "author": "Herbert"})))
            .await
            .unwrap();

        let query = FindQuery::new(Filter::new()).projection(Some(vec!["title".to_string()]));
        let found = store.find(collections::BOOKS, &query).await.unwrap();

        assert!(found[0].contains_key("id"));
        assert!(found[0].contains_key("title"));
        assert!(!found[0].contains_key("author"));
    }

    #[tokio::test]
    async fn test_unique_review_per_book_and_owner() {
        let store = store().await;
        let review = doc(json!({"bookId": "b1", "ownerId": "u1", "rating": 4.0}));

        store.insert_one(collections::REVIEWS, review.clone()).await.unwrap();
        let err = store.insert_one(collections::REVIEWS, review).await.unwrap_err();

        assert!(err.is_unique_violation());
    }

    #[tokio::test]
    async fn test_update_merges_and_null_removes() {
        let store = store().await;
        let id = store
            .insert_one(collections::BOOKS, doc(json!({"title": "Dune", "pages": 412})))
            .await
            .unwrap();

        let changed = store
            .update_one(
                collections::BOOKS,
                &Filter::by_id(&id),
                doc(json!({"title": "Dune (1965)", "pages": null})),
            )
            .await
            .unwrap();
        assert_eq!(changed, 1);

        let found = store
            .find_one(collections::BOOKS, &Filter::by_id(&id), None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found["title"], json!("Dune (1965)"));
        assert!(!found.contains_key("pages"));
    }

    #[tokio::test]
    async fn test_delete_many_reports_count() {
        let store = store().await;
        for owner in ["u1", "u2", "u3"] {
            store
                .insert_one(collections::REVIEWS, doc(json!({"bookId": "b1", "ownerId": owner})))
                .await
                .unwrap();
        }
        store
            .insert_one(collections::REVIEWS, doc(json!({"bookId": "b2", "ownerId": "u1"})))
            .await
            .unwrap();

        let removed = store
            .delete_many(collections::REVIEWS, &Filter::new().eq("bookId", "b1"))
            .await
            .unwrap();

        assert_eq!(removed, 3);
        assert_eq!(store.count(collections::REVIEWS, &Filter::new()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_in_and_null_conditions() {
        let store = store().await;
        let a = store
            .insert_one(collections::BOOKS, doc(json!({"title": "A", "ownerId": null})))
            .await
            .unwrap();
        let b = store
            .insert_one(collections::BOOKS, doc(json!({"title": "B", "ownerId": "u1"})))
            .await
            .unwrap();

        let system_owned = Filter::new().eq("ownerId", JsonValue::Null);
        assert_eq!(store.count(collections::BOOKS, &system_owned).await.unwrap(), 1);

        let both = Filter::new().any_of("id", vec![json!(a), json!(b)]);
        assert_eq!(store.count(collections::BOOKS, &both).await.unwrap(), 2);

        let none = Filter::new().any_of("id", Vec::new());
        assert_eq!(store.count(collections::BOOKS, &none).await.unwrap(), 0);
    }

    #[test]
    fn test_field_names_are_validated() {
        assert!(field_expr("published_year").is_ok());
        assert!(field_expr("title'); DROP TABLE x; --").is_err());
        assert!(table_name("Books").is_err());
    }
}
