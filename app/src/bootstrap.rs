//! First-run data: the default account and a starter set of books.

use crate::config::AppConfig;
use catalog::Catalog;
use serde_json::Value;
use tracing::{debug, info};

const SAMPLE_BOOKS: &str = include_str!("../data/sample_books.json");

/// What a bootstrap pass changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    pub admin_created: bool,
    pub books_seeded: u64,
    pub books_total: u64,
}

pub fn sample_books() -> anyhow::Result<Vec<Value>> {
    Ok(serde_json::from_str(SAMPLE_BOOKS)?)
}

/// Create the default account when missing, then top up the catalog with
/// sample books when it holds fewer than the configured minimum.
pub async fn run_bootstrap(catalog: &Catalog, config: &AppConfig) -> anyhow::Result<BootstrapReport> {
    let mut report = BootstrapReport {
        admin_created: catalog.users.ensure_account(&config.admin_account()).await?,
        ..BootstrapReport::default()
    };

    let current = catalog.books.count().await?;
    if !config.auto_seed_books || current >= config.min_books_count {
        debug!(current, minimum = config.min_books_count, "Book seeding skipped");
        report.books_total = current;
        return Ok(report);
    }

    for book in sample_books()? {
        if catalog.books.seed(&book).await? {
            report.books_seeded += 1;
        }
    }

    report.books_total = catalog.books.count().await?;
    info!(seeded = report.books_seeded, "Books in collection: {}", report.books_total);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::Argon2Credentials;
    use database::{ensure_collections, Database, DocumentStore, SqliteDocumentStore};
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Arc;

    async fn catalog() -> Catalog {
        let db = Database::in_memory().await.unwrap();
        ensure_collections(&db).await.unwrap();
        let store: Arc<dyn DocumentStore> = Arc::new(SqliteDocumentStore::new(db));
        Catalog::new(store, Arc::new(Argon2Credentials::new()))
    }

    fn config(pairs: &[(&str, &str)]) -> AppConfig {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        // A pre-hashed secret keeps the tests away from real hashing.
        let mut config = AppConfig::from_lookup(|key| env.get(key).cloned());
        config.admin_password_hash = Some("$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".into());
        config
    }

    #[test]
    fn test_sample_books_parse() {
        let books = sample_books().unwrap();
        assert_eq!(books.len(), 24);
        assert!(books.iter().all(|b| b["isbn"].is_string()));
    }

    #[tokio::test]
    async fn test_bootstrap_is_idempotent() {
        let catalog = catalog().await;
        let config = config(&[]);

        let first = run_bootstrap(&catalog, &config).await.unwrap();
        assert!(first.admin_created);
        assert_eq!(first.books_seeded, 24);
        assert_eq!(first.books_total, 24);

        let second = run_bootstrap(&catalog, &config).await.unwrap();
        assert!(!second.admin_created);
        assert_eq!(second.books_seeded, 0);
        assert_eq!(second.books_total, 24);
    }

    #[tokio::test]
    async fn test_seeding_can_be_disabled() {
        let catalog = catalog().await;
        let report = run_bootstrap(&catalog, &config(&[("AUTO_SEED_BOOKS", "off")]))
            .await
            .unwrap();

        assert!(report.admin_created);
        assert_eq!(report.books_seeded, 0);
        assert_eq!(report.books_total, 0);
    }

    #[tokio::test]
    async fn test_seeding_stops_at_minimum() {
        let catalog = catalog().await;
        catalog
            .books
            .seed(&json!({"title": "Only", "author": "One", "isbn": "x-1"}))
            .await
            .unwrap();

        let report = run_bootstrap(&catalog, &config(&[("MIN_BOOKS_COUNT", "1")]))
            .await
            .unwrap();

        assert_eq!(report.books_seeded, 0);
        assert_eq!(report.books_total, 1);
    }
}
