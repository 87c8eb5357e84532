pub mod bootstrap;
pub mod config;
pub mod logging;

pub use bootstrap::{run_bootstrap, BootstrapReport};
pub use config::AppConfig;

use anyhow::Context;
use api::SqliteStore;
use catalog::{Argon2Credentials, Catalog};
use database::{initialize_database, Database, DatabaseConfig, DocumentStore, SqliteDocumentStore};
use std::sync::Arc;

/// Open the database, making sure every collection and index exists, and
/// build the catalog on top of it.
pub async fn open_catalog(config: &AppConfig) -> anyhow::Result<(Catalog, Database)> {
    let db = initialize_database(DatabaseConfig::new(config.database_url.clone()))
        .await
        .with_context(|| format!("cannot open database at {}", config.database_url))?;
    let db = Database::clone(&db);

    let store: Arc<dyn DocumentStore> = Arc::new(SqliteDocumentStore::new(db.clone()));
    let catalog = Catalog::new(store, Arc::new(Argon2Credentials::new()));
    Ok((catalog, db))
}

/// Bootstrap the data, then serve the HTTP API until interrupted.
pub async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let (catalog, db) = open_catalog(&config).await?;

    let report = run_bootstrap(&catalog, &config)
        .await
        .context("bootstrap failed")?;
    tracing::info!(
        admin_created = report.admin_created,
        books_seeded = report.books_seeded,
        "Bootstrap complete"
    );

    api::start_server_with_config(catalog, SqliteStore::new(db.pool().clone()), config.api_config())
        .await
        .map_err(|e| anyhow::anyhow!("API server error: {}", e))
}

/// Bootstrap the data and exit.
pub async fn bootstrap_only(config: &AppConfig) -> anyhow::Result<BootstrapReport> {
    let (catalog, _db) = open_catalog(config).await?;
    run_bootstrap(&catalog, config).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bootstrap_against_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite:{}", dir.path().join("nested/bookshelf.db").display());
        let mut config = AppConfig::from_lookup(|key| match key {
            "DATABASE_URL" => Some(url.clone()),
            "MIN_BOOKS_COUNT" => Some("5".to_string()),
            _ => None,
        });
        config.admin_password_hash = Some("$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".into());

        let report = bootstrap_only(&config).await.unwrap();
        assert!(report.admin_created);
        assert_eq!(report.books_total, 24);

        // Reopening sees the same data.
        let report = bootstrap_only(&config).await.unwrap();
        assert!(!report.admin_created);
        assert_eq!(report.books_seeded, 0);
    }
}
