use crate::store::{field_expr, table_name};
use crate::{Database, Result};
use std::sync::Arc;
use tracing::info;

/// Collection names used by the application.
pub mod collections {
    pub const BOOKS: &str = "books";
    pub const REVIEWS: &str = "reviews";
    pub const USERS: &str = "users";
}

struct IndexSpec {
    name: &'static str,
    collection: &'static str,
    fields: &'static [&'static str],
    unique: bool,
}

const INDEXES: &[IndexSpec] = &[
    IndexSpec {
        name: "idx_users_username",
        collection: collections::USERS,
        fields: &["username"],
        unique: true,
    },
    IndexSpec {
        name: "idx_reviews_book_owner",
        collection: collections::REVIEWS,
        fields: &["bookId", "ownerId"],
        unique: true,
    },
    IndexSpec {
        name: "idx_books_title",
        collection: collections::BOOKS,
        fields: &["title"],
        unique: false,
    },
    IndexSpec {
        name: "idx_books_author",
        collection: collections::BOOKS,
        fields: &["author"],
        unique: false,
    },
    IndexSpec {
        name: "idx_books_genre",
        collection: collections::BOOKS,
        fields: &["genre"],
        unique: false,
    },
    IndexSpec {
        name: "idx_books_isbn",
        collection: collections::BOOKS,
        fields: &["isbn"],
        unique: false,
    },
];

/// Database initialization configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// SQLite URL or file path
    pub database_url: String,
    /// Whether to create collection tables and indexes on initialization
    pub create_tables: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite:data/bookshelf.db".to_string(),
            create_tables: true,
        }
    }
}

impl DatabaseConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Self::default()
        }
    }

    /// Set whether to create tables on initialization
    pub fn with_create_tables(mut self, create: bool) -> Self {
        self.create_tables = create;
        self
    }
}

/// Initialize the database with the given configuration
pub async fn initialize_database(config: DatabaseConfig) -> Result<Arc<Database>> {
    info!("Initializing database with configuration");

    let db = Database::new(&config.database_url).await?;

    if config.create_tables {
        ensure_collections(&db).await?;
    }

    Ok(Arc::new(db))
}

/// Create the collection tables and their indexes if missing.
pub async fn ensure_collections(db: &Database) -> Result<()> {
    for collection in [collections::BOOKS, collections::REVIEWS, collections::USERS] {
        let table = table_name(collection)?;
        db.execute_raw(&format!(
            "CREATE TABLE IF NOT EXISTS {} (id TEXT PRIMARY KEY NOT NULL, body TEXT NOT NULL)",
            table
        ))
        .await?;
    }

    for index in INDEXES {
        let table = table_name(index.collection)?;
        let columns = index
            .fields
            .iter()
            .map(|field| field_expr(field))
            .collect::<Result<Vec<_>>>()?
            .join(", ");
        let unique = if index.unique { "UNIQUE " } else { "" };
        db.execute_raw(&format!(
            "CREATE {}INDEX IF NOT EXISTS {} ON {} ({})",
            unique, index.name, table, columns
        ))
        .await?;
    }

    info!("Collections and indexes are in place");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_database_initialization() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        let config = DatabaseConfig::new(db_path.to_str().unwrap());
        let db = initialize_database(config).await.unwrap();

        assert!(db_path.exists());
        assert!(db.table_exists("doc_books").await.unwrap());
        assert!(db.table_exists("doc_reviews").await.unwrap());
        assert!(db.table_exists("doc_users").await.unwrap());
    }

    #[tokio::test]
    async fn test_ensure_collections_is_idempotent() {
        let db = Database::in_memory().await.unwrap();
        ensure_collections(&db).await.unwrap();
        ensure_collections(&db).await.unwrap();
        assert!(db.table_exists("doc_users").await.unwrap());
    }

    #[tokio::test]
    async fn test_skip_table_creation() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("bare.db");

        let config = DatabaseConfig::new(db_path.to_str().unwrap()).with_create_tables(false);
        let db = initialize_database(config).await.unwrap();

        assert!(!db.table_exists("doc_books").await.unwrap());
    }
}
