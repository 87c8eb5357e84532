use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

pub mod document;
pub mod error;
pub mod init;
pub mod store;

pub use document::{
    generate_id, is_valid_id, now_timestamp, Condition, Document, Filter, FindQuery,
    SortDirection, SortSpec,
};
pub use error::{DatabaseError, Result};
pub use init::{collections, ensure_collections, initialize_database, DatabaseConfig};
pub use store::{DocumentStore, SqliteDocumentStore};

/// Database connection pool
#[derive(Debug, Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Connect to a SQLite database given a path or a `sqlite:` URL.
    ///
    /// The `REGEXP` operator is registered on every connection; text filters
    /// depend on it.
    pub async fn new(database_url: &str) -> Result<Self> {
        let connection_string = normalize_url(database_url);

        if let Some(path) = connection_string
            .strip_prefix("sqlite://")
            .or_else(|| connection_string.strip_prefix("sqlite:"))
        {
            if !path.starts_with(":memory:") {
                if let Some(parent) = Path::new(path).parent() {
                    if !parent.as_os_str().is_empty() {
                        std::fs::create_dir_all(parent)?;
                    }
                }
            }
        }

        info!("Connecting to database at: {}", connection_string);

        let options = SqliteConnectOptions::from_str(&connection_string)?
            .create_if_missing(true)
            .with_regexp();

        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(options)
            .await?;

        debug!("Database connection established");

        Ok(Self { pool })
    }

    /// Open a private in-memory database.
    ///
    /// Pinned to a single connection that never expires, otherwise each pool
    /// connection would see its own empty database.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.with_regexp();

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        debug!("In-memory database ready");

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Round-trip a trivial query to confirm the pool is usable.
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Check if a table exists
    pub async fn table_exists(&self, table_name: &str) -> Result<bool> {
        let query = r#"
            SELECT COUNT(*) as count
            FROM sqlite_master
            WHERE type='table' AND name=?
        "#;

        let result: (i32,) = sqlx::query_as(query)
            .bind(table_name)
            .fetch_one(&self.pool)
            .await?;

        Ok(result.0 > 0)
    }

    /// Execute raw SQL (for table creation, etc.)
    pub async fn execute_raw(&self, sql: &str) -> Result<()> {
        sqlx::query(sql).execute(&self.pool).await?;
        Ok(())
    }
}

fn normalize_url(database_url: &str) -> String {
    if database_url.starts_with("sqlite:") {
        database_url.to_string()
    } else if database_url == ":memory:" {
        "sqlite::memory:".to_string()
    } else if database_url.starts_with('/') {
        format!("sqlite://{}", database_url)
    } else {
        format!("sqlite:{}", database_url)
    }
}
