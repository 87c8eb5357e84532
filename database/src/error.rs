use thiserror::Error;

pub type Result<T> = std::result::Result<T, DatabaseError>;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Database connection error: {0}")]
    Connection(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("Invalid field name: {0}")]
    InvalidField(String),

    #[error("Invalid collection name: {0}")]
    InvalidCollection(String),

    #[error("Malformed document: {0}")]
    MalformedDocument(#[from] serde_json::Error),

    #[error("Other error: {0}")]
    Other(String),
}

impl DatabaseError {
    /// Maps a write failure, surfacing unique index violations as their own variant.
    pub(crate) fn from_write(err: sqlx::Error) -> Self {
        match err.as_database_error() {
            Some(db_err) if db_err.is_unique_violation() => {
                DatabaseError::UniqueViolation(db_err.message().to_string())
            }
            _ => DatabaseError::Connection(err),
        }
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(self, DatabaseError::UniqueViolation(_))
    }
}
