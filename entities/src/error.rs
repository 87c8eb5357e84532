use fields::ValidationErrors;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EntitiesError>;

#[derive(Error, Debug)]
pub enum EntitiesError {
    #[error("{0}")]
    Validation(#[from] ValidationErrors),

    #[error("Malformed stored document: {0}")]
    MalformedDocument(#[from] serde_json::Error),
}
