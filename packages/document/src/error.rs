use thiserror::Error;

pub type DocumentResult<T> = Result<T, DocumentError>;

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Invalid block type: {0}")]
    InvalidBlockType(String),

    #[error("Invalid column count {count}: rows hold between 1 and {max} columns")]
    InvalidColumnCount { count: usize, max: usize },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DocumentError {
    pub fn invalid_block_type(tag: impl Into<String>) -> Self {
        Self::InvalidBlockType(tag.into())
    }
}
