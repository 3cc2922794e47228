use thiserror::Error;

/// Errors from catalog sources.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("fetch error: {0}")]
    Fetch(String),
}

/// Errors from profile/settings blob storage.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
