use thiserror::Error;

/// Errors that can occur when reading or writing durable storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A file system error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// The backend refused the operation.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// The backend configuration is unusable.
    #[error("Invalid storage configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;
