use thiserror::Error;

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Failures raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The write would push the store past its byte ceiling.
    #[error("storage quota exceeded writing '{key}': {required} bytes needed, limit is {limit}")]
    QuotaExceeded {
        key: String,
        required: usize,
        limit: usize,
    },

    #[error("IO error in {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize stored data: {0}")]
    Encode(#[from] serde_json::Error),
}

impl StorageError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, Self::QuotaExceeded { .. })
    }
}
