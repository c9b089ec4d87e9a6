use super::types::ValidationError;
use crate::storage::StorageError;
use thiserror::Error;

pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("invalid input: {0}")]
    Invalid(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl CatalogError {
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, Self::Storage(e) if e.is_quota_exceeded())
    }
}
