use reqwest::StatusCode;
use thiserror::Error;

use crate::discogs::DiscogsError;
use crate::repository::RepositoryError;

/// Error returned by every public catalog operation.
///
/// Callers only ever see these four kinds; transport and storage library
/// errors are wrapped before they get here.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Discogs unavailable: {0}")]
    Upstream(String),
    #[error("Storage error: {0}")]
    Storage(#[from] RepositoryError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
    Upstream,
    Internal,
}

impl CatalogError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CatalogError::InvalidInput(_) => ErrorKind::InvalidInput,
            CatalogError::NotFound(_) => ErrorKind::NotFound,
            CatalogError::Upstream(_) => ErrorKind::Upstream,
            CatalogError::Storage(_) => ErrorKind::Internal,
        }
    }

    /// HTTP status a transport layer should answer with
    pub fn status(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Upstream => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DiscogsError> for CatalogError {
    fn from(e: DiscogsError) -> Self {
        match e {
            DiscogsError::NotFound(what) => CatalogError::NotFound(what),
            DiscogsError::Upstream(msg) => CatalogError::Upstream(msg),
        }
    }
}
