//! Persistence ports used by the ingestion workflow, the comparison engine
//! and the library manager. `Database` is the production implementation.

use crate::db::{DbArtist, DbMaster, DbRelease};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    /// A natural-key uniqueness constraint rejected the write
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Corrupt stored data: {0}")]
    Corrupt(String),
}

/// Artist persistence, keyed by artist name
#[async_trait::async_trait]
pub trait ArtistRepository: Send + Sync {
    async fn artist_exists(&self, name: &str) -> Result<bool, RepositoryError>;

    /// Artist with its aliases, if stored
    async fn find_artist(&self, name: &str) -> Result<Option<DbArtist>, RepositoryError>;

    async fn find_artists(&self) -> Result<Vec<DbArtist>, RepositoryError>;

    /// Write the artist and its aliases as one unit of work
    async fn save_artist(&self, artist: &DbArtist) -> Result<(), RepositoryError>;

    /// Remove the artist and everything it owns.
    ///
    /// Returns `false` when nothing matched; callers that need a not-found
    /// error must check existence themselves.
    async fn delete_artist(&self, name: &str) -> Result<bool, RepositoryError>;
}

/// Master persistence, keyed by master title
#[async_trait::async_trait]
pub trait MasterRepository: Send + Sync {
    async fn master_exists(&self, title: &str) -> Result<bool, RepositoryError>;
    async fn find_master(&self, title: &str) -> Result<Option<DbMaster>, RepositoryError>;
    async fn find_masters(&self) -> Result<Vec<DbMaster>, RepositoryError>;
    async fn save_master(&self, master: &DbMaster) -> Result<(), RepositoryError>;
    async fn delete_master(&self, title: &str) -> Result<bool, RepositoryError>;
}

/// Release persistence, keyed by release title
#[async_trait::async_trait]
pub trait ReleaseRepository: Send + Sync {
    async fn release_exists(&self, title: &str) -> Result<bool, RepositoryError>;
    async fn find_release(&self, title: &str) -> Result<Option<DbRelease>, RepositoryError>;
    async fn find_releases(&self) -> Result<Vec<DbRelease>, RepositoryError>;

    /// Releases owned by an artist, in the order they were saved
    async fn find_releases_by_artist(
        &self,
        artist_id: &str,
    ) -> Result<Vec<DbRelease>, RepositoryError>;

    async fn save_release(&self, release: &DbRelease) -> Result<(), RepositoryError>;
    async fn delete_release(&self, title: &str) -> Result<bool, RepositoryError>;
}

/// Everything the catalog services need from storage
pub trait CatalogStore: ArtistRepository + MasterRepository + ReleaseRepository {}

impl<T> CatalogStore for T where T: ArtistRepository + MasterRepository + ReleaseRepository {}
