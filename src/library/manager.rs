use tracing::info;

use crate::db::{DbArtist, DbMaster, DbRelease};
use crate::error::CatalogError;
use crate::repository::CatalogStore;

/// Browsing and removal of stored artists, masters and releases
///
/// Lookups and deletions go through natural keys: artist name, master
/// title, release title. Deleting a key that is not stored is a
/// `NotFound` error rather than a silent no-op.
#[derive(Debug, Clone)]
pub struct LibraryManager<S> {
    store: S,
}

impl<S: CatalogStore> LibraryManager<S> {
    /// Create a new library manager
    pub fn new(store: S) -> Self {
        LibraryManager { store }
    }

    /// Get all artists in the library
    pub async fn list_artists(&self) -> Result<Vec<DbArtist>, CatalogError> {
        Ok(self.store.find_artists().await?)
    }

    /// Get an artist (with aliases) by name
    pub async fn get_artist(&self, name: &str) -> Result<Option<DbArtist>, CatalogError> {
        Ok(self.store.find_artist(name).await?)
    }

    /// Delete an artist together with its aliases, masters and releases
    pub async fn delete_artist(&self, name: &str) -> Result<(), CatalogError> {
        if !self.store.artist_exists(name).await? {
            return Err(CatalogError::NotFound(format!("artist {}", name)));
        }
        self.store.delete_artist(name).await?;
        info!("Deleted artist '{}'", name);
        Ok(())
    }

    pub async fn list_masters(&self) -> Result<Vec<DbMaster>, CatalogError> {
        Ok(self.store.find_masters().await?)
    }

    pub async fn get_master(&self, title: &str) -> Result<Option<DbMaster>, CatalogError> {
        Ok(self.store.find_master(title).await?)
    }

    /// Delete every master stored under `title`
    pub async fn delete_master(&self, title: &str) -> Result<(), CatalogError> {
        if !self.store.master_exists(title).await? {
            return Err(CatalogError::NotFound(format!("master {}", title)));
        }
        self.store.delete_master(title).await?;
        info!("Deleted master '{}'", title);
        Ok(())
    }

    pub async fn list_releases(&self) -> Result<Vec<DbRelease>, CatalogError> {
        Ok(self.store.find_releases().await?)
    }

    pub async fn get_release(&self, title: &str) -> Result<Option<DbRelease>, CatalogError> {
        Ok(self.store.find_release(title).await?)
    }

    /// Delete every release stored under `title`
    pub async fn delete_release(&self, title: &str) -> Result<(), CatalogError> {
        if !self.store.release_exists(title).await? {
            return Err(CatalogError::NotFound(format!("release {}", title)));
        }
        self.store.delete_release(title).await?;
        info!("Deleted release '{}'", title);
        Ok(())
    }
}
