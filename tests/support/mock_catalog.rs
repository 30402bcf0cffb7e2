use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use discogs_compare::db::{Database, DbArtist, DbMaster, DbRelease};
use discogs_compare::discogs::{
    AliasDetails, ArtistDetails, CatalogClient, DiscogsError, MasterDetails, ReleaseDetails,
};
use discogs_compare::repository::{
    ArtistRepository, MasterRepository, ReleaseRepository, RepositoryError,
};
use tokio::sync::Barrier;

/// In-memory Discogs stand-in that counts every call it receives
#[derive(Default)]
pub struct MockCatalogClient {
    ids: HashMap<String, u64>,
    details: HashMap<u64, ArtistDetails>,
    masters: HashMap<String, Vec<MasterDetails>>,
    releases: HashMap<String, Vec<ReleaseDetails>>,
    details_error: Option<DiscogsError>,
    releases_error: Option<DiscogsError>,
    resolve_calls: AtomicUsize,
    details_calls: AtomicUsize,
    masters_calls: AtomicUsize,
    releases_calls: AtomicUsize,
}

impl MockCatalogClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an artist that resolves to `discogs_id` and whose detail
    /// record carries `canonical_name`
    pub fn with_artist(mut self, query: &str, discogs_id: u64, canonical_name: &str) -> Self {
        self.ids.insert(query.to_string(), discogs_id);
        self.details.insert(
            discogs_id,
            ArtistDetails {
                id: Some(discogs_id),
                name: Some(canonical_name.to_string()),
                realname: Some(format!("{} (real)", canonical_name)),
                profile: Some(format!("Profile of {}", canonical_name)),
                resource_url: Some(format!("https://api.discogs.com/artists/{}", discogs_id)),
                uri: Some(format!("https://www.discogs.com/artist/{}", discogs_id)),
                releases_url: Some(format!(
                    "https://api.discogs.com/artists/{}/releases",
                    discogs_id
                )),
                namevariations: Some(vec![canonical_name.to_uppercase()]),
                aliases: None,
            },
        );
        self
    }

    pub fn with_aliases(mut self, discogs_id: u64, aliases: &[(u64, &str)]) -> Self {
        if let Some(details) = self.details.get_mut(&discogs_id) {
            details.aliases = Some(
                aliases
                    .iter()
                    .map(|(id, name)| AliasDetails {
                        id: *id,
                        name: Some(name.to_string()),
                        resource_url: None,
                    })
                    .collect(),
            );
        }
        self
    }

    pub fn with_masters(mut self, query: &str, masters: Vec<MasterDetails>) -> Self {
        self.masters.insert(query.to_string(), masters);
        self
    }

    pub fn with_releases(mut self, query: &str, releases: Vec<ReleaseDetails>) -> Self {
        self.releases.insert(query.to_string(), releases);
        self
    }

    pub fn failing_details(mut self, error: DiscogsError) -> Self {
        self.details_error = Some(error);
        self
    }

    pub fn failing_releases(mut self, error: DiscogsError) -> Self {
        self.releases_error = Some(error);
        self
    }

    pub fn resolve_calls(&self) -> usize {
        self.resolve_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.resolve_calls.load(Ordering::SeqCst)
            + self.details_calls.load(Ordering::SeqCst)
            + self.masters_calls.load(Ordering::SeqCst)
            + self.releases_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl CatalogClient for MockCatalogClient {
    async fn resolve_artist_id(&self, name: &str) -> Result<u64, DiscogsError> {
        self.resolve_calls.fetch_add(1, Ordering::SeqCst);
        self.ids
            .get(name)
            .copied()
            .ok_or_else(|| DiscogsError::NotFound(format!("artist {}", name)))
    }

    async fn fetch_artist_details(&self, discogs_id: u64) -> Result<ArtistDetails, DiscogsError> {
        self.details_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = &self.details_error {
            return Err(error.clone());
        }
        self.details
            .get(&discogs_id)
            .cloned()
            .ok_or_else(|| DiscogsError::NotFound(format!("artist details for {}", discogs_id)))
    }

    async fn fetch_artist_masters(&self, name: &str) -> Result<Vec<MasterDetails>, DiscogsError> {
        self.masters_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.masters.get(name).cloned().unwrap_or_default())
    }

    async fn fetch_artist_releases(
        &self,
        name: &str,
    ) -> Result<Vec<ReleaseDetails>, DiscogsError> {
        self.releases_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = &self.releases_error {
            return Err(error.clone());
        }
        Ok(self.releases.get(name).cloned().unwrap_or_default())
    }
}

pub fn master(id: u64, title: &str, year: &str) -> MasterDetails {
    MasterDetails {
        id: Some(id),
        title: Some(title.to_string()),
        year: Some(year.to_string()),
        genre: Some(vec!["Rock".to_string()]),
        ..Default::default()
    }
}

pub fn release(id: u64, title: &str, year: &str, genres: &[&str]) -> ReleaseDetails {
    ReleaseDetails {
        id: Some(id),
        title: Some(title.to_string()),
        year: Some(year.to_string()),
        genre: Some(genres.iter().map(|g| g.to_string()).collect()),
        ..Default::default()
    }
}

/// Real database with scripted misbehaviour layered on top
///
/// Clones share their counters and gate, so several services can race on
/// one store.
#[derive(Clone)]
pub struct ScriptedStore {
    inner: Database,
    poisoned_release: Option<String>,
    exists_gate: Option<(Arc<Barrier>, usize)>,
    gated_checks: Arc<AtomicUsize>,
    artist_deletes: Arc<AtomicUsize>,
}

impl ScriptedStore {
    fn new(inner: Database) -> Self {
        Self {
            inner,
            poisoned_release: None,
            exists_gate: None,
            gated_checks: Arc::new(AtomicUsize::new(0)),
            artist_deletes: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Refuses to store the release titled `title`
    pub fn failing_release(inner: Database, title: &str) -> Self {
        Self {
            poisoned_release: Some(title.to_string()),
            ..Self::new(inner)
        }
    }

    /// The first `callers` existence checks wait for each other before
    /// reading, so every one of them sees the same (empty) state
    pub fn racing(inner: Database, callers: usize) -> Self {
        Self {
            exists_gate: Some((Arc::new(Barrier::new(callers)), callers)),
            ..Self::new(inner)
        }
    }

    pub fn artist_deletes(&self) -> usize {
        self.artist_deletes.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ArtistRepository for ScriptedStore {
    async fn artist_exists(&self, name: &str) -> Result<bool, RepositoryError> {
        if let Some((gate, callers)) = &self.exists_gate {
            if self.gated_checks.fetch_add(1, Ordering::SeqCst) < *callers {
                gate.wait().await;
            }
        }
        self.inner.artist_exists(name).await
    }

    async fn find_artist(&self, name: &str) -> Result<Option<DbArtist>, RepositoryError> {
        self.inner.find_artist(name).await
    }

    async fn find_artists(&self) -> Result<Vec<DbArtist>, RepositoryError> {
        self.inner.find_artists().await
    }

    async fn save_artist(&self, artist: &DbArtist) -> Result<(), RepositoryError> {
        self.inner.save_artist(artist).await
    }

    async fn delete_artist(&self, name: &str) -> Result<bool, RepositoryError> {
        self.artist_deletes.fetch_add(1, Ordering::SeqCst);
        self.inner.delete_artist(name).await
    }
}

#[async_trait::async_trait]
impl MasterRepository for ScriptedStore {
    async fn master_exists(&self, title: &str) -> Result<bool, RepositoryError> {
        self.inner.master_exists(title).await
    }

    async fn find_master(&self, title: &str) -> Result<Option<DbMaster>, RepositoryError> {
        self.inner.find_master(title).await
    }

    async fn find_masters(&self) -> Result<Vec<DbMaster>, RepositoryError> {
        self.inner.find_masters().await
    }

    async fn save_master(&self, master: &DbMaster) -> Result<(), RepositoryError> {
        self.inner.save_master(master).await
    }

    async fn delete_master(&self, title: &str) -> Result<bool, RepositoryError> {
        self.inner.delete_master(title).await
    }
}

#[async_trait::async_trait]
impl ReleaseRepository for ScriptedStore {
    async fn release_exists(&self, title: &str) -> Result<bool, RepositoryError> {
        self.inner.release_exists(title).await
    }

    async fn find_release(&self, title: &str) -> Result<Option<DbRelease>, RepositoryError> {
        self.inner.find_release(title).await
    }

    async fn find_releases(&self) -> Result<Vec<DbRelease>, RepositoryError> {
        self.inner.find_releases().await
    }

    async fn find_releases_by_artist(
        &self,
        artist_id: &str,
    ) -> Result<Vec<DbRelease>, RepositoryError> {
        self.inner.find_releases_by_artist(artist_id).await
    }

    async fn save_release(&self, release: &DbRelease) -> Result<(), RepositoryError> {
        if self.poisoned_release.as_deref() == Some(release.title.as_str()) {
            return Err(RepositoryError::Corrupt(format!(
                "refusing to store {}",
                release.title
            )));
        }
        self.inner.save_release(release).await
    }

    async fn delete_release(&self, title: &str) -> Result<bool, RepositoryError> {
        self.inner.delete_release(title).await
    }
}
