use tracing::{debug, error, info, warn};

use crate::db::DbArtist;
use crate::discogs::{CatalogClient, DiscogsError};
use crate::error::CatalogError;
use crate::ingest::mapper::{map_artist, map_master, map_release};
use crate::repository::CatalogStore;

/// Search-and-save workflow: looks an artist up on Discogs and stores a
/// snapshot of the artist, its aliases, masters and releases.
///
/// Storage writes happen in this order:
/// 1. the artist together with its aliases (one transaction)
/// 2. each master, one insert at a time
/// 3. each release, one insert at a time
///
/// If anything fails after step 1, the artist is deleted again (which
/// cascades to whatever children were already written) and the original
/// error is returned.
pub struct SearchService<C, S>
where
    C: CatalogClient,
    S: CatalogStore,
{
    catalog: C,
    store: S,
}

impl<C, S> SearchService<C, S>
where
    C: CatalogClient,
    S: CatalogStore,
{
    pub fn new(catalog: C, store: S) -> Self {
        Self { catalog, store }
    }

    /// Fetch `name` from Discogs and store it, unless an artist with exactly
    /// this name is already stored. In that case nothing is fetched or
    /// written.
    pub async fn search_and_save_artist(&self, name: &str) -> Result<(), CatalogError> {
        if name.trim().is_empty() {
            return Err(CatalogError::InvalidInput(
                "The artist name cannot be empty.".to_string(),
            ));
        }

        if self.store.artist_exists(name).await? {
            info!("Artist '{}' already stored, skipping Discogs lookup", name);
            return Ok(());
        }

        let discogs_id = self
            .catalog
            .resolve_artist_id(name)
            .await
            .map_err(|e| match e {
                DiscogsError::NotFound(_) => CatalogError::NotFound(format!("artist {}", name)),
                other => other.into(),
            })?;

        let details = self.catalog.fetch_artist_details(discogs_id).await?;
        let artist = map_artist(name, discogs_id, details);

        // Discogs may spell the name differently from the query
        if artist.name != name && self.store.artist_exists(&artist.name).await? {
            info!(
                "Artist '{}' already stored as '{}', nothing to do",
                name, artist.name
            );
            return Ok(());
        }

        self.store.save_artist(&artist).await?;
        info!(
            "Saved artist '{}' (discogs id {}) with {} alias(es)",
            artist.name,
            artist.discogs_id,
            artist.aliases.len()
        );

        if let Err(e) = self.save_discography(name, &artist).await {
            self.discard_artist(&artist).await;
            return Err(e);
        }

        Ok(())
    }

    async fn save_discography(&self, name: &str, artist: &DbArtist) -> Result<(), CatalogError> {
        // Masters and releases are fetched concurrently
        let (masters, releases) = futures::try_join!(
            self.catalog.fetch_artist_masters(name),
            self.catalog.fetch_artist_releases(name),
        )?;

        let fetched_masters = masters.len();
        let mut saved_masters = 0;
        for master in masters.into_iter().filter_map(|m| map_master(&artist.id, m)) {
            self.store.save_master(&master).await?;
            saved_masters += 1;
        }
        if saved_masters < fetched_masters {
            debug!(
                "Skipped {} untitled master(s) for '{}'",
                fetched_masters - saved_masters,
                artist.name
            );
        }

        let fetched_releases = releases.len();
        let mut saved_releases = 0;
        for release in releases
            .into_iter()
            .filter_map(|r| map_release(&artist.id, r))
        {
            self.store.save_release(&release).await?;
            saved_releases += 1;
        }
        if saved_releases < fetched_releases {
            debug!(
                "Skipped {} untitled release(s) for '{}'",
                fetched_releases - saved_releases,
                artist.name
            );
        }

        info!(
            "Saved {} master(s) and {} release(s) for '{}'",
            saved_masters, saved_releases, artist.name
        );
        Ok(())
    }

    async fn discard_artist(&self, artist: &DbArtist) {
        warn!(
            "Ingestion of '{}' failed after the artist was saved, removing it",
            artist.name
        );
        if let Err(e) = self.store.delete_artist(&artist.name).await {
            error!("Could not remove partially saved artist '{}': {}", artist.name, e);
        }
    }
}
