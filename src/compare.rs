use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

use crate::db::DbRelease;
use crate::error::CatalogError;
use crate::repository::{ArtistRepository, ReleaseRepository};

/// Placeholder used when an artist has no usable year or genre data
pub const UNKNOWN: &str = "Unknown";

/// Release statistics for one stored artist
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ArtistComparison {
    pub artist_name: String,
    pub number_of_releases: usize,
    /// Latest minus earliest numeric release year; zero without any
    pub active_years: i64,
    /// Every genre across the artist's releases, deduplicated, first-seen order
    pub common_genres: Vec<String>,
    pub first_release_year: String,
    pub last_release_year: String,
    pub most_common_genre: String,
}

impl ArtistComparison {
    pub fn from_releases(artist_name: &str, releases: &[DbRelease]) -> Self {
        Self {
            artist_name: artist_name.to_string(),
            number_of_releases: releases.len(),
            active_years: active_years(releases),
            common_genres: common_genres(releases),
            first_release_year: year_strings(releases)
                .min()
                .unwrap_or(UNKNOWN)
                .to_string(),
            last_release_year: year_strings(releases)
                .max()
                .unwrap_or(UNKNOWN)
                .to_string(),
            most_common_genre: most_common_genre(releases),
        }
    }
}

/// Non-empty year strings, as stored
fn year_strings(releases: &[DbRelease]) -> impl Iterator<Item = &str> {
    releases
        .iter()
        .map(|r| r.year.as_str())
        .filter(|y| !y.is_empty())
}

/// Span between the earliest and latest year, not the number of years with
/// a release. Years that do not parse as 32-bit integers are ignored.
fn active_years(releases: &[DbRelease]) -> i64 {
    let years: HashSet<i32> = year_strings(releases)
        .filter_map(|y| y.parse::<i32>().ok())
        .collect();

    match (years.iter().min(), years.iter().max()) {
        (Some(min), Some(max)) => i64::from(*max) - i64::from(*min),
        _ => 0,
    }
}

fn common_genres(releases: &[DbRelease]) -> Vec<String> {
    let mut seen = HashSet::new();
    releases
        .iter()
        .flat_map(|r| r.genre.iter())
        .filter(|g| seen.insert(g.as_str()))
        .cloned()
        .collect()
}

/// Highest occurrence count wins; ties go to the genre seen first
fn most_common_genre(releases: &[DbRelease]) -> String {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();

    for genre in releases.iter().flat_map(|r| r.genre.iter()) {
        let count = counts.entry(genre.as_str()).or_insert(0);
        if *count == 0 {
            order.push(genre.as_str());
        }
        *count += 1;
    }

    let mut best: Option<(&str, usize)> = None;
    for genre in order {
        let count = counts[genre];
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((genre, count));
        }
    }

    best.map(|(genre, _)| genre.to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// Computes comparison statistics over stored artists
pub struct ComparisonService<S>
where
    S: ArtistRepository + ReleaseRepository,
{
    store: S,
}

impl<S> ComparisonService<S>
where
    S: ArtistRepository + ReleaseRepository,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// One result per name, in the order given.
    ///
    /// Every name must belong to a stored artist; the first unknown name
    /// fails the whole call and no partial results are returned.
    pub async fn compare_artists<N: AsRef<str>>(
        &self,
        names: &[N],
    ) -> Result<Vec<ArtistComparison>, CatalogError> {
        if names.is_empty() {
            return Err(CatalogError::NotFound("artist list is empty".to_string()));
        }

        let mut artists = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            let artist = self
                .store
                .find_artist(name)
                .await?
                .ok_or_else(|| CatalogError::NotFound(format!("artist {}", name)))?;
            artists.push(artist);
        }

        let mut results = Vec::with_capacity(artists.len());
        for artist in artists {
            let releases = self.store.find_releases_by_artist(&artist.id).await?;
            debug!(
                "Comparing '{}' over {} release(s)",
                artist.name,
                releases.len()
            );
            results.push(ArtistComparison::from_releases(&artist.name, &releases));
        }

        info!("Compared {} artist(s)", results.len());
        Ok(results)
    }
}
