use crate::config::Config;
use crate::discogs::models::{
    ArtistDetails, ArtistSearchResult, MasterDetails, ReleaseDetails, SearchEnvelope,
};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.discogs.com";

/// Failures at the catalog client boundary.
///
/// Transport errors from reqwest are flattened into `Upstream` so callers
/// never see the HTTP library's own error types.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DiscogsError {
    #[error("Not found on Discogs: {0}")]
    NotFound(String),
    #[error("Discogs request failed: {0}")]
    Upstream(String),
}

impl From<reqwest::Error> for DiscogsError {
    fn from(e: reqwest::Error) -> Self {
        DiscogsError::Upstream(e.to_string())
    }
}

/// Outbound calls the ingestion workflow needs from the metadata catalog
/// (allows mocking for tests)
#[async_trait::async_trait]
pub trait CatalogClient: Send + Sync {
    /// Resolve an artist name to its Discogs ID.
    ///
    /// Only the first search hit is used. Name-to-ID resolution is ambiguous
    /// by construction (several artists can share a name) and no attempt is
    /// made to pick a "best" match.
    async fn resolve_artist_id(&self, name: &str) -> Result<u64, DiscogsError>;

    /// Fetch the full artist record for a Discogs ID
    async fn fetch_artist_details(&self, discogs_id: u64) -> Result<ArtistDetails, DiscogsError>;

    /// First page of masters credited to `name`. Never fails on an empty result.
    async fn fetch_artist_masters(&self, name: &str) -> Result<Vec<MasterDetails>, DiscogsError>;

    /// First page of releases credited to `name`. Never fails on an empty result.
    async fn fetch_artist_releases(&self, name: &str)
        -> Result<Vec<ReleaseDetails>, DiscogsError>;
}

#[async_trait::async_trait]
impl<T: CatalogClient + ?Sized> CatalogClient for Arc<T> {
    async fn resolve_artist_id(&self, name: &str) -> Result<u64, DiscogsError> {
        (**self).resolve_artist_id(name).await
    }

    async fn fetch_artist_details(&self, discogs_id: u64) -> Result<ArtistDetails, DiscogsError> {
        (**self).fetch_artist_details(discogs_id).await
    }

    async fn fetch_artist_masters(&self, name: &str) -> Result<Vec<MasterDetails>, DiscogsError> {
        (**self).fetch_artist_masters(name).await
    }

    async fn fetch_artist_releases(
        &self,
        name: &str,
    ) -> Result<Vec<ReleaseDetails>, DiscogsError> {
        (**self).fetch_artist_releases(name).await
    }
}

/// reqwest-backed Discogs client.
///
/// No retries, caching or custom timeouts: every call is a single request
/// with reqwest's default transport settings.
#[derive(Clone)]
pub struct DiscogsClient {
    client: Client,
    token: String,
    base_url: String,
    user_agent: String,
}

impl DiscogsClient {
    pub fn new(token: String) -> Self {
        Self::with_base_url(token, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(token: String, base_url: String) -> Self {
        Self {
            client: Client::new(),
            token,
            base_url: base_url.trim_end_matches('/').to_string(),
            user_agent: default_user_agent(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            client: Client::new(),
            token: config.discogs_token.clone(),
            base_url: config.discogs_base_url.trim_end_matches('/').to_string(),
            user_agent: config.user_agent.clone(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue a GET and decode the body.
    ///
    /// An empty or `null` body is a valid answer and comes back as `Ok(None)`.
    /// Non-2xx statuses and undecodable bodies are `Upstream` errors.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<Option<T>, DiscogsError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("token", self.token.as_str())])
            .header("User-Agent", &self.user_agent)
            .send()
            .await
            .map_err(|e| {
                warn!("✗ Discogs request to {} failed: {}", path, e);
                DiscogsError::from(e)
            })?;

        let status = response.status();
        debug!("Response status: {}", status);

        if !status.is_success() {
            warn!("✗ Discogs API error for {}: {}", path, status);
            return Err(DiscogsError::Upstream(format!(
                "GET {} returned {}",
                path, status
            )));
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            debug!("Empty body from {}", path);
            return Ok(None);
        }

        serde_json::from_str::<Option<T>>(&body).map_err(|e| {
            warn!("✗ Could not decode Discogs response from {}: {}", path, e);
            DiscogsError::Upstream(format!("malformed response from {}: {}", path, e))
        })
    }

    async fn search<T: DeserializeOwned>(
        &self,
        params: &[(&str, &str)],
    ) -> Result<Vec<T>, DiscogsError> {
        let results = self
            .get_json::<SearchEnvelope<T>>("/database/search", params)
            .await?
            .map(SearchEnvelope::into_results)
            .unwrap_or_default();

        debug!("  → {} result(s)", results.len());
        Ok(results)
    }
}

#[async_trait::async_trait]
impl CatalogClient for DiscogsClient {
    async fn resolve_artist_id(&self, name: &str) -> Result<u64, DiscogsError> {
        info!("📡 Discogs API: search q='{}', type=artist", name);

        let results: Vec<ArtistSearchResult> =
            self.search(&[("q", name), ("type", "artist")]).await?;

        match results.first() {
            Some(first) => {
                if results.len() > 1 {
                    debug!(
                        "{} artists matched '{}', using the first ({})",
                        results.len(),
                        name,
                        first.id
                    );
                }
                Ok(first.id)
            }
            None => Err(DiscogsError::NotFound(format!("artist {}", name))),
        }
    }

    async fn fetch_artist_details(&self, discogs_id: u64) -> Result<ArtistDetails, DiscogsError> {
        info!("📡 Discogs API: GET /artists/{}", discogs_id);

        self.get_json::<ArtistDetails>(&format!("/artists/{}", discogs_id), &[])
            .await?
            .ok_or_else(|| DiscogsError::NotFound(format!("artist details for {}", discogs_id)))
    }

    async fn fetch_artist_masters(&self, name: &str) -> Result<Vec<MasterDetails>, DiscogsError> {
        info!("📡 Discogs API: search artist='{}', type=master", name);
        self.search(&[("artist", name), ("type", "master")]).await
    }

    async fn fetch_artist_releases(
        &self,
        name: &str,
    ) -> Result<Vec<ReleaseDetails>, DiscogsError> {
        info!("📡 Discogs API: search artist='{}', type=release", name);
        self.search(&[("artist", name), ("type", "release")]).await
    }
}

pub fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discogs_client_creation() {
        let client = DiscogsClient::new("test_key".to_string());
        assert_eq!(client.token, "test_key");
        assert_eq!(client.base_url(), "https://api.discogs.com");
        assert!(client.user_agent.starts_with("discogs-compare/"));
    }

    #[test]
    fn test_base_url_trailing_slash_is_dropped() {
        let client =
            DiscogsClient::with_base_url("k".to_string(), "http://localhost:9000/".to_string());
        assert_eq!(client.base_url(), "http://localhost:9000");
    }

    #[test]
    fn test_transport_errors_become_upstream() {
        let err = DiscogsError::Upstream("connection refused".to_string());
        assert_eq!(
            err.to_string(),
            "Discogs request failed: connection refused"
        );
    }
}
