use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Database models for the local Discogs snapshot
///
/// An artist owns its aliases, masters and releases. Children are written
/// after the artist and removed with it (`ON DELETE CASCADE`).
///
/// Discogs identifiers are kept alongside the local surrogate key; lookups
/// and deletions from callers go through the natural keys (artist name,
/// master title, release title).
///
/// Artist metadata
///
/// `name` is unique across the library and is the key the ingestion
/// workflow deduplicates on. Every optional upstream field is stored as an
/// empty string rather than NULL.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DbArtist {
    pub id: String,
    /// Artist ID from Discogs
    pub discogs_id: i64,
    pub name: String,
    pub realname: String,
    pub profile: String,
    pub resource_url: String,
    pub uri: String,
    pub releases_url: String,
    /// Spellings Discogs has seen for this artist, in upstream order
    pub name_variations: Vec<String>,
    /// Owned aliases, written in the same transaction as the artist
    pub aliases: Vec<DbAlias>,
    pub created_at: DateTime<Utc>,
}

impl DbArtist {
    pub fn new(discogs_id: i64, name: impl Into<String>) -> Self {
        DbArtist {
            id: Uuid::new_v4().to_string(),
            discogs_id,
            name: name.into(),
            realname: String::new(),
            profile: String::new(),
            resource_url: String::new(),
            uri: String::new(),
            releases_url: String::new(),
            name_variations: Vec::new(),
            aliases: Vec::new(),
            created_at: Utc::now(),
        }
    }
}

/// Alternative identity of an artist (e.g. a side project name)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DbAlias {
    pub id: String,
    pub artist_id: String,
    pub discogs_id: i64,
    pub name: String,
    pub resource_url: String,
}

/// Discogs master (the abstract album) credited to an artist
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DbMaster {
    pub id: String,
    pub artist_id: String,
    pub discogs_id: i64,
    pub title: String,
    pub country: String,
    /// Free text as delivered by Discogs, may be empty
    pub year: String,
    pub format: Vec<String>,
    pub label: Vec<String>,
    pub genre: Vec<String>,
    pub style: Vec<String>,
    pub thumb: String,
    pub cover_image: String,
    pub resource_url: String,
    pub created_at: DateTime<Utc>,
}

/// Discogs release (a specific pressing) credited to an artist
///
/// `master_id` is the Discogs master ID this release belongs to, not a
/// local foreign key. Zero when Discogs reports none.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DbRelease {
    pub id: String,
    pub artist_id: String,
    pub discogs_id: i64,
    pub title: String,
    pub country: String,
    pub year: String,
    pub format: Vec<String>,
    pub label: Vec<String>,
    pub genre: Vec<String>,
    pub style: Vec<String>,
    pub thumb: String,
    pub cover_image: String,
    pub resource_url: String,
    pub master_id: i64,
    pub created_at: DateTime<Utc>,
}
