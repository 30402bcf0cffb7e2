use chrono::Utc;
use uuid::Uuid;

use crate::db::{DbAlias, DbArtist, DbMaster, DbRelease};
use crate::discogs::{ArtistDetails, MasterDetails, ReleaseDetails};

/// Convert Discogs artist details into an artist record ready for insertion.
///
/// Missing text fields become empty strings and missing lists become empty
/// lists. Aliases are linked to the new artist here, so the first write
/// already carries the association. Aliases without a name are dropped.
///
/// The stored name is the one Discogs reports, falling back to the name the
/// caller searched for when Discogs returns none.
pub fn map_artist(requested_name: &str, discogs_id: u64, details: ArtistDetails) -> DbArtist {
    let name = details
        .name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| requested_name.to_string());

    let mut artist = DbArtist::new(to_db_id(Some(discogs_id)), name);
    artist.realname = details.realname.unwrap_or_default();
    artist.profile = details.profile.unwrap_or_default();
    artist.resource_url = details.resource_url.unwrap_or_default();
    artist.uri = details.uri.unwrap_or_default();
    artist.releases_url = details.releases_url.unwrap_or_default();
    artist.name_variations = details.namevariations.unwrap_or_default();

    let artist_id = artist.id.clone();
    artist.aliases = details
        .aliases
        .unwrap_or_default()
        .into_iter()
        .filter_map(|alias| {
            let name = alias.name.filter(|n| !n.trim().is_empty())?;
            Some(DbAlias {
                id: Uuid::new_v4().to_string(),
                artist_id: artist_id.clone(),
                discogs_id: to_db_id(Some(alias.id)),
                name,
                resource_url: alias.resource_url.unwrap_or_default(),
            })
        })
        .collect();

    artist
}

/// Convert a master search result into a record owned by `artist_id`.
///
/// Returns `None` for results without a title, which cannot be stored.
pub fn map_master(artist_id: &str, details: MasterDetails) -> Option<DbMaster> {
    let title = details.title.filter(|t| !t.trim().is_empty())?;

    Some(DbMaster {
        id: Uuid::new_v4().to_string(),
        artist_id: artist_id.to_string(),
        discogs_id: to_db_id(details.id),
        title,
        country: details.country.unwrap_or_default(),
        year: details.year.unwrap_or_default(),
        format: details.format.unwrap_or_default(),
        label: details.label.unwrap_or_default(),
        genre: details.genre.unwrap_or_default(),
        style: details.style.unwrap_or_default(),
        thumb: details.thumb.unwrap_or_default(),
        cover_image: details.cover_image.unwrap_or_default(),
        resource_url: details.resource_url.unwrap_or_default(),
        created_at: Utc::now(),
    })
}

/// Convert a release search result into a record owned by `artist_id`.
///
/// Returns `None` for results without a title.
pub fn map_release(artist_id: &str, details: ReleaseDetails) -> Option<DbRelease> {
    let title = details.title.filter(|t| !t.trim().is_empty())?;

    Some(DbRelease {
        id: Uuid::new_v4().to_string(),
        artist_id: artist_id.to_string(),
        discogs_id: to_db_id(details.id),
        title,
        country: details.country.unwrap_or_default(),
        year: details.year.unwrap_or_default(),
        format: details.format.unwrap_or_default(),
        label: details.label.unwrap_or_default(),
        genre: details.genre.unwrap_or_default(),
        style: details.style.unwrap_or_default(),
        thumb: details.thumb.unwrap_or_default(),
        cover_image: details.cover_image.unwrap_or_default(),
        resource_url: details.resource_url.unwrap_or_default(),
        master_id: to_db_id(details.master_id),
        created_at: Utc::now(),
    })
}

/// Discogs IDs are unsigned; SQLite integers are signed. Missing (or
/// unrepresentable) IDs are stored as zero.
fn to_db_id(id: Option<u64>) -> i64 {
    id.and_then(|id| i64::try_from(id).ok()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discogs::AliasDetails;

    #[test]
    fn test_sparse_artist_gets_empty_defaults() {
        let artist = map_artist("Aphex Twin", 45, ArtistDetails::default());

        assert_eq!(artist.name, "Aphex Twin");
        assert_eq!(artist.discogs_id, 45);
        assert_eq!(artist.realname, "");
        assert_eq!(artist.profile, "");
        assert_eq!(artist.uri, "");
        assert!(artist.name_variations.is_empty());
        assert!(artist.aliases.is_empty());
    }

    #[test]
    fn test_artist_fields_and_aliases_are_carried_over() {
        let details = ArtistDetails {
            id: Some(45),
            name: Some("Aphex Twin".to_string()),
            realname: Some("Richard David James".to_string()),
            namevariations: Some(vec!["AFX".to_string(), "Aphex".to_string()]),
            aliases: Some(vec![
                AliasDetails {
                    id: 7,
                    name: Some("Polygon Window".to_string()),
                    resource_url: Some("https://api.discogs.com/artists/7".to_string()),
                },
                AliasDetails {
                    id: 8,
                    name: Some("  ".to_string()),
                    resource_url: None,
                },
                AliasDetails {
                    id: 9,
                    name: Some("Caustic Window".to_string()),
                    resource_url: None,
                },
            ]),
            ..Default::default()
        };

        let artist = map_artist("aphex twin", 45, details);

        assert_eq!(artist.name, "Aphex Twin");
        assert_eq!(artist.realname, "Richard David James");
        assert_eq!(artist.name_variations, vec!["AFX", "Aphex"]);

        let names: Vec<_> = artist.aliases.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Polygon Window", "Caustic Window"]);
        assert!(artist.aliases.iter().all(|a| a.artist_id == artist.id));
        assert_eq!(artist.aliases[1].resource_url, "");
    }

    #[test]
    fn test_release_defaults_and_master_reference() {
        let release = map_release(
            "artist-1",
            ReleaseDetails {
                title: Some("Selected Ambient Works 85-92".to_string()),
                genre: Some(vec!["Electronic".to_string()]),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(release.artist_id, "artist-1");
        assert_eq!(release.discogs_id, 0);
        assert_eq!(release.master_id, 0);
        assert_eq!(release.year, "");
        assert_eq!(release.genre, vec!["Electronic"]);
        assert!(release.style.is_empty());
        assert!(release.format.is_empty());
    }

    #[test]
    fn test_untitled_entries_are_skipped() {
        assert!(map_master("a", MasterDetails::default()).is_none());
        assert!(map_release(
            "a",
            ReleaseDetails {
                title: Some(String::new()),
                ..Default::default()
            }
        )
        .is_none());
    }

    #[test]
    fn test_master_keeps_upstream_year_text() {
        let master = map_master(
            "a",
            MasterDetails {
                id: Some(13814),
                title: Some("Drukqs".to_string()),
                year: Some("2001".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(master.discogs_id, 13814);
        assert_eq!(master.year, "2001");
    }
}
