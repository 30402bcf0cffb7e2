use serde::{Deserialize, Deserializer, Serialize};

/// Pagination block attached to every Discogs search envelope.
///
/// Only the first page is ever requested, so this is informational.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Pagination {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub pages: u32,
    #[serde(default)]
    pub per_page: u32,
    #[serde(default)]
    pub items: u32,
}

/// Discogs search response wrapper (`{results: [...], pagination}`)
///
/// Both fields may be absent; an absent `results` is treated the same as an
/// empty one.
#[derive(Debug, Deserialize)]
pub struct SearchEnvelope<T> {
    pub results: Option<Vec<T>>,
    pub pagination: Option<Pagination>,
}

impl<T> SearchEnvelope<T> {
    pub fn into_results(self) -> Vec<T> {
        self.results.unwrap_or_default()
    }
}

/// Individual result of a `type=artist` search
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ArtistSearchResult {
    pub id: u64,
    pub title: Option<String>,
}

/// Alias entry embedded in an artist detail response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AliasDetails {
    pub id: u64,
    pub name: Option<String>,
    pub resource_url: Option<String>,
}

/// Artist detail response from `/artists/{id}`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ArtistDetails {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub realname: Option<String>,
    pub profile: Option<String>,
    pub resource_url: Option<String>,
    pub uri: Option<String>,
    pub releases_url: Option<String>,
    pub namevariations: Option<Vec<String>>,
    pub aliases: Option<Vec<AliasDetails>>,
}

/// Master as returned by a `type=master` search
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MasterDetails {
    pub id: Option<u64>,
    pub title: Option<String>,
    pub country: Option<String>,
    #[serde(default, deserialize_with = "year_string")]
    pub year: Option<String>,
    pub format: Option<Vec<String>>,
    pub label: Option<Vec<String>>,
    pub genre: Option<Vec<String>>,
    pub style: Option<Vec<String>>,
    pub thumb: Option<String>,
    pub cover_image: Option<String>,
    pub resource_url: Option<String>,
}

/// Release as returned by a `type=release` search
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReleaseDetails {
    pub id: Option<u64>,
    pub title: Option<String>,
    pub country: Option<String>,
    #[serde(default, deserialize_with = "year_string")]
    pub year: Option<String>,
    pub format: Option<Vec<String>>,
    pub label: Option<Vec<String>>,
    pub genre: Option<Vec<String>>,
    pub style: Option<Vec<String>>,
    pub thumb: Option<String>,
    pub cover_image: Option<String>,
    pub resource_url: Option<String>,
    pub master_id: Option<u64>,
}

/// Search results carry `year` as a string, detail endpoints as a number.
/// Accept both and keep the textual form.
fn year_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawYear {
        Text(String),
        Number(i64),
    }

    Ok(
        Option::<RawYear>::deserialize(deserializer)?.map(|raw| match raw {
            RawYear::Text(s) => s,
            RawYear::Number(n) => n.to_string(),
        }),
    )
}
