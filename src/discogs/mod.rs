pub mod client;
pub mod models;

pub use client::{CatalogClient, DiscogsClient, DiscogsError};
pub use models::{
    AliasDetails, ArtistDetails, ArtistSearchResult, MasterDetails, Pagination, ReleaseDetails,
    SearchEnvelope,
};
