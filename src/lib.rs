// Library exports for the binary and integration tests

pub mod compare;
pub mod config;
pub mod db;
pub mod discogs;
pub mod error;
pub mod ingest;
pub mod library;
pub mod repository;

pub use compare::{ArtistComparison, ComparisonService};
pub use error::{CatalogError, ErrorKind};
pub use ingest::SearchService;
pub use library::LibraryManager;
