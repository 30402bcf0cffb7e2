#![allow(dead_code)]

pub mod mock_catalog;

pub use mock_catalog::{master, release, MockCatalogClient, ScriptedStore};

use discogs_compare::db::Database;
use tempfile::TempDir;

/// Initialize tracing for tests with proper test output handling
pub fn tracing_init() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Fresh SQLite library in a temp dir. Keep the `TempDir` alive for the
/// duration of the test.
pub async fn setup_database() -> (Database, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("library.db");
    let database = Database::new(db_path.to_str().unwrap())
        .await
        .expect("Failed to create database");
    (database, temp_dir)
}
