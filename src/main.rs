use std::env;
use std::path::Path;

use discogs_compare::config::{Config, ConfigError};
use discogs_compare::db::Database;
use discogs_compare::discogs::DiscogsClient;
use discogs_compare::{CatalogError, ComparisonService, LibraryManager, SearchService};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Could not open database: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Could not create database directory: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Catalog(#[from] CatalogError),
    #[error("Could not encode output: {0}")]
    Json(#[from] serde_json::Error),
}

#[tokio::main]
async fn main() {
    // Use RUST_LOG env var if set, otherwise default to info level
    let log_filter = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(log_filter)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let program = program_name(&args);

    let Some((command, rest)) = args.get(1..).and_then(|a| a.split_first()) else {
        print_usage(program);
        std::process::exit(1);
    };

    if let Err(e) = run(command, rest).await {
        error!("{}", e);
        if let CliError::Usage(_) = e {
            print_usage(program);
        }
        std::process::exit(1);
    }
}

async fn run(command: &str, rest: &[String]) -> Result<(), CliError> {
    let config = Config::load()?;
    let database = open_database(&config.database_path).await?;
    let library = LibraryManager::new(database.clone());

    match command {
        "search" => {
            let name = single_argument(command, rest)?;
            let service = SearchService::new(DiscogsClient::from_config(&config), database);
            service.search_and_save_artist(name).await?;
            println!("Saved '{}'", name);
        }
        "compare" => {
            let comparison = ComparisonService::new(database);
            print_json(&comparison.compare_artists(rest).await?)?;
        }
        "artists" => print_json(&library.list_artists().await?)?,
        "artist" => {
            let name = single_argument(command, rest)?;
            match library.get_artist(name).await? {
                Some(artist) => print_json(&artist)?,
                None => return Err(CatalogError::NotFound(format!("artist {}", name)).into()),
            }
        }
        "delete-artist" => {
            let name = single_argument(command, rest)?;
            library.delete_artist(name).await?;
            println!("Deleted '{}'", name);
        }
        "masters" => print_json(&library.list_masters().await?)?,
        "delete-master" => {
            let title = single_argument(command, rest)?;
            library.delete_master(title).await?;
            println!("Deleted master '{}'", title);
        }
        "releases" => print_json(&library.list_releases().await?)?,
        "delete-release" => {
            let title = single_argument(command, rest)?;
            library.delete_release(title).await?;
            println!("Deleted release '{}'", title);
        }
        other => return Err(CliError::Usage(format!("Unknown command: {}", other))),
    }

    Ok(())
}

async fn open_database(path: &Path) -> Result<Database, CliError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let path = path
        .to_str()
        .ok_or_else(|| CliError::Usage(format!("Non UTF-8 database path: {}", path.display())))?;
    Ok(Database::new(path).await?)
}

fn single_argument<'a>(command: &str, rest: &'a [String]) -> Result<&'a str, CliError> {
    match rest {
        [value] => Ok(value.as_str()),
        _ => Err(CliError::Usage(format!(
            "{} takes exactly one argument",
            command
        ))),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// argv[0], which a spawning process is free to leave out
fn program_name(args: &[String]) -> &str {
    args.first().map_or("discogs-compare", String::as_str)
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} <command> [arguments]", program);
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  search <name>           Fetch an artist from Discogs and store it");
    eprintln!("  compare <name>...       Compare stored artists");
    eprintln!("  artists                 List stored artists");
    eprintln!("  artist <name>           Show one stored artist");
    eprintln!("  delete-artist <name>    Delete an artist and everything it owns");
    eprintln!("  masters                 List stored masters");
    eprintln!("  delete-master <title>   Delete a master by title");
    eprintln!("  releases                List stored releases");
    eprintln!("  delete-release <title>  Delete a release by title");
    eprintln!();
    eprintln!("Configuration is read from the environment (or .env):");
    eprintln!("  DISCOGS_API_TOKEN       required");
    eprintln!("  DISCOGS_API_BASE_URL    default https://api.discogs.com");
    eprintln!("  DISCOGS_DATABASE_PATH   default ~/.discogs-compare/library.db");
}
