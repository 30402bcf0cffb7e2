use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use tracing::{debug, info};

use crate::db::models::*;
use crate::repository::{ArtistRepository, MasterRepository, ReleaseRepository, RepositoryError};

#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Initialize database connection and create tables
    pub async fn new(database_path: &str) -> Result<Self, sqlx::Error> {
        // Use sqlite:// with ?mode=rwc to create if it doesn't exist
        let database_url = format!("sqlite://{}?mode=rwc", database_path);
        info!("Connecting to {}", database_url);

        // Cascading deletes of aliases/masters/releases depend on this
        let options = SqliteConnectOptions::from_str(&database_url)?.foreign_keys(true);
        let pool = SqlitePool::connect_with(options).await?;

        let db = Database { pool };
        db.create_tables().await?;
        Ok(db)
    }

    /// Create all necessary tables
    async fn create_tables(&self) -> Result<(), sqlx::Error> {
        // Artists table (name is the natural key)
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS artists (
                id TEXT PRIMARY KEY,
                discogs_id INTEGER NOT NULL,
                name TEXT NOT NULL UNIQUE,
                realname TEXT NOT NULL,
                profile TEXT NOT NULL,
                resource_url TEXT NOT NULL,
                uri TEXT NOT NULL,
                releases_url TEXT NOT NULL,
                name_variations TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS aliases (
                id TEXT PRIMARY KEY,
                artist_id TEXT NOT NULL,
                discogs_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                resource_url TEXT NOT NULL,
                position INTEGER NOT NULL,
                FOREIGN KEY (artist_id) REFERENCES artists (id) ON DELETE CASCADE
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // List columns (format, label, genre, style) hold JSON arrays
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS masters (
                id TEXT PRIMARY KEY,
                artist_id TEXT NOT NULL,
                discogs_id INTEGER NOT NULL,
                title TEXT NOT NULL,
                country TEXT NOT NULL,
                year TEXT NOT NULL,
                format TEXT NOT NULL,
                label TEXT NOT NULL,
                genre TEXT NOT NULL,
                style TEXT NOT NULL,
                thumb TEXT NOT NULL,
                cover_image TEXT NOT NULL,
                resource_url TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY (artist_id) REFERENCES artists (id) ON DELETE CASCADE
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS releases (
                id TEXT PRIMARY KEY,
                artist_id TEXT NOT NULL,
                discogs_id INTEGER NOT NULL,
                title TEXT NOT NULL,
                country TEXT NOT NULL,
                year TEXT NOT NULL,
                format TEXT NOT NULL,
                label TEXT NOT NULL,
                genre TEXT NOT NULL,
                style TEXT NOT NULL,
                thumb TEXT NOT NULL,
                cover_image TEXT NOT NULL,
                resource_url TEXT NOT NULL,
                master_id INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY (artist_id) REFERENCES artists (id) ON DELETE CASCADE
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // Create indexes for performance
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_aliases_artist_id ON aliases (artist_id)")
            .execute(&self.pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_masters_artist_id ON masters (artist_id)")
            .execute(&self.pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_masters_title ON masters (title)")
            .execute(&self.pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_releases_artist_id ON releases (artist_id)")
            .execute(&self.pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_releases_title ON releases (title)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn get_aliases_for_artist(&self, artist_id: &str) -> Result<Vec<DbAlias>, sqlx::Error> {
        let rows = sqlx::query("SELECT * FROM aliases WHERE artist_id = ? ORDER BY position")
            .bind(artist_id)
            .fetch_all(&self.pool)
            .await?;

        let mut aliases = Vec::new();
        for row in rows {
            aliases.push(DbAlias {
                id: row.try_get("id")?,
                artist_id: row.try_get("artist_id")?,
                discogs_id: row.try_get("discogs_id")?,
                name: row.try_get("name")?,
                resource_url: row.try_get("resource_url")?,
            });
        }

        Ok(aliases)
    }

    async fn with_aliases(&self, mut artist: DbArtist) -> Result<DbArtist, RepositoryError> {
        artist.aliases = self.get_aliases_for_artist(&artist.id).await?;
        Ok(artist)
    }
}

#[async_trait::async_trait]
impl ArtistRepository for Database {
    async fn artist_exists(&self, name: &str) -> Result<bool, RepositoryError> {
        let found: i64 = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM artists WHERE name = ?)")
            .bind(name)
            .fetch_one(&self.pool)
            .await?;
        Ok(found != 0)
    }

    async fn find_artist(&self, name: &str) -> Result<Option<DbArtist>, RepositoryError> {
        let artist = sqlx::query("SELECT * FROM artists WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(artist_from_row)
            .transpose()?;

        match artist {
            Some(artist) => Ok(Some(self.with_aliases(artist).await?)),
            None => Ok(None),
        }
    }

    async fn find_artists(&self) -> Result<Vec<DbArtist>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM artists ORDER BY rowid")
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(artist_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        let mut artists = Vec::new();
        for artist in rows {
            artists.push(self.with_aliases(artist).await?);
        }

        Ok(artists)
    }

    async fn save_artist(&self, artist: &DbArtist) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO artists (
                id, discogs_id, name, realname, profile, resource_url,
                uri, releases_url, name_variations, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&artist.id)
        .bind(artist.discogs_id)
        .bind(&artist.name)
        .bind(&artist.realname)
        .bind(&artist.profile)
        .bind(&artist.resource_url)
        .bind(&artist.uri)
        .bind(&artist.releases_url)
        .bind(encode_list(&artist.name_variations)?)
        .bind(artist.created_at.to_rfc3339())
        .execute(&mut *tx)
        .await
        .map_err(|e| conflict_or_database(e, format!("artist {}", artist.name)))?;

        for (position, alias) in artist.aliases.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO aliases (id, artist_id, discogs_id, name, resource_url, position)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&alias.id)
            .bind(&artist.id)
            .bind(alias.discogs_id)
            .bind(&alias.name)
            .bind(&alias.resource_url)
            .bind(position as i64)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        debug!(
            "Saved artist {} with {} alias(es)",
            artist.name,
            artist.aliases.len()
        );
        Ok(())
    }

    async fn delete_artist(&self, name: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM artists WHERE name = ?")
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait::async_trait]
impl MasterRepository for Database {
    async fn master_exists(&self, title: &str) -> Result<bool, RepositoryError> {
        let found: i64 = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM masters WHERE title = ?)")
            .bind(title)
            .fetch_one(&self.pool)
            .await?;
        Ok(found != 0)
    }

    async fn find_master(&self, title: &str) -> Result<Option<DbMaster>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM masters WHERE title = ? ORDER BY rowid LIMIT 1")
            .bind(title)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(master_from_row).transpose()
    }

    async fn find_masters(&self) -> Result<Vec<DbMaster>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM masters ORDER BY rowid")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(master_from_row).collect()
    }

    async fn save_master(&self, master: &DbMaster) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO masters (
                id, artist_id, discogs_id, title, country, year, format, label,
                genre, style, thumb, cover_image, resource_url, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&master.id)
        .bind(&master.artist_id)
        .bind(master.discogs_id)
        .bind(&master.title)
        .bind(&master.country)
        .bind(&master.year)
        .bind(encode_list(&master.format)?)
        .bind(encode_list(&master.label)?)
        .bind(encode_list(&master.genre)?)
        .bind(encode_list(&master.style)?)
        .bind(&master.thumb)
        .bind(&master.cover_image)
        .bind(&master.resource_url)
        .bind(master.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_master(&self, title: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM masters WHERE title = ?")
            .bind(title)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait::async_trait]
impl ReleaseRepository for Database {
    async fn release_exists(&self, title: &str) -> Result<bool, RepositoryError> {
        let found: i64 =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM releases WHERE title = ?)")
                .bind(title)
                .fetch_one(&self.pool)
                .await?;
        Ok(found != 0)
    }

    async fn find_release(&self, title: &str) -> Result<Option<DbRelease>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM releases WHERE title = ? ORDER BY rowid LIMIT 1")
            .bind(title)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(release_from_row).transpose()
    }

    async fn find_releases(&self) -> Result<Vec<DbRelease>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM releases ORDER BY rowid")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(release_from_row).collect()
    }

    async fn find_releases_by_artist(
        &self,
        artist_id: &str,
    ) -> Result<Vec<DbRelease>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM releases WHERE artist_id = ? ORDER BY rowid")
            .bind(artist_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(release_from_row).collect()
    }

    async fn save_release(&self, release: &DbRelease) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO releases (
                id, artist_id, discogs_id, title, country, year, format, label,
                genre, style, thumb, cover_image, resource_url, master_id, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&release.id)
        .bind(&release.artist_id)
        .bind(release.discogs_id)
        .bind(&release.title)
        .bind(&release.country)
        .bind(&release.year)
        .bind(encode_list(&release.format)?)
        .bind(encode_list(&release.label)?)
        .bind(encode_list(&release.genre)?)
        .bind(encode_list(&release.style)?)
        .bind(&release.thumb)
        .bind(&release.cover_image)
        .bind(&release.resource_url)
        .bind(release.master_id)
        .bind(release.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_release(&self, title: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM releases WHERE title = ?")
            .bind(title)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn conflict_or_database(e: sqlx::Error, what: String) -> RepositoryError {
    match &e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            RepositoryError::Conflict(format!("{} already exists", what))
        }
        _ => RepositoryError::Database(e),
    }
}

fn encode_list(list: &[String]) -> Result<String, RepositoryError> {
    serde_json::to_string(list).map_err(|e| RepositoryError::Corrupt(e.to_string()))
}

fn decode_list(row: &SqliteRow, column: &str) -> Result<Vec<String>, RepositoryError> {
    let raw: String = row.try_get(column)?;
    serde_json::from_str(&raw)
        .map_err(|e| RepositoryError::Corrupt(format!("column {}: {}", column, e)))
}

fn decode_timestamp(row: &SqliteRow) -> Result<DateTime<Utc>, RepositoryError> {
    let raw: String = row.try_get("created_at")?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Corrupt(format!("created_at {}: {}", raw, e)))
}

fn artist_from_row(row: &SqliteRow) -> Result<DbArtist, RepositoryError> {
    Ok(DbArtist {
        id: row.try_get("id")?,
        discogs_id: row.try_get("discogs_id")?,
        name: row.try_get("name")?,
        realname: row.try_get("realname")?,
        profile: row.try_get("profile")?,
        resource_url: row.try_get("resource_url")?,
        uri: row.try_get("uri")?,
        releases_url: row.try_get("releases_url")?,
        name_variations: decode_list(row, "name_variations")?,
        aliases: Vec::new(),
        created_at: decode_timestamp(row)?,
    })
}

fn master_from_row(row: &SqliteRow) -> Result<DbMaster, RepositoryError> {
    Ok(DbMaster {
        id: row.try_get("id")?,
        artist_id: row.try_get("artist_id")?,
        discogs_id: row.try_get("discogs_id")?,
        title: row.try_get("title")?,
        country: row.try_get("country")?,
        year: row.try_get("year")?,
        format: decode_list(row, "format")?,
        label: decode_list(row, "label")?,
        genre: decode_list(row, "genre")?,
        style: decode_list(row, "style")?,
        thumb: row.try_get("thumb")?,
        cover_image: row.try_get("cover_image")?,
        resource_url: row.try_get("resource_url")?,
        created_at: decode_timestamp(row)?,
    })
}

fn release_from_row(row: &SqliteRow) -> Result<DbRelease, RepositoryError> {
    Ok(DbRelease {
        id: row.try_get("id")?,
        artist_id: row.try_get("artist_id")?,
        discogs_id: row.try_get("discogs_id")?,
        title: row.try_get("title")?,
        country: row.try_get("country")?,
        year: row.try_get("year")?,
        format: decode_list(row, "format")?,
        label: decode_list(row, "label")?,
        genre: decode_list(row, "genre")?,
        style: decode_list(row, "style")?,
        thumb: row.try_get("thumb")?,
        cover_image: row.try_get("cover_image")?,
        resource_url: row.try_get("resource_url")?,
        master_id: row.try_get("master_id")?,
        created_at: decode_timestamp(row)?,
    })
}
