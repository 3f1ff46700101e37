//! SQLite connection pool
//!
//! Every service operation checks out one connection and runs its whole
//! read-decide-mutate sequence inside a transaction on it, so the pool is
//! handed around as a plain `SqlitePool`.

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{Sqlite, Transaction};
use std::str::FromStr;
use std::time::Duration;

use crate::config::DatabaseConfig;

/// How long a writer waits on a locked database before giving up
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

fn is_memory_url(url: &str) -> bool {
    url == ":memory:" || url.starts_with("sqlite::memory:")
}

/// Normalise a configured path or URL into a `sqlite:` connection URL.
///
/// Bare file paths get `mode=rwc` so the file is created on first start.
fn connection_url(url: &str) -> String {
    if url == ":memory:" {
        "sqlite::memory:".to_string()
    } else if url.starts_with("sqlite:") {
        if url.contains('?') {
            url.to_string()
        } else {
            format!("{}?mode=rwc", url)
        }
    } else {
        format!("sqlite:{}?mode=rwc", url)
    }
}

/// Create parent directories for file-based databases
fn ensure_parent_dir(url: &str) -> Result<()> {
    if is_memory_url(url) {
        return Ok(());
    }

    let path = url.trim_start_matches("sqlite://").trim_start_matches("sqlite:");
    let path = path.split('?').next().unwrap_or(path);

    if let Some(parent) = std::path::Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create database directory: {:?}", parent))?;
        }
    }
    Ok(())
}

/// Create a SQLite connection pool from configuration.
///
/// Foreign keys are enabled on every connection; user deletion depends on
/// `ON DELETE CASCADE`.
pub async fn create_pool(config: &DatabaseConfig) -> Result<SqlitePool> {
    ensure_parent_dir(&config.url)?;

    let options = SqliteConnectOptions::from_str(&connection_url(&config.url))
        .with_context(|| format!("Invalid SQLite database URL: {}", config.url))?
        .foreign_keys(true)
        .busy_timeout(BUSY_TIMEOUT);

    // An in-memory database lives only as long as its connections; a single
    // connection keeps it alive and avoids shared-cache table locks.
    let max_connections = if is_memory_url(&config.url) {
        1
    } else {
        config.max_connections
    };

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
        .with_context(|| format!("Failed to connect to SQLite database: {}", config.url))?;

    Ok(pool)
}

/// Begin a transaction that holds the write lock from its first statement.
///
/// SQLite's plain `BEGIN` is deferred: a transaction that reads the session
/// and then writes has to upgrade its read snapshot, and that upgrade fails
/// with `SQLITE_BUSY` at once when another connection committed in between.
/// Writing first takes the lock before any snapshot exists, so the busy
/// timeout applies and concurrent writers queue up like `BEGIN IMMEDIATE`.
pub async fn begin_write(pool: &SqlitePool) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
    let mut tx = pool.begin().await?;
    sqlx::query("UPDATE _migrations SET name = name WHERE version < 0")
        .execute(&mut *tx)
        .await?;
    Ok(tx)
}

/// Create a SQLite pool on a fresh database file, for tests that need
/// several connections.
#[cfg(test)]
pub async fn create_file_test_pool(
    dir: &tempfile::TempDir,
    max_connections: u32,
) -> Result<SqlitePool> {
    let config = DatabaseConfig {
        url: dir.path().join("askly.db").to_string_lossy().to_string(),
        max_connections,
    };
    create_pool(&config).await
}

/// Create a SQLite in-memory database pool for testing
pub async fn create_test_pool() -> Result<SqlitePool> {
    let config = DatabaseConfig {
        url: ":memory:".to_string(),
        max_connections: 1,
    };
    create_pool(&config).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_url() {
        assert_eq!(connection_url(":memory:"), "sqlite::memory:");
        assert_eq!(connection_url("data/askly.db"), "sqlite:data/askly.db?mode=rwc");
        assert_eq!(connection_url("sqlite:x.db"), "sqlite:x.db?mode=rwc");
        assert_eq!(connection_url("sqlite:x.db?mode=ro"), "sqlite:x.db?mode=ro");
    }

    #[tokio::test]
    async fn test_create_test_pool() {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        let one: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&pool)
            .await
            .expect("Ping should succeed");
        assert_eq!(one, 1);
    }

    #[tokio::test]
    async fn test_foreign_keys_enabled() {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        let enabled: i64 = sqlx::query_scalar("PRAGMA foreign_keys")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(enabled, 1);
    }

    #[tokio::test]
    async fn test_begin_write_holds_lock() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let pool = create_file_test_pool(&dir, 2).await.expect("Failed to create pool");
        crate::db::migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let tx = begin_write(&pool).await.expect("Failed to begin");

        // A second connection cannot take the lock without waiting
        let mut other = pool.acquire().await.unwrap();
        sqlx::query("PRAGMA busy_timeout = 0")
            .execute(&mut *other)
            .await
            .unwrap();
        let err = begin_write_on(&mut other).await.unwrap_err();
        assert!(err.to_string().contains("locked"));

        tx.commit().await.unwrap();
        sqlx::query("PRAGMA busy_timeout = 5000")
            .execute(&mut *other)
            .await
            .unwrap();
        begin_write_on(&mut other).await.expect("Lock is free after commit");
    }

    async fn begin_write_on(conn: &mut sqlx::SqliteConnection) -> Result<(), sqlx::Error> {
        use sqlx::Connection;
        let mut tx = conn.begin().await?;
        sqlx::query("UPDATE _migrations SET name = name WHERE version < 0")
            .execute(&mut *tx)
            .await?;
        tx.rollback().await
    }

    #[tokio::test]
    async fn test_sqlite_nested_directory_creation() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("nested").join("dir").join("askly.db");

        let config = DatabaseConfig {
            url: db_path.to_string_lossy().to_string(),
            max_connections: 2,
        };

        let pool = create_pool(&config).await.expect("Failed to create pool");
        sqlx::query("SELECT 1").execute(&pool).await.expect("Ping should succeed");

        assert!(db_path.exists());
    }
}
