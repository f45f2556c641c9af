use std::{str::FromStr, time::Duration};

use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    SqlitePool,
};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const CREATE_PARTICIPANTS: &str = "CREATE TABLE IF NOT EXISTS participants (
    name TEXT PRIMARY KEY NOT NULL,
    last_seen INTEGER NOT NULL
)";

// seq is the only ordering key of the log
const CREATE_MESSAGES: &str = "CREATE TABLE IF NOT EXISTS messages (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    sender TEXT NOT NULL,
    recipient TEXT NOT NULL,
    text TEXT NOT NULL,
    kind TEXT NOT NULL,
    time TEXT NOT NULL,
    created_at INTEGER NOT NULL
)";

pub async fn connect(url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(url)?
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT);
    let db_pool = SqlitePoolOptions::new()
        .max_connections(16)
        .connect_with(options)
        .await?;
    create_schema(&db_pool).await?;
    Ok(db_pool)
}

/// A private in-memory store. Every SQLite in-memory connection is its own
/// database, so the pool is pinned to one connection that never expires.
pub async fn open_in_memory() -> Result<SqlitePool, sqlx::Error> {
    let db_pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None::<Duration>)
        .max_lifetime(None::<Duration>)
        .connect("sqlite::memory:")
        .await?;
    create_schema(&db_pool).await?;
    Ok(db_pool)
}

/// A file-backed store in a throwaway directory, pooled like production.
/// The directory is removed when the returned guard drops.
#[cfg(test)]
pub(crate) async fn open_temp_file() -> (tempfile::TempDir, SqlitePool) {
    let dir = tempfile::tempdir().expect("temp dir");
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("chat.db").display());
    let db_pool = connect(&url).await.expect("file store");
    (dir, db_pool)
}

async fn create_schema(db_pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(CREATE_PARTICIPANTS).execute(db_pool).await?;
    sqlx::query(CREATE_MESSAGES).execute(db_pool).await?;
    Ok(())
}
