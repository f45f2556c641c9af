use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use time::OffsetDateTime;
use tracing::info;

use crate::{
    clock,
    messages::{store, MessageDraft, ARRIVAL_TEXT, DEPARTURE_TEXT},
    validate::Registration,
    AppError, AppResult,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub name: String,
    /// Unix milliseconds of the last heartbeat (or of registration).
    pub last_seen: i64,
}

/// Who is currently in the room.
#[derive(Clone)]
pub struct Participants {
    db_pool: SqlitePool,
}

impl Participants {
    pub fn new(db_pool: SqlitePool) -> Self {
        Participants { db_pool }
    }

    pub async fn list(&self) -> AppResult<Vec<Participant>> {
        let participants = sqlx::query_as("SELECT name,last_seen FROM participants ORDER BY name")
            .fetch_all(&self.db_pool)
            .await?;
        Ok(participants)
    }

    pub async fn exists(&self, name: &str) -> AppResult<bool> {
        let found: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM participants WHERE name=?")
            .bind(name)
            .fetch_optional(&self.db_pool)
            .await?;
        Ok(found.is_some())
    }

    /// Adds `name` to the room and announces the arrival. Both writes commit
    /// together.
    pub async fn register(&self, Registration { name }: Registration) -> AppResult<Participant> {
        let now = clock::now();
        let last_seen = clock::unix_millis(now);

        let mut tx = self.db_pool.begin().await?;
        let inserted = sqlx::query("INSERT INTO participants (name,last_seen) VALUES (?,?) ON CONFLICT(name) DO NOTHING")
            .bind(&name)
            .bind(last_seen)
            .execute(&mut *tx)
            .await?;
        if inserted.rows_affected() == 0 {
            return Err(AppError::Conflict(format!("participant {name}")));
        }

        store::insert(&mut tx, MessageDraft::status(&name, ARRIVAL_TEXT), now).await?;
        tx.commit().await?;

        info!(participant = %name, "joined the room");
        Ok(Participant { name, last_seen })
    }

    pub async fn heartbeat(&self, name: &str) -> AppResult<()> {
        self.heartbeat_at(name, clock::now()).await
    }

    pub async fn heartbeat_at(&self, name: &str, at: OffsetDateTime) -> AppResult<()> {
        let updated = sqlx::query("UPDATE participants SET last_seen=? WHERE name=?")
            .bind(clock::unix_millis(at))
            .bind(name)
            .execute(&self.db_pool)
            .await?;
        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("participant {name}")));
        }
        Ok(())
    }

    /// Plain conditional delete that announces nothing; the sweeper uses
    /// [`Participants::evict`], which also checks staleness and records the
    /// departure. Returns whether this call was the one that removed `name`.
    pub async fn remove(&self, name: &str) -> AppResult<bool> {
        let deleted = sqlx::query("DELETE FROM participants WHERE name=?")
            .bind(name)
            .execute(&self.db_pool)
            .await?;
        Ok(deleted.rows_affected() == 1)
    }

    /// Removes `name` only if it has not been seen since `cutoff`, and records
    /// the departure in the same transaction. `false` means someone else got
    /// there first or a heartbeat arrived in between; nothing is written then.
    pub async fn evict(&self, name: &str, cutoff: OffsetDateTime) -> AppResult<bool> {
        let mut tx = self.db_pool.begin().await?;
        let deleted = sqlx::query("DELETE FROM participants WHERE name=? AND last_seen<=?")
            .bind(name)
            .bind(clock::unix_millis(cutoff))
            .execute(&mut *tx)
            .await?;
        if deleted.rows_affected() == 0 {
            return Ok(false);
        }

        store::insert(&mut tx, MessageDraft::status(name, DEPARTURE_TEXT), clock::now()).await?;
        tx.commit().await?;
        Ok(true)
    }
}
