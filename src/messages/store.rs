use sqlx::{SqliteConnection, SqlitePool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{clock, AppError, AppResult};

use super::{Message, MessageDraft, MessageKind};

#[derive(sqlx::FromRow)]
struct MessageRow {
    id: String,
    sender: String,
    recipient: String,
    text: String,
    kind: String,
    time: String,
}

impl TryFrom<MessageRow> for Message {
    type Error = sqlx::Error;

    fn try_from(row: MessageRow) -> Result<Self, Self::Error> {
        let kind = row.kind.parse::<MessageKind>().map_err(|err| sqlx::Error::Decode(err.into()))?;
        Ok(Message {
            id: row.id,
            from: row.sender,
            to: row.recipient,
            text: row.text,
            kind,
            time: row.time,
        })
    }
}

fn into_messages(rows: Vec<MessageRow>) -> AppResult<Vec<Message>> {
    let messages = rows
        .into_iter()
        .map(Message::try_from)
        .collect::<Result<Vec<_>, sqlx::Error>>()?;
    Ok(messages)
}

/// Writes one message on `conn`, which may be a transaction shared with a
/// registry change.
pub(crate) async fn insert(
    conn: &mut SqliteConnection,
    draft: MessageDraft,
    at: OffsetDateTime,
) -> AppResult<Message> {
    draft.check()?;

    let message = Message {
        id: Uuid::now_v7().to_string(),
        from: draft.from,
        to: draft.to,
        text: draft.text,
        kind: draft.kind,
        time: clock::label(at),
    };

    sqlx::query("INSERT INTO messages (id,sender,recipient,text,kind,time,created_at) VALUES (?,?,?,?,?,?,?)")
        .bind(&message.id)
        .bind(&message.from)
        .bind(&message.to)
        .bind(&message.text)
        .bind(message.kind.as_str())
        .bind(&message.time)
        .bind(clock::unix_millis(at))
        .execute(&mut *conn)
        .await?;

    Ok(message)
}

async fn find(conn: &mut SqliteConnection, id: &str) -> AppResult<Option<Message>> {
    let row: Option<MessageRow> =
        sqlx::query_as("SELECT id,sender,recipient,text,kind,time FROM messages WHERE id=?")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
    Ok(row.map(Message::try_from).transpose()?)
}

/// Only the author may touch a message, and nobody may touch a status notice.
fn ensure_owner(message: &Message, requester: Option<&str>) -> AppResult<()> {
    if requester != Some(message.from.as_str()) {
        return Err(AppError::Unauthorized(format!(
            "message {} belongs to {}",
            message.id, message.from
        )));
    }
    if message.kind == MessageKind::Status {
        return Err(AppError::Unauthorized(format!(
            "status message {} cannot be changed",
            message.id
        )));
    }
    Ok(())
}

/// The room's message log, ordered by insertion.
#[derive(Clone)]
pub struct Messages {
    db_pool: SqlitePool,
}

impl Messages {
    pub fn new(db_pool: SqlitePool) -> Self {
        Messages { db_pool }
    }

    pub async fn append(&self, draft: MessageDraft) -> AppResult<Message> {
        let mut conn = self.db_pool.acquire().await?;
        insert(&mut conn, draft, clock::now()).await
    }

    /// The raw log oldest-first; with a limit, only its `limit` most recent
    /// entries. No visibility rules are applied here.
    pub async fn list(&self, limit: Option<usize>) -> AppResult<Vec<Message>> {
        let rows: Vec<MessageRow> = match limit {
            None => {
                sqlx::query_as("SELECT id,sender,recipient,text,kind,time FROM messages ORDER BY seq")
                    .fetch_all(&self.db_pool)
                    .await?
            }
            Some(limit) => {
                sqlx::query_as(
                    "SELECT id,sender,recipient,text,kind,time FROM (
                        SELECT seq,id,sender,recipient,text,kind,time FROM messages ORDER BY seq DESC LIMIT ?
                    ) ORDER BY seq",
                )
                .bind(i64::try_from(limit).unwrap_or(i64::MAX))
                .fetch_all(&self.db_pool)
                .await?
            }
        };
        into_messages(rows)
    }

    pub async fn get(&self, id: &str) -> AppResult<Option<Message>> {
        let mut conn = self.db_pool.acquire().await?;
        find(&mut conn, id).await
    }

    /// Replaces `to`, `text` and `kind`. An edit that changes nothing counts
    /// as not found.
    pub async fn edit(&self, id: &str, requester: &str, patch: MessageDraft) -> AppResult<Message> {
        patch.check()?;

        let updated: Option<MessageRow> = sqlx::query_as(
            "UPDATE messages SET recipient=?, text=?, kind=?
             WHERE id=? AND sender=? AND kind<>'status'
             AND (recipient<>? OR text<>? OR kind<>?)
             RETURNING id,sender,recipient,text,kind,time",
        )
        .bind(&patch.to)
        .bind(&patch.text)
        .bind(patch.kind.as_str())
        .bind(id)
        .bind(requester)
        .bind(&patch.to)
        .bind(&patch.text)
        .bind(patch.kind.as_str())
        .fetch_optional(&self.db_pool)
        .await?;

        match updated {
            Some(row) => Ok(Message::try_from(row)?),
            None => {
                self.explain_miss(id, Some(requester)).await?;
                Err(AppError::NotFound(format!("change to message {id}")))
            }
        }
    }

    pub async fn delete(&self, id: &str, requester: Option<&str>) -> AppResult<()> {
        let deleted = sqlx::query("DELETE FROM messages WHERE id=? AND sender=? AND kind<>'status'")
            .bind(id)
            .bind(requester)
            .execute(&self.db_pool)
            .await?;

        if deleted.rows_affected() == 0 {
            self.explain_miss(id, requester).await?;
            return Err(AppError::NotFound(format!("message {id}")));
        }
        Ok(())
    }

    /// Classifies an owner-guarded write that matched no row. Runs after the
    /// write and outside any transaction.
    async fn explain_miss(&self, id: &str, requester: Option<&str>) -> AppResult<()> {
        let mut conn = self.db_pool.acquire().await?;
        match find(&mut conn, id).await? {
            Some(current) => ensure_owner(&current, requester),
            None => Err(AppError::NotFound(format!("message {id}"))),
        }
    }
}
