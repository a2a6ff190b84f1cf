use sqlx::{Row, SqlitePool};
use staffetta_core::{now_timestamp, Message, Scope, MAX_BODY_CHARS};

use crate::error::{AppError, AppResult};

/// Archivio append-only dei messaggi. Unico proprietario della sequenza degli id:
/// la colonna AUTOINCREMENT della tabella, serializzata dal lock di scrittura di SQLite.
#[derive(Clone)]
pub struct MessageStore {
    pool: SqlitePool,
}

/// Controlla il corpo già normalizzato: obbligatorio, al massimo MAX_BODY_CHARS caratteri.
fn validate_body(body: &str) -> AppResult<()> {
    let chars = body.chars().count();
    if chars == 0 || body.trim().is_empty() {
        return Err(AppError::validation("body", "required"));
    }
    if chars > MAX_BODY_CHARS {
        return Err(AppError::validation(
            "body",
            format!("must be at most {MAX_BODY_CHARS} characters"),
        ));
    }
    Ok(())
}

fn message_from_row(row: &sqlx::sqlite::SqliteRow) -> AppResult<Message> {
    Ok(Message {
        id: row.try_get("id")?,
        sender_id: row.try_get("sender_id")?,
        receiver_id: row.try_get("receiver_id")?,
        body: row.try_get("body")?,
        created_at: row.try_get("created_at")?,
    })
}

impl MessageStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Valida e inserisce un messaggio, restituendo il record con id e timestamp assegnati.
    ///
    /// Tutta la validazione precede l'INSERT, e l'INSERT è un singolo statement:
    /// una chiamata rifiutata non consuma id.
    pub async fn append(&self, sender_id: i64, receiver_id: Option<i64>, body: &str) -> AppResult<Message> {
        validate_body(body)?;
        if let Some(receiver) = receiver_id {
            let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE id = ?")
                .bind(receiver)
                .fetch_optional(&self.pool)
                .await?;
            if exists.is_none() {
                return Err(AppError::validation("receiverId", "unknown recipient"));
            }
        }

        let row = sqlx::query(
            "INSERT INTO messages (sender_id, receiver_id, body, created_at) VALUES (?, ?, ?, ?) \
             RETURNING id, sender_id, receiver_id, body, created_at",
        )
        .bind(sender_id)
        .bind(receiver_id)
        .bind(body)
        .bind(now_timestamp())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // il destinatario è già stato verificato: resta solo un mittente inesistente
            if e.as_database_error().is_some_and(|db| db.is_foreign_key_violation()) {
                AppError::Internal(format!("unknown sender {sender_id}"))
            } else {
                AppError::Database(e)
            }
        })?;

        message_from_row(&row)
    }

    /// Messaggi globali con `id > after_id`, in ordine crescente, al massimo `limit`.
    pub async fn query_global_after(&self, after_id: i64, limit: i64) -> AppResult<Vec<Message>> {
        let rows = sqlx::query(
            "SELECT id, sender_id, receiver_id, body, created_at FROM messages \
             WHERE receiver_id IS NULL AND id > ? ORDER BY id LIMIT ?",
        )
        .bind(after_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(message_from_row).collect()
    }

    /// Conversazione diretta tra `user_a` e `user_b` (in entrambe le direzioni) con `id > after_id`.
    pub async fn query_direct_after(
        &self,
        user_a: i64,
        user_b: i64,
        after_id: i64,
        limit: i64,
    ) -> AppResult<Vec<Message>> {
        let rows = sqlx::query(
            "SELECT id, sender_id, receiver_id, body, created_at FROM messages \
             WHERE ((sender_id = ? AND receiver_id = ?) OR (sender_id = ? AND receiver_id = ?)) \
             AND id > ? ORDER BY id LIMIT ?",
        )
        .bind(user_a)
        .bind(user_b)
        .bind(user_b)
        .bind(user_a)
        .bind(after_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(message_from_row).collect()
    }

    pub async fn query_after(&self, scope: Scope, after_id: i64, limit: i64) -> AppResult<Vec<Message>> {
        match scope {
            Scope::Global => self.query_global_after(after_id, limit).await,
            Scope::Direct(pair) => {
                let (a, b) = pair.members();
                self.query_direct_after(a, b, after_id, limit).await
            }
        }
    }
}
