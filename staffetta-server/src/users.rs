use sha2::{Digest, Sha256};
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use staffetta_core::{new_session_token, now_timestamp, User};
use std::collections::HashMap;

use crate::error::{AppError, AppResult};

const MAX_NAME_CHARS: usize = 255;

/// Directory utenti: lookup (id, name), elenco, registrazione e login.
#[derive(Clone)]
pub struct UserDirectory {
    pool: SqlitePool,
}

// hash semplice della password
fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn user_from_row(row: &sqlx::sqlite::SqliteRow) -> AppResult<User> {
    Ok(User { id: row.try_get("id")?, name: row.try_get("name")? })
}

impl UserDirectory {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Crea un utente e gli assegna subito un token di sessione.
    pub async fn register(&self, name: &str, password: &str) -> AppResult<(User, String)> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::validation("name", "required"));
        }
        if name.chars().count() > MAX_NAME_CHARS {
            return Err(AppError::validation("name", format!("must be at most {MAX_NAME_CHARS} characters")));
        }
        if password.trim().is_empty() {
            return Err(AppError::validation("password", "required"));
        }

        // controllo se il nome esiste già
        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE name = ?")
            .bind(name)
            .fetch_one(&self.pool)
            .await?;
        if existing > 0 {
            return Err(AppError::Conflict("name already exists".to_string()));
        }

        let token = new_session_token();
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO users (name, password_hash, token, created_at) VALUES (?, ?, ?, ?) RETURNING id",
        )
        .bind(name)
        .bind(hash_password(password))
        .bind(&token)
        .bind(now_timestamp())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // due registrazioni concorrenti con lo stesso nome
            if e.as_database_error().is_some_and(|db| db.is_unique_violation()) {
                AppError::Conflict("name already exists".to_string())
            } else {
                AppError::Database(e)
            }
        })?;

        tracing::info!(user_id = id, "user registered");
        Ok((User { id, name: name.to_string() }, token))
    }

    /// Verifica le credenziali e ruota il token di sessione.
    pub async fn login(&self, name: &str, password: &str) -> AppResult<(User, String)> {
        let row = sqlx::query("SELECT id, name, password_hash FROM users WHERE name = ?")
            .bind(name.trim())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound("user"))?;

        let stored_hash: String = row.try_get("password_hash")?;
        if hash_password(password) != stored_hash {
            tracing::warn!(name = name.trim(), "login rejected");
            return Err(AppError::Unauthorized);
        }
        let user = user_from_row(&row)?;

        let token = new_session_token();
        sqlx::query("UPDATE users SET token = ? WHERE id = ?")
            .bind(&token)
            .bind(user.id)
            .execute(&self.pool)
            .await?;

        Ok((user, token))
    }

    pub async fn find_by_token(&self, token: &str) -> AppResult<Option<User>> {
        let row = sqlx::query("SELECT id, name FROM users WHERE token = ?")
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    /// Tutti gli utenti tranne `caller_id`, ordinati per nome.
    pub async fn list_except(&self, caller_id: i64) -> AppResult<Vec<User>> {
        let rows = sqlx::query("SELECT id, name FROM users WHERE id != ? ORDER BY name COLLATE NOCASE, id")
            .bind(caller_id)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(user_from_row).collect()
    }

    /// Lookup in blocco delle identità di visualizzazione; gli id sconosciuti mancano dalla mappa.
    pub async fn display_identities(&self, ids: &[i64]) -> AppResult<HashMap<i64, User>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT id, name FROM users WHERE id IN (");
        let mut separated = qb.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        let rows = qb.build().fetch_all(&self.pool).await?;
        rows.iter()
            .map(|row| user_from_row(row).map(|u| (u.id, u)))
            .collect()
    }
}
