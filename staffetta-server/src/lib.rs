use anyhow::Context;
use axum::http::StatusCode;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

pub mod auth;
pub mod config;
pub mod controllers;
pub mod error;
pub mod fetch;
pub mod ingest;
pub mod routes;
pub mod scope;
pub mod store;
pub mod users;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use store::MessageStore;
pub use users::UserDirectory;

/// Stato condiviso tra gli handler. Ogni componente tiene un clone (economico) del pool.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub messages: MessageStore,
    pub users: UserDirectory,
}

impl AppState {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            messages: MessageStore::new(pool.clone()),
            users: UserDirectory::new(pool.clone()),
            pool,
        }
    }
}

// Dato un percorso di file, restituisce un URL SQLite valido. Crea le directory genitrici se non esistono.
pub fn sqlite_url_for_path(p: &Path) -> anyhow::Result<String> {
    let abs = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()?.join(p)
    };
    if let Some(parent) = abs.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create parent dirs for {:?}", parent))?;
    }
    let s = abs.to_string_lossy().replace('\\', "/");
    Ok(format!("sqlite://{}", s))
}

/// Costruisce un URL SQLite a partire dal valore grezzo di DATABASE_URL.
/// "sqlite::memory:" viene passato così com'è.
pub fn build_sqlite_url(raw: &str) -> anyhow::Result<String> {
    if raw == "sqlite::memory:" {
        return Ok(raw.to_string());
    }
    // Rimuovi il prefisso "sqlite://" se presente, per ottenere il percorso del file.
    let path_part = raw
        .strip_prefix("sqlite://")
        .or_else(|| raw.strip_prefix("sqlite:"))
        .unwrap_or(raw);
    sqlite_url_for_path(&PathBuf::from(path_part))
}

/// Apre il pool: WAL per lettori concorrenti, foreign key attive su ogni connessione,
/// busy timeout perché gli scrittori concorrenti si mettano in coda invece di fallire.
pub async fn connect_pool(db_url: &str, max_connections: u32) -> anyhow::Result<SqlitePool> {
    let in_memory = db_url.contains(":memory:");
    let mut options = SqliteConnectOptions::from_str(db_url)
        .with_context(|| format!("parse sqlite url {}", db_url))?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));
    if !in_memory {
        options = options.journal_mode(SqliteJournalMode::Wal);
    }
    // Ogni connessione a ":memory:" vedrebbe un database diverso.
    let max_connections = if in_memory { 1 } else { max_connections.max(1) };

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
        .with_context(|| format!("connect to sqlite via {}", db_url))?;
    Ok(pool)
}

// Esegue le migrazioni del database. Crea tabelle e indici se non esistono.
pub async fn run_migrations(pool: &SqlitePool) -> anyhow::Result<()> {
    let stmts = [
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            name          TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            token         TEXT UNIQUE,
            created_at    TEXT NOT NULL
        );"#,
        // AUTOINCREMENT: gli id non vengono mai riutilizzati, nemmeno dopo un riavvio.
        r#"
        CREATE TABLE IF NOT EXISTS messages (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            sender_id   INTEGER NOT NULL,
            receiver_id INTEGER,
            body        TEXT NOT NULL,
            created_at  TEXT NOT NULL,
            FOREIGN KEY(sender_id)   REFERENCES users(id),
            FOREIGN KEY(receiver_id) REFERENCES users(id)
        );"#,
        r#"
        CREATE INDEX IF NOT EXISTS idx_messages_receiver
            ON messages (receiver_id, id);"#,
        r#"
        CREATE INDEX IF NOT EXISTS idx_messages_pair
            ON messages (sender_id, receiver_id, id);"#,
    ];
    // applica ogni statement di migrazione
    for s in &stmts {
        sqlx::query(s)
            .execute(pool)
            .await
            .with_context(|| format!("apply migration: {}", s.trim().lines().next().unwrap_or_default()))?;
    }
    Ok(())
}

/// Controlla lo stato di salute del database tentando di acquisire una connessione dal pool.
pub async fn health_with_pool(pool: &SqlitePool) -> StatusCode {
    match pool.acquire().await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
