#![allow(dead_code)]

use anyhow::Result;
use staffetta_core::{MessageWithSender, SendMessageRequest, User};
use staffetta_server::{connect_pool, ingest, run_migrations, sqlite_url_for_path, AppState};
use tempfile::TempDir;

/// Database su file in una directory temporanea; la directory vive quanto il valore.
pub struct TestDb {
    pub dir: TempDir,
    pub url: String,
    pub state: AppState,
}

pub async fn setup() -> Result<TestDb> {
    let dir = TempDir::new()?;
    let url = sqlite_url_for_path(&dir.path().join("staffetta.db"))?;
    let pool = connect_pool(&url, 5).await?;
    run_migrations(&pool).await?;
    Ok(TestDb { dir, url, state: AppState::new(pool) })
}

pub async fn user(state: &AppState, name: &str) -> Result<User> {
    let (user, _token) = state.users.register(name, "secret").await?;
    Ok(user)
}

pub async fn send(state: &AppState, sender: &User, body: &str, receiver_id: Option<i64>) -> Result<MessageWithSender> {
    let req = SendMessageRequest { body: Some(body.to_string()), receiver_id };
    Ok(ingest::send(&state.messages, sender, req).await?)
}
