use anyhow::{Context, Result};
use std::env;
use std::net::SocketAddr;

/// Configurazione letta dalle variabili d'ambiente (con un eventuale file .env).
#[derive(Debug, Clone)]
pub struct Config {
    /// Valore grezzo di DATABASE_URL; vedi `build_sqlite_url`.
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub db_max_connections: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // .env è facoltativo (sviluppo)
        let _ = dotenvy::dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "staffetta.db".to_string()),
            bind_addr: env::var("BIND_ADDR")
                .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
                .parse()
                .context("BIND_ADDR must be a socket address")?,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .context("DB_MAX_CONNECTIONS must be a positive number")?,
        })
    }
}
