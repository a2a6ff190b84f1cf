use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use staffetta_core::Error as WireError;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// Input malformato, con il campo responsabile.
    #[error("{field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("Missing global=1 or user_id")]
    MissingScope,

    #[error("unauthorized")]
    Unauthorized,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        AppError::Validation { field, reason: reason.into() }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } | AppError::MissingScope => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Corpo della risposta. I dettagli dei guasti infrastrutturali restano nei log.
    pub fn to_wire(&self) -> WireError {
        match self {
            AppError::Validation { field, reason } => {
                WireError::new("validation_error", self.to_string()).with_field(field, reason)
            }
            AppError::MissingScope => WireError::new("missing_scope", self.to_string()),
            AppError::Unauthorized => WireError::new("unauthorized", self.to_string()),
            AppError::NotFound(_) => WireError::new("not_found", self.to_string()),
            AppError::Conflict(_) => WireError::new("conflict", self.to_string()),
            AppError::Database(_) | AppError::Internal(_) => {
                WireError::new("internal_error", "internal server error")
            }
        }
    }
}

// Corpo JSON o query string non decodificabili: stesso formato degli altri errori di campo.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::validation("json", rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::validation("query", rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(self.to_wire())).into_response()
    }
}
