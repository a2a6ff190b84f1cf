use axum::async_trait;
use axum::extract::{Extension, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use staffetta_core::User;
use std::sync::Arc;

use crate::error::AppError;
use crate::AppState;

/// Utente autenticato, ricavato da `Authorization: Bearer <token>`.
pub struct Caller(pub User);

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Extension(app) = Extension::<Arc<AppState>>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;

        let token = bearer_token(&parts.headers).ok_or(AppError::Unauthorized)?;
        match app.users.find_by_token(token).await? {
            Some(user) => Ok(Caller(user)),
            None => {
                tracing::warn!("rejected unknown session token");
                Err(AppError::Unauthorized)
            }
        }
    }
}
