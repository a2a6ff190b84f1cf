use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::{extract::{Extension, Query}, http::StatusCode, Json};
use staffetta_core::{
    FetchMessagesQuery, ListMessagesResponse, ListUsersResponse, LoginRequest, LoginResponse,
    RegisterRequest, RegisterResponse, SendMessageRequest, SendMessageResponse,
};
use std::sync::Arc;

use crate::auth::Caller;
use crate::error::AppResult;
use crate::fetch::{self, PAGE_LIMIT};
use crate::{ingest, scope, AppState};

/// Handler per POST /api/register
pub async fn register(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    let Json(req) = payload?;
    let (user, token) = state.users.register(&req.name, &req.password).await?;
    Ok((StatusCode::CREATED, Json(RegisterResponse { user, token })))
}

/// Handler per POST /api/login
pub async fn login(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Json<LoginResponse>> {
    let Json(req) = payload?;
    let (user, token) = state.users.login(&req.name, &req.password).await?;
    Ok(Json(LoginResponse { token, user }))
}

/// Handler per GET /api/users
pub async fn list_users(
    Extension(state): Extension<Arc<AppState>>,
    Caller(caller): Caller,
) -> AppResult<Json<ListUsersResponse>> {
    let users = state.users.list_except(caller.id).await?;
    Ok(Json(ListUsersResponse { users }))
}

/// Handler per GET /api/messages?global=1 | ?userId=N, con &after=<ultimo id visto>
pub async fn list_messages(
    Extension(state): Extension<Arc<AppState>>,
    Caller(caller): Caller,
    query: Result<Query<FetchMessagesQuery>, QueryRejection>,
) -> AppResult<Json<ListMessagesResponse>> {
    let Query(query) = query?;
    let scope = scope::resolve(&caller, query.selector())?;
    let messages = fetch::fetch(&state.messages, &state.users, scope, query.cursor(), PAGE_LIMIT).await?;
    Ok(Json(ListMessagesResponse { messages }))
}

/// Handler per POST /api/messages
pub async fn send_message(
    Extension(state): Extension<Arc<AppState>>,
    Caller(caller): Caller,
    payload: Result<Json<SendMessageRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<SendMessageResponse>)> {
    let Json(req) = payload?;
    let message = ingest::send(&state.messages, &caller, req).await?;
    Ok((StatusCode::CREATED, Json(SendMessageResponse { message })))
}
