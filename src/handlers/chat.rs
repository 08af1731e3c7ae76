use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{Value, json};
use validator::Validate;

use crate::{
    AppState,
    auth::AuthUser,
    error::{AppError, Result},
    models::{AppendHistoryRequest, ChatRequest},
    services::assistant_service,
};

pub async fn chat(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<Value>> {
    payload.validate()?;

    // Each message is a model call, so chat is rate limited per user
    if !state
        .redis
        .rate_limit_allow("chat", &auth_user.user_id.to_string(), 30, 3600)
        .await?
    {
        return Err(AppError::RateLimit);
    }

    let reply = state.assistant.chat_reply(&payload.message).await?;

    Ok(Json(json!({ "reply": reply })))
}

pub async fn get_history(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Value>> {
    let history = assistant_service::history(&state.db, auth_user.user_id).await?;

    Ok(Json(json!({ "history": history })))
}

pub async fn append_history(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<AppendHistoryRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    payload.validate()?;

    let id = assistant_service::append_history(&state.db, auth_user.user_id, &payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "id": id
        })),
    ))
}
