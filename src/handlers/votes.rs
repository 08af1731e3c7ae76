use axum::{extract::State, response::Json};
use serde_json::{Value, json};
use validator::Validate;

use crate::{
    AppState,
    auth::AuthUser,
    error::Result,
    models::CastVoteRequest,
    services::{notification_service, vote_service},
};

pub async fn cast_vote(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<CastVoteRequest>,
) -> Result<Json<Value>> {
    payload.validate()?;

    let (totals, intent) = vote_service::cast_vote(&state.db, auth_user.user_id, &payload).await?;
    notification_service::dispatch(&state.db, intent).await;

    Ok(Json(json!(totals)))
}
