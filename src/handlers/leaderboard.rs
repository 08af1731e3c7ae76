use axum::{extract::State, response::Json};
use serde_json::{Value, json};

use crate::{AppState, error::Result, services::leaderboard_service};

/// Public ranking; no session required.
pub async fn get_leaderboard(State(state): State<AppState>) -> Result<Json<Value>> {
    let boards = leaderboard_service::boards(&state.db, &state.redis).await?;

    Ok(Json(json!({ "leaderboards": boards })))
}
