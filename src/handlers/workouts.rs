use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{Value, json};
use validator::Validate;

use crate::{
    AppState,
    auth::AuthUser,
    error::Result,
    models::SaveWorkoutRequest,
    services::{notification_service, workout_service},
};

pub async fn save_workout(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<SaveWorkoutRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    payload.validate()?;

    let (streak, intent) = workout_service::save_workout(&state.db, auth_user.user_id, &payload).await?;
    notification_service::dispatch(&state.db, intent).await;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "streak": streak
        })),
    ))
}

pub async fn get_history(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Value>> {
    let history = workout_service::history(&state.db, auth_user.user_id).await?;

    Ok(Json(json!({ "history": history })))
}

pub async fn get_insight(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Value>> {
    let history = workout_service::history(&state.db, auth_user.user_id).await?;
    let insight = workout_service::training_insight(&history);

    Ok(Json(json!({ "insight": insight })))
}
