use axum::{extract::State, response::Json};
use serde_json::{Value, json};

use crate::{
    AppState, auth::AuthUser, error::Result, services::notification_service,
};

pub async fn get_notifications(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Value>> {
    let list = notification_service::list(&state.db, auth_user.user_id).await?;

    Ok(Json(json!(list)))
}

pub async fn mark_all_read(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Value>> {
    notification_service::mark_all_read(&state.db, auth_user.user_id).await?;

    Ok(Json(json!({ "success": true })))
}
