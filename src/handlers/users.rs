use axum::{
    extract::{Path, State},
    response::Json,
};
use serde_json::{Value, json};
use uuid::Uuid;
use validator::Validate;

use crate::{
    AppState,
    auth::{AuthUser, OptionalAuthUser},
    error::{AppError, Result},
    models::UpdateProfileRequest,
    services::user_service,
};

pub async fn get_profile(
    State(state): State<AppState>,
    OptionalAuthUser(viewer): OptionalAuthUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Value>> {
    let viewer_id = viewer.map(|user| user.user_id);
    let profile = user_service::profile(&state.db, viewer_id, user_id).await?;

    Ok(Json(json!(profile)))
}

pub async fn update_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<Value>> {
    if auth_user.user_id != user_id {
        return Err(AppError::Authorization("Forbidden".to_string()));
    }
    payload.validate()?;

    let targets = user_service::update_profile(&state.db, user_id, &payload).await?;

    Ok(Json(json!({
        "message": "Profile updated successfully.",
        "targets": targets
    })))
}
