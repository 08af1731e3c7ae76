use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{Value, json};
use validator::Validate;

use crate::{
    AppState,
    auth::AuthUser,
    error::Result,
    models::CreateCommentRequest,
    services::{comment_service, notification_service},
};

pub async fn create_comment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    payload.validate()?;

    let (comment_id, intent) =
        comment_service::create_comment(&state.db, auth_user.user_id, &payload).await?;
    notification_service::dispatch(&state.db, intent).await;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "comment_id": comment_id
        })),
    ))
}
