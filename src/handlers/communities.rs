use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde_json::{Value, json};
use uuid::Uuid;
use validator::Validate;

use crate::{
    AppState,
    auth::AuthUser,
    error::Result,
    models::{CreateCommunityRequest, CreatePostRequest},
    services::community_service,
};

pub async fn list_communities(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Value>> {
    let communities = community_service::list(&state.db, auth_user.user_id).await?;

    Ok(Json(json!({ "communities": communities })))
}

pub async fn create_community(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<CreateCommunityRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    payload.validate()?;

    let community_id =
        community_service::create(&state.db, auth_user.user_id, &payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "community_id": community_id
        })),
    ))
}

pub async fn get_community(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(community_id): Path<Uuid>,
) -> Result<Json<Value>> {
    let page = community_service::community_page(&state.db, auth_user.user_id, community_id).await?;

    Ok(Json(json!(page)))
}

pub async fn join_community(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(community_id): Path<Uuid>,
) -> Result<(StatusCode, Json<Value>)> {
    community_service::join(&state.db, auth_user.user_id, community_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Joined community"
        })),
    ))
}

pub async fn leave_community(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(community_id): Path<Uuid>,
) -> Result<Json<Value>> {
    community_service::leave(&state.db, auth_user.user_id, community_id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Left community"
    })))
}

pub async fn create_post(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(community_id): Path<Uuid>,
    Json(payload): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    payload.validate()?;

    let post_id =
        community_service::create_post(&state.db, auth_user.user_id, community_id, &payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "post_id": post_id
        })),
    ))
}

pub async fn get_post(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path((community_id, post_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Value>> {
    let page =
        community_service::post_page(&state.db, auth_user.user_id, community_id, post_id).await?;

    Ok(Json(json!(page)))
}
