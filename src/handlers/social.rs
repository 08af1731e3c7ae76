use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use serde_json::{Value, json};
use validator::Validate;

use crate::{
    AppState,
    auth::AuthUser,
    error::Result,
    models::{FeedQuery, FollowRequest, ShareWorkoutRequest},
    services::{
        notification_service, social_service,
        social_service::FeedSort,
    },
};

pub async fn get_feed(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(params): Query<FeedQuery>,
) -> Result<Json<Value>> {
    let sort = FeedSort::from_query(params.sort.as_deref());
    let feed = social_service::feed(&state.db, auth_user.user_id, sort).await?;

    Ok(Json(json!({ "feed": feed })))
}

pub async fn share_workout(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<ShareWorkoutRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    payload.validate()?;

    let post_id = social_service::share_workout(&state.db, auth_user.user_id, &payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "post_id": post_id
        })),
    ))
}

pub async fn follow(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<FollowRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    let intent =
        social_service::follow(&state.db, auth_user.user_id, payload.following_id).await?;
    notification_service::dispatch(&state.db, Some(intent)).await;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Followed successfully"
        })),
    ))
}

pub async fn unfollow(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<FollowRequest>,
) -> Result<Json<Value>> {
    social_service::unfollow(&state.db, auth_user.user_id, payload.following_id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Unfollowed successfully"
    })))
}
