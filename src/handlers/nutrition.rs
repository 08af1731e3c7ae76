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
    error::{AppError, Result},
    models::{
        AnalyticsQuery, FoodSearchRequest, LogMealRequest, LogWaterRequest, LogWeightRequest,
        MealsQuery, WeightQuery,
    },
    services::nutrition_service,
};

pub async fn log_meal(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<LogMealRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    payload.validate()?;

    let meal_id = nutrition_service::log_meal(&state.db, auth_user.user_id, &payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Meal logged successfully",
            "meal_id": meal_id
        })),
    ))
}

pub async fn get_meals(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(params): Query<MealsQuery>,
) -> Result<Json<Value>> {
    let (meals, summary) =
        nutrition_service::day_log(&state.db, auth_user.user_id, params.date).await?;

    Ok(Json(json!({
        "meals": meals,
        "summary": summary
    })))
}

pub async fn log_water(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<LogWaterRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    payload.validate()?;

    nutrition_service::log_water(&state.db, auth_user.user_id, &payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Water logged successfully" })),
    ))
}

pub async fn log_weight(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<LogWeightRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    payload.validate()?;

    nutrition_service::log_weight(&state.db, auth_user.user_id, &payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Weight logged successfully" })),
    ))
}

pub async fn get_weight_history(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(params): Query<WeightQuery>,
) -> Result<Json<Value>> {
    let logs =
        nutrition_service::weight_history(&state.db, auth_user.user_id, params.limit.unwrap_or(30))
            .await?;

    Ok(Json(json!({ "logs": logs })))
}

pub async fn get_analytics(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(params): Query<AnalyticsQuery>,
) -> Result<Json<Value>> {
    let analytics =
        nutrition_service::analytics(&state.db, auth_user.user_id, params.days.unwrap_or(7))
            .await?;

    Ok(Json(json!(analytics)))
}

pub async fn search_food(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<FoodSearchRequest>,
) -> Result<Json<Value>> {
    payload.validate()?;

    // Lookups hit the external model, so they are rate limited per user
    if !state
        .redis
        .rate_limit_allow("food_search", &auth_user.user_id.to_string(), 20, 3600)
        .await?
    {
        return Err(AppError::RateLimit);
    }

    let item = state.assistant.food_lookup(&payload.query).await?;

    Ok(Json(json!({ "item": item })))
}

pub async fn get_insights(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Value>> {
    let insight = state
        .assistant
        .nutrition_insight(&state.db, auth_user.user_id)
        .await?;

    Ok(Json(json!({ "insight": insight })))
}
