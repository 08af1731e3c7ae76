use axum::{extract::State, http::StatusCode, response::Json};
use axum_extra::extract::cookie::CookieJar;
use serde_json::{Value, json};
use uuid::Uuid;
use validator::Validate;

use crate::{
    AppState,
    auth::{AuthUser, auth_cookie, expired_auth_cookie, hash_password, issue_token, verify_password},
    error::{AppError, Result},
    models::{AccountResponse, LoginRequest, SignupRequest, User},
};

pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, CookieJar, Json<Value>)> {
    payload.validate()?;

    if !state
        .redis
        .rate_limit_allow("signup", &payload.email, 5, 3600)
        .await?
    {
        return Err(AppError::RateLimit);
    }

    let existing: Option<Uuid> = sqlx::query_scalar("SELECT id FROM users WHERE email = $1")
        .bind(&payload.email)
        .fetch_optional(&state.db)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict("Email already exists".to_string()));
    }

    let password_hash = hash_password(&payload.password)?;
    let user_id = Uuid::new_v4();

    sqlx::query("INSERT INTO users (id, name, email, password_hash) VALUES ($1, $2, $3, $4)")
        .bind(user_id)
        .bind(&payload.name)
        .bind(&payload.email)
        .bind(&password_hash)
        .execute(&state.db)
        .await?;

    let token = issue_token(user_id, payload.email.clone(), &state.config.jwt_secret)?;

    Ok((
        StatusCode::CREATED,
        jar.add(auth_cookie(token)),
        Json(json!({
            "success": true,
            "user": {
                "id": user_id,
                "name": payload.name,
                "email": payload.email
            }
        })),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<(CookieJar, Json<Value>)> {
    payload.validate()?;

    if !state
        .redis
        .rate_limit_allow("login", &payload.email, 10, 900)
        .await?
    {
        return Err(AppError::RateLimit);
    }

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(&payload.email)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::Authentication("Invalid credentials".to_string()))?;

    if !verify_password(&payload.password, &user.password_hash)? {
        return Err(AppError::Authentication("Invalid credentials".to_string()));
    }

    let token = issue_token(user.id, user.email.clone(), &state.config.jwt_secret)?;

    Ok((
        jar.add(auth_cookie(token)),
        Json(json!({
            "success": true,
            "user": {
                "id": user.id,
                "name": user.name,
                "email": user.email
            }
        })),
    ))
}

pub async fn me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Value>> {
    let user = sqlx::query_as::<_, AccountResponse>("SELECT id, name, email FROM users WHERE id = $1")
        .bind(auth_user.user_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(json!({ "user": user })))
}

pub async fn logout(jar: CookieJar) -> Result<(CookieJar, Json<Value>)> {
    Ok((
        jar.add(expired_auth_cookie()),
        Json(json!({ "success": true })),
    ))
}
