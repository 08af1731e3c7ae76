use axum::{RequestPartsExt, extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    AppState,
    error::{AppError, Result},
};

/// Cookie the signed token rides in. HTTP-only, so page scripts never see it.
pub const AUTH_COOKIE: &str = "auth_token";

const TOKEN_LIFETIME_DAYS: i64 = 7;
const BCRYPT_COST: u32 = 12;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub exp: i64,
    pub iat: i64,
}

/// Signs a session token for the user, valid for seven days.
pub fn issue_token(user_id: Uuid, email: String, jwt_secret: &str) -> Result<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id,
        email,
        iat: now.timestamp(),
        exp: (now + Duration::days(TOKEN_LIFETIME_DAYS)).timestamp(),
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_ref()),
    )?)
}

fn verify_token(token: &str, jwt_secret: &str) -> Result<Claims> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_ref()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

fn session_cookie(value: String) -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE, value))
        .http_only(true)
        .path("/")
        .same_site(SameSite::Lax)
        .build()
}

/// The cookie expires in step with the token it carries.
pub fn auth_cookie(token: String) -> Cookie<'static> {
    let mut cookie = session_cookie(token);
    cookie.set_max_age(time::Duration::days(TOKEN_LIFETIME_DAYS));
    cookie
}

/// Logout replaces the cookie with an already-expired empty one, so the
/// browser deletes it outright; the old token itself stays valid until its
/// own expiry.
pub fn expired_auth_cookie() -> Cookie<'static> {
    let mut cookie = session_cookie(String::new());
    cookie.make_removal();
    cookie
}

pub fn hash_password(password: &str) -> Result<String> {
    Ok(bcrypt::hash(password, BCRYPT_COST)?)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    Ok(bcrypt::verify(password, hash)?)
}

/// The authenticated caller, extracted from the session cookie. Handlers
/// take this as an argument; requests without a valid token are rejected
/// before the handler body runs.
#[derive(Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let jar = parts
            .extract::<CookieJar>()
            .await
            .map_err(|_| AppError::Authentication("Missing session cookie".to_string()))?;

        let token = jar
            .get(AUTH_COOKIE)
            .map(|cookie| cookie.value())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| AppError::Authentication("Missing session cookie".to_string()))?;

        let claims = verify_token(token, &state.config.jwt_secret)?;

        Ok(AuthUser {
            user_id: claims.sub,
            email: claims.email,
        })
    }
}

/// For endpoints that are public but personalize when a session is present.
#[derive(Debug)]
pub struct OptionalAuthUser(pub Option<AuthUser>);

impl FromRequestParts<AppState> for OptionalAuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        Ok(OptionalAuthUser(
            AuthUser::from_request_parts(parts, state).await.ok(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_tokens_round_trip() {
        let user_id = Uuid::new_v4();
        let token =
            issue_token(user_id, "user@example.com".to_string(), "secret").expect("token signs");
        let claims = verify_token(&token, "secret").expect("token verifies");
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, "user@example.com");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn tokens_do_not_verify_under_another_secret() {
        let token =
            issue_token(Uuid::new_v4(), "user@example.com".to_string(), "secret").expect("token");
        assert!(verify_token(&token, "other-secret").is_err());
    }

    #[test]
    fn session_cookie_lives_as_long_as_the_token() {
        let cookie = auth_cookie("signed-token".to_string());
        assert_eq!(cookie.value(), "signed-token");
        assert_eq!(
            cookie.max_age(),
            Some(time::Duration::days(TOKEN_LIFETIME_DAYS))
        );
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
    }

    #[test]
    fn logout_cookie_is_an_immediate_removal() {
        let cookie = expired_auth_cookie();
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
    }
}
