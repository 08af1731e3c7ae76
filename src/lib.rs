pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod models;
pub mod redis;
pub mod services;

use axum::{
    Router,
    http::{
        HeaderValue, Method,
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    },
    routing::{get, post},
};
use sqlx::PgPool;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{config::Config, redis::RedisClient, services::assistant_service::AssistantService};

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub redis: Arc<RedisClient>,
    pub config: Arc<Config>,
    pub assistant: Arc<AssistantService>,
}

// Credentials must be allowed because the session rides an HTTP-only cookie,
// which in turn rules out a wildcard origin.
fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE])
        .allow_credentials(true)
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/signup", post(handlers::auth::signup))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route("/api/auth/me", get(handlers::auth::me))
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/users/{user_id}/profile",
            get(handlers::users::get_profile),
        )
        .route(
            "/api/users/{user_id}/profile/update",
            post(handlers::users::update_profile),
        )
}

fn workout_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/workout",
            get(handlers::workouts::get_history).post(handlers::workouts::save_workout),
        )
        .route("/api/workout/insight", get(handlers::workouts::get_insight))
}

fn social_routes() -> Router<AppState> {
    Router::new()
        .route("/api/social/feed", get(handlers::social::get_feed))
        .route(
            "/api/social/workouts/share",
            post(handlers::social::share_workout),
        )
        .route(
            "/api/social/follow",
            post(handlers::social::follow).delete(handlers::social::unfollow),
        )
        .route("/api/social/interact/vote", post(handlers::votes::cast_vote))
        .route(
            "/api/social/interact/comment",
            post(handlers::comments::create_comment),
        )
}

fn community_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/communities",
            get(handlers::communities::list_communities)
                .post(handlers::communities::create_community),
        )
        .route(
            "/api/communities/{community_id}",
            get(handlers::communities::get_community),
        )
        .route(
            "/api/communities/{community_id}/join",
            post(handlers::communities::join_community)
                .delete(handlers::communities::leave_community),
        )
        .route(
            "/api/communities/{community_id}/post",
            post(handlers::communities::create_post),
        )
        .route(
            "/api/communities/{community_id}/post/{post_id}",
            get(handlers::communities::get_post),
        )
}

fn nutrition_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/nutrition/meals",
            get(handlers::nutrition::get_meals).post(handlers::nutrition::log_meal),
        )
        .route("/api/nutrition/water", post(handlers::nutrition::log_water))
        .route(
            "/api/nutrition/weight",
            get(handlers::nutrition::get_weight_history).post(handlers::nutrition::log_weight),
        )
        .route(
            "/api/nutrition/analytics",
            get(handlers::nutrition::get_analytics),
        )
        .route(
            "/api/nutrition/search",
            post(handlers::nutrition::search_food),
        )
        .route(
            "/api/nutrition/insights",
            get(handlers::nutrition::get_insights),
        )
}

fn misc_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/notifications",
            get(handlers::notifications::get_notifications)
                .put(handlers::notifications::mark_all_read),
        )
        .route(
            "/api/leaderboard",
            get(handlers::leaderboard::get_leaderboard),
        )
        .route("/api/chat", post(handlers::chat::chat))
        .route(
            "/api/chat/history",
            get(handlers::chat::get_history).post(handlers::chat::append_history),
        )
}

pub fn create_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .merge(auth_routes())
        .merge(user_routes())
        .merge(workout_routes())
        .merge(social_routes())
        .merge(community_routes())
        .merge(nutrition_routes())
        .merge(misc_routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    // Neither backing store is reachable at these addresses, so anything
    // that survives authentication ends in a 5xx rather than a 401. That is
    // enough to observe which routes the session cookie gates.
    fn test_state() -> AppState {
        let config = Config {
            database_url: "postgres://127.0.0.1:1/nutrifit_test".to_string(),
            redis_url: "redis://127.0.0.1:1".to_string(),
            jwt_secret: "test-secret".to_string(),
            host: "127.0.0.1".to_string(),
            port: 0,
            allowed_origins: vec!["http://localhost:3000".to_string()],
            gemini_api_key: None,
            gemini_api_base: "http://127.0.0.1:1".to_string(),
            gemini_model: "test-model".to_string(),
        };

        let db = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .expect("lazy pool from a well-formed url");
        let redis = RedisClient::open(&config.redis_url).expect("client from a well-formed url");
        let assistant = AssistantService::new(&config);

        AppState {
            db,
            redis: Arc::new(redis),
            config: Arc::new(config),
            assistant: Arc::new(assistant),
        }
    }

    async fn get(app: Router, uri: &str) -> StatusCode {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        response.status()
    }

    #[tokio::test]
    async fn leaderboard_is_served_without_a_session() {
        let status = get(create_app(test_state()), "/api/leaderboard").await;
        assert_ne!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn profile_is_viewable_without_a_session() {
        let uri = format!(
            "/api/users/{}/profile",
            uuid::Uuid::nil()
        );
        let status = get(create_app(test_state()), &uri).await;
        assert_ne!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn notifications_require_a_session() {
        let status = get(create_app(test_state()), "/api/notifications").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
