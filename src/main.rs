use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nutrifit::{
    AppState, config::Config, create_app, database, redis::RedisClient,
    services::assistant_service::AssistantService,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nutrifit=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let db = database::connect(&config.database_url).await?;
    tracing::info!("database connected, schema up to date");

    let redis = RedisClient::open(&config.redis_url)?;

    let assistant = AssistantService::new(&config);
    if config.gemini_api_key.is_none() {
        tracing::warn!("GEMINI_API_KEY not set, assistant features are disabled");
    }

    let addr = format!("{}:{}", config.host, config.port);

    let state = AppState {
        db,
        redis: Arc::new(redis),
        config: Arc::new(config),
        assistant: Arc::new(assistant),
    };

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("listening on {addr}");
    axum::serve(listener, create_app(state)).await?;

    Ok(())
}
