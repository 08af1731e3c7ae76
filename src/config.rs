use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub jwt_secret: String,
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub gemini_api_key: Option<String>,
    pub gemini_api_base: String,
    pub gemini_model: String,
}

fn env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

impl Config {
    /// Reads the environment (after dotenv has loaded `.env`). Only the
    /// database URL and JWT secret are mandatory; everything else has a
    /// local-development default. A missing Gemini key disables the
    /// assistant endpoints rather than the whole server.
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Config {
            database_url: env::var("DATABASE_URL")?,
            jwt_secret: env::var("JWT_SECRET")?,
            redis_url: env_or("REDIS_URL", "redis://localhost:6379"),
            host: env_or("HOST", "0.0.0.0"),
            port: env_or("PORT", "8080").parse().unwrap_or(8080),
            allowed_origins: env_or(
                "ALLOWED_ORIGINS",
                "http://localhost:3000,http://localhost:5173",
            )
            .split(',')
            .map(|origin| origin.trim().to_string())
            .collect(),
            gemini_api_key: env::var("GEMINI_API_KEY").ok(),
            gemini_api_base: env_or(
                "GEMINI_API_BASE",
                "https://generativelanguage.googleapis.com/v1beta",
            ),
            gemini_model: env_or("GEMINI_MODEL", "gemini-2.5-flash"),
        })
    }
}
