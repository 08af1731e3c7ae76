use redis::{AsyncCommands, Client, aio::ConnectionManager};
use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::Mutex;

use crate::error::{AppError, Result};

/// Redis-backed rate limiting and short-lived response caching. The URL is
/// validated up front, but the connection itself is only established on the
/// first command; after that the manager reconnects on its own. The mutex
/// serializes commands over the single managed connection.
pub struct RedisClient {
    client: Client,
    manager: Mutex<Option<ConnectionManager>>,
}

impl RedisClient {
    pub fn open(redis_url: &str) -> Result<Self> {
        Ok(Self {
            client: Client::open(redis_url)?,
            manager: Mutex::new(None),
        })
    }

    async fn lease(&self) -> Result<tokio::sync::MutexGuard<'_, Option<ConnectionManager>>> {
        let mut guard = self.manager.lock().await;
        if guard.is_none() {
            *guard = Some(ConnectionManager::new(self.client.clone()).await?);
        }
        Ok(guard)
    }

    /// Fixed-window rate limit: at most `limit` hits per `window_seconds`
    /// for the (scope, subject) pair. The window starts at the first hit.
    pub async fn rate_limit_allow(
        &self,
        scope: &str,
        subject: &str,
        limit: u32,
        window_seconds: u64,
    ) -> Result<bool> {
        let key = format!("ratelimit:{scope}:{subject}");
        let mut guard = self.lease().await?;
        let Some(conn) = guard.as_mut() else {
            return Err(AppError::Internal("redis connection unavailable".to_string()));
        };

        let count: u32 = conn.incr(&key, 1).await?;
        if count == 1 {
            let _: () = conn.expire(&key, window_seconds as i64).await?;
        }

        Ok(count <= limit)
    }

    /// Cached JSON read. Anything unreadable (missing, expired, or a stale
    /// shape from an older build) comes back as a miss.
    pub async fn read_cached<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let mut guard = self.lease().await?;
        let Some(conn) = guard.as_mut() else {
            return Err(AppError::Internal("redis connection unavailable".to_string()));
        };
        let raw: Option<String> = conn.get(key).await?;
        Ok(raw.and_then(|json| serde_json::from_str(&json).ok()))
    }

    pub async fn write_cached<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl_seconds: u64,
    ) -> Result<()> {
        let Ok(json) = serde_json::to_string(value) else {
            return Ok(());
        };
        let mut guard = self.lease().await?;
        let Some(conn) = guard.as_mut() else {
            return Err(AppError::Internal("redis connection unavailable".to_string()));
        };
        let _: () = conn.set_ex(key, json, ttl_seconds).await?;
        Ok(())
    }
}
