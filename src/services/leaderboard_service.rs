use sqlx::PgPool;

use crate::{
    error::Result,
    models::{ConsistencyEntry, LeaderboardBoards, StreakEntry, VolumeEntry},
    redis::RedisClient,
};

const CACHE_KEY: &str = "leaderboard:v1";
const CACHE_TTL_SECONDS: u64 = 60;

/// Top-ten boards for streaks, lifetime volume, and active days, cached for
/// a minute since every user sees the same listing.
pub async fn boards(db: &PgPool, redis: &RedisClient) -> Result<LeaderboardBoards> {
    if let Some(boards) = redis.read_cached::<LeaderboardBoards>(CACHE_KEY).await? {
        return Ok(boards);
    }

    let streaks = sqlx::query_as::<_, StreakEntry>(
        "SELECT id, name, longest_streak AS score, current_streak
         FROM users
         ORDER BY longest_streak DESC, current_streak DESC
         LIMIT 10",
    )
    .fetch_all(db)
    .await?;

    let volume = sqlx::query_as::<_, VolumeEntry>(
        "SELECT u.id, u.name, COALESCE(SUM(ws.total_volume), 0) AS score
         FROM users u
         LEFT JOIN workout_sessions ws ON ws.user_id = u.id
         GROUP BY u.id, u.name
         ORDER BY score DESC
         LIMIT 10",
    )
    .fetch_all(db)
    .await?;

    let consistency = sqlx::query_as::<_, ConsistencyEntry>(
        "SELECT id, name, total_active_days AS score
         FROM users
         ORDER BY total_active_days DESC
         LIMIT 10",
    )
    .fetch_all(db)
    .await?;

    let boards = LeaderboardBoards {
        streaks,
        volume,
        consistency,
    };

    if let Err(e) = redis.write_cached(CACHE_KEY, &boards, CACHE_TTL_SECONDS).await {
        tracing::error!("Failed to cache leaderboard: {}", e);
    }

    Ok(boards)
}
