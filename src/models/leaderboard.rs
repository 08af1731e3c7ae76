use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// All three boards rank the top ten; Deserialize is for the cache read path.

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StreakEntry {
    pub id: Uuid,
    pub name: String,
    pub score: i32,
    pub current_streak: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VolumeEntry {
    pub id: Uuid,
    pub name: String,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ConsistencyEntry {
    pub id: Uuid,
    pub name: String,
    pub score: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardBoards {
    pub streaks: Vec<StreakEntry>,
    pub volume: Vec<VolumeEntry>,
    pub consistency: Vec<ConsistencyEntry>,
}
