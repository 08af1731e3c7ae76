use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "post_privacy", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PostPrivacy {
    Public,
    Followers,
    Private,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WorkoutSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration: i32, // whole minutes
    pub total_volume: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Exercise {
    pub id: Uuid,
    pub session_id: Uuid,
    pub name: String,
    pub muscle_group: String,
    pub total_volume: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ExerciseSet {
    pub id: Uuid,
    pub exercise_id: Uuid,
    pub reps: i32,
    pub weight: f64,
    pub volume: f64,
}

// The client submits the finished session wholesale, ids included, so an
// offline-built workout keeps its identity and a retried save conflicts
// instead of double-counting.
#[derive(Debug, Validate, Deserialize)]
pub struct SaveWorkoutRequest {
    pub id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    #[validate(range(min = 0, max = 1440))]
    pub duration: Option<i32>,
    #[validate(range(min = 0.0))]
    pub total_volume: f64,
    #[validate(nested)]
    pub exercises: Vec<ExercisePayload>,
}

#[derive(Debug, Validate, Deserialize)]
pub struct ExercisePayload {
    pub id: Uuid,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 100))]
    pub muscle_group: String,
    #[validate(range(min = 0.0))]
    pub total_volume: f64,
    #[validate(nested)]
    pub sets: Vec<SetPayload>,
}

#[derive(Debug, Validate, Deserialize)]
pub struct SetPayload {
    pub id: Uuid,
    #[validate(range(min = 0, max = 1000))]
    pub reps: i32,
    #[validate(range(min = 0.0))]
    pub weight: f64,
    #[validate(range(min = 0.0))]
    pub volume: f64,
}

// Derived streak state written back onto the user row after a qualifying day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, FromRow)]
pub struct StreakSnapshot {
    pub current_streak: i32,
    pub longest_streak: i32,
    pub total_active_days: i32,
}

#[derive(Debug, Serialize)]
pub struct SetEntry {
    pub id: Uuid,
    pub reps: i32,
    pub weight: f64,
    pub volume: f64,
}

#[derive(Debug, Serialize)]
pub struct ExerciseWithSets {
    pub id: Uuid,
    pub name: String,
    pub muscle_group: String,
    pub sets: Vec<SetEntry>,
    pub total_volume: f64,
}

#[derive(Debug, Serialize)]
pub struct WorkoutHistoryEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration: i32,
    pub total_volume: f64,
    pub exercises: Vec<ExerciseWithSets>,
}

#[derive(Debug, Validate, Deserialize)]
pub struct ShareWorkoutRequest {
    pub workout_id: Uuid,
    #[validate(length(max = 500))]
    pub caption: Option<String>,
    pub privacy: Option<PostPrivacy>,
}

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub sort: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FeedAuthor {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct FeedWorkout {
    pub id: Uuid,
    pub duration: i32,
    pub total_volume: f64,
    pub exercises: Vec<ExerciseWithSets>,
}

#[derive(Debug, Serialize)]
pub struct FeedPost {
    pub post_id: Uuid,
    pub author: FeedAuthor,
    pub caption: Option<String>,
    pub privacy: PostPrivacy,
    pub created_at: DateTime<Utc>,
    pub upvote_count: i64,
    pub downvote_count: i64,
    pub score: i64,
    pub user_vote: i16,
    pub workout: FeedWorkout,
}

/// Slimmer shape used on profile pages: exercises without their sets
#[derive(Debug, Serialize, FromRow)]
pub struct ExerciseSummary {
    pub name: String,
    pub muscle_group: String,
    pub volume: f64,
}

#[derive(Debug, Serialize)]
pub struct ProfileWorkout {
    pub id: Uuid,
    pub duration: i32,
    pub total_volume: f64,
    pub exercises: Vec<ExerciseSummary>,
}

#[derive(Debug, Serialize)]
pub struct SharedWorkoutPost {
    pub post_id: Uuid,
    pub caption: Option<String>,
    pub privacy: PostPrivacy,
    pub created_at: DateTime<Utc>,
    pub score: i64,
    pub user_vote: i16,
    pub workout: ProfileWorkout,
}
