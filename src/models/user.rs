use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::achievement::EarnedAchievement;
use crate::models::workout::SharedWorkoutPost;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "gender", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "activity_level", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Heavy,
}

impl ActivityLevel {
    pub fn multiplier(self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Heavy => 1.725,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "fitness_goal", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FitnessGoal {
    FatLoss,
    Maintenance,
    MuscleGain,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub age: Option<i32>,
    pub gender: Option<Gender>,
    pub activity_level: Option<ActivityLevel>,
    pub fitness_goal: Option<FitnessGoal>,
    pub dietary_preference: Option<String>,
    pub daily_calorie_target: Option<i32>,
    pub daily_protein_target: Option<i32>,
    pub daily_fat_target: Option<i32>,
    pub daily_carb_target: Option<i32>,
    pub daily_water_goal_ml: Option<i32>,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub total_active_days: i32,
    pub nutrition_streak: i32,
    pub longest_nutrition_streak: i32,
    pub created_at: DateTime<Utc>,
}

// Auth requests
#[derive(Debug, Validate, Deserialize)]
pub struct SignupRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

#[derive(Debug, Validate, Deserialize)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

// Minimal account view returned by the auth endpoints
#[derive(Debug, Serialize, FromRow)]
pub struct AccountResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

// Body metrics update; saving recomputes the daily targets
#[derive(Debug, Validate, Deserialize)]
pub struct UpdateProfileRequest {
    #[validate(range(min = 20.0, max = 400.0))]
    pub weight_kg: f64,
    #[validate(range(min = 80.0, max = 260.0))]
    pub height_cm: f64,
    #[validate(range(min = 13, max = 120))]
    pub age: i32,
    pub gender: Gender,
    pub activity_level: ActivityLevel,
    pub fitness_goal: FitnessGoal,
    #[validate(length(max = 100))]
    pub dietary_preference: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NutritionTargets {
    pub daily_calorie_target: i32,
    pub daily_protein_target: i32,
    pub daily_fat_target: i32,
    pub daily_carb_target: i32,
    #[serde(rename = "daily_water_goal")]
    pub daily_water_goal_ml: i32,
}

#[derive(Debug, Deserialize)]
pub struct FollowRequest {
    pub following_id: Uuid,
}

// Public profile aggregate
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub profile: ProfileSummary,
    pub recent_posts: Vec<SharedWorkoutPost>,
}

#[derive(Debug, Serialize)]
pub struct ProfileSummary {
    pub id: Uuid,
    pub name: String,
    pub followers: i64,
    pub following: i64,
    pub total_workouts: i64,
    pub lifetime_volume: f64,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub total_active_days: i32,
    pub favorite_muscle: String,
    pub is_following: bool,
    pub achievements: Vec<EarnedAchievement>,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub age: Option<i32>,
    pub gender: Option<Gender>,
    pub activity_level: Option<ActivityLevel>,
    pub fitness_goal: Option<FitnessGoal>,
    pub dietary_preference: Option<String>,
    pub daily_calorie_target: Option<i32>,
    pub daily_protein_target: Option<i32>,
    pub daily_fat_target: Option<i32>,
    pub daily_carb_target: Option<i32>,
    pub daily_water_goal: Option<i32>,
    pub nutrition_streak: i32,
    pub longest_nutrition_streak: i32,
}
