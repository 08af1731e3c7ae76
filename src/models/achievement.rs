use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "achievement_type")]
pub enum AchievementType {
    #[sqlx(rename = "first_workout")]
    #[serde(rename = "first_workout")]
    FirstWorkout,
    #[sqlx(rename = "7_day_streak")]
    #[serde(rename = "7_day_streak")]
    SevenDayStreak,
    #[sqlx(rename = "7_day_nutrition_streak")]
    #[serde(rename = "7_day_nutrition_streak")]
    SevenDayNutritionStreak,
}

// Shape embedded in profile responses
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct EarnedAchievement {
    pub achievement_type: AchievementType,
    pub earned_at: DateTime<Utc>,
}
