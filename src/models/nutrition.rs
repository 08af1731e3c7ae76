use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "meal_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Meal {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub meal_type: MealType,
    pub food_name: String,
    pub calories: i32,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub fiber_g: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DailyNutritionSummary {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub total_calories: i32,
    pub total_protein_g: f64,
    pub total_carbs_g: f64,
    pub total_fat_g: f64,
    pub total_fiber_g: f64,
    pub total_water_ml: i32,
    pub net_calories: i32,
}

// One additive adjustment to a user's daily summary. Fields left at zero
// leave their accumulator untouched; net_calories moves independently of
// total_calories so workout burn can lower net without faking intake.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NutritionDelta {
    pub calories: i32,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub fiber_g: f64,
    pub water_ml: i32,
    pub net_calories: i32,
}

impl NutritionDelta {
    pub fn from_meal(calories: i32, protein_g: f64, carbs_g: f64, fat_g: f64, fiber_g: f64) -> Self {
        Self {
            calories,
            protein_g,
            carbs_g,
            fat_g,
            fiber_g,
            water_ml: 0,
            net_calories: calories,
        }
    }

    pub fn from_water(amount_ml: i32) -> Self {
        Self {
            water_ml: amount_ml,
            ..Self::default()
        }
    }

    pub fn from_workout_burn(burned_calories: i32) -> Self {
        Self {
            net_calories: -burned_calories,
            ..Self::default()
        }
    }
}

#[derive(Debug, Validate, Deserialize)]
pub struct LogMealRequest {
    pub date: NaiveDate,
    pub meal_type: MealType,
    #[validate(length(min = 1, max = 200))]
    pub food_name: String,
    #[validate(range(min = 0, max = 20000))]
    pub calories: i32,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub protein_g: f64,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub carbs_g: f64,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub fat_g: f64,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub fiber_g: f64,
}

#[derive(Debug, Validate, Deserialize)]
pub struct LogWaterRequest {
    pub date: NaiveDate,
    #[validate(range(min = 1, max = 10000))]
    pub amount_ml: i32,
}

#[derive(Debug, Validate, Deserialize)]
pub struct LogWeightRequest {
    pub date: NaiveDate,
    #[validate(range(min = 20.0, max = 400.0))]
    pub weight_kg: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WeightLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub weight_kg: f64,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct MealsQuery {
    pub date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct WeightQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct AnalyticsQuery {
    pub days: Option<i64>,
}

#[derive(Debug, Serialize, FromRow)]
pub struct NutritionHistoryPoint {
    pub date: NaiveDate,
    pub total_calories: i32,
    pub total_protein_g: f64,
    pub total_carbs_g: f64,
    pub total_fat_g: f64,
    pub total_water_ml: i32,
}

#[derive(Debug, Serialize, FromRow)]
pub struct WeightHistoryPoint {
    pub date: NaiveDate,
    pub weight_kg: f64,
}

#[derive(Debug, Serialize, FromRow)]
pub struct TargetsSnapshot {
    pub daily_calorie_target: Option<i32>,
    pub daily_protein_target: Option<i32>,
    pub daily_carb_target: Option<i32>,
    pub daily_fat_target: Option<i32>,
    pub daily_water_goal: Option<i32>,
    pub nutrition_streak: i32,
}

#[derive(Debug, Serialize)]
pub struct NutritionAnalytics {
    pub days: i64,
    pub nutrition_history: Vec<NutritionHistoryPoint>,
    pub weight_history: Vec<WeightHistoryPoint>,
    pub targets: TargetsSnapshot,
}

#[derive(Debug, Validate, Deserialize)]
pub struct FoodSearchRequest {
    #[validate(length(min = 1, max = 300))]
    pub query: String,
}

// Shape the food lookup model is instructed to produce
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodItem {
    pub name: String,
    pub serving: Option<String>,
    pub calories: f64,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub carbs: f64,
    #[serde(default)]
    pub fat: f64,
    #[serde(default)]
    pub fiber: f64,
}
