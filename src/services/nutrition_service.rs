use chrono::NaiveDate;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::{
    error::Result,
    models::{
        DailyNutritionSummary, LogMealRequest, LogWaterRequest, LogWeightRequest, Meal,
        NutritionAnalytics, NutritionDelta, NutritionHistoryPoint, TargetsSnapshot, WeightHistoryPoint,
        WeightLog,
    },
    services::achievement_service,
};

/// Tolerance around the calorie target that still counts as on-target.
pub const CALORIE_WINDOW: i32 = 250;

/// A day's intake is on-target when it lands inside the window around the
/// user's calorie target. Users without a computed target never qualify.
pub fn within_calorie_window(total_calories: i32, target: i32) -> bool {
    target > 0
        && total_calories >= target - CALORIE_WINDOW
        && total_calories <= target + CALORIE_WINDOW
}

/// True only for the meal that moved the running total from below the window
/// into it. Later meals the same day (still inside, or overshooting past the
/// window) never re-trigger, which is what keeps the streak bump at most
/// once per day.
pub fn crossed_into_window(total_after: i32, meal_calories: i32, target: i32) -> bool {
    within_calorie_window(total_after, target)
        && total_after - meal_calories < target - CALORIE_WINDOW
}

/// Folds one additive delta into the user's summary row for the day,
/// creating the row on first touch. Zero-valued fields leave their
/// accumulator unchanged, so callers describe only what moved.
pub async fn apply_nutrition_delta(
    conn: &mut PgConnection,
    user_id: Uuid,
    date: NaiveDate,
    delta: NutritionDelta,
) -> Result<DailyNutritionSummary> {
    let summary = sqlx::query_as::<_, DailyNutritionSummary>(
        "INSERT INTO daily_nutrition_summary
             (user_id, date, total_calories, total_protein_g, total_carbs_g,
              total_fat_g, total_fiber_g, total_water_ml, net_calories)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
         ON CONFLICT (user_id, date) DO UPDATE SET
             total_calories = daily_nutrition_summary.total_calories + EXCLUDED.total_calories,
             total_protein_g = daily_nutrition_summary.total_protein_g + EXCLUDED.total_protein_g,
             total_carbs_g = daily_nutrition_summary.total_carbs_g + EXCLUDED.total_carbs_g,
             total_fat_g = daily_nutrition_summary.total_fat_g + EXCLUDED.total_fat_g,
             total_fiber_g = daily_nutrition_summary.total_fiber_g + EXCLUDED.total_fiber_g,
             total_water_ml = daily_nutrition_summary.total_water_ml + EXCLUDED.total_water_ml,
             net_calories = daily_nutrition_summary.net_calories + EXCLUDED.net_calories
         RETURNING *",
    )
    .bind(user_id)
    .bind(date)
    .bind(delta.calories)
    .bind(delta.protein_g)
    .bind(delta.carbs_g)
    .bind(delta.fat_g)
    .bind(delta.fiber_g)
    .bind(delta.water_ml)
    .bind(delta.net_calories)
    .fetch_one(&mut *conn)
    .await?;

    Ok(summary)
}

/// Records a meal, folds it into the daily summary and, when this meal is
/// the one that brought the day into the calorie window, bumps the nutrition
/// streak. All of it commits or none of it does.
pub async fn log_meal(db: &PgPool, user_id: Uuid, request: &LogMealRequest) -> Result<Uuid> {
    let mut tx = db.begin().await?;

    // Lock the user row first; the streak read-modify-write below must not
    // interleave with a concurrent meal log for the same user.
    let calorie_target: Option<i32> =
        sqlx::query_scalar("SELECT daily_calorie_target FROM users WHERE id = $1 FOR UPDATE")
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;

    let meal_id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO meals
             (id, user_id, date, meal_type, food_name, calories, protein_g, carbs_g, fat_g, fiber_g)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .bind(meal_id)
    .bind(user_id)
    .bind(request.date)
    .bind(request.meal_type)
    .bind(&request.food_name)
    .bind(request.calories)
    .bind(request.protein_g)
    .bind(request.carbs_g)
    .bind(request.fat_g)
    .bind(request.fiber_g)
    .execute(&mut *tx)
    .await?;

    let delta = NutritionDelta::from_meal(
        request.calories,
        request.protein_g,
        request.carbs_g,
        request.fat_g,
        request.fiber_g,
    );
    let summary = apply_nutrition_delta(&mut tx, user_id, request.date, delta).await?;

    if let Some(target) = calorie_target {
        if crossed_into_window(summary.total_calories, request.calories, target) {
            let streak: i32 = sqlx::query_scalar(
                "UPDATE users
                 SET nutrition_streak = nutrition_streak + 1,
                     longest_nutrition_streak = GREATEST(longest_nutrition_streak, nutrition_streak + 1)
                 WHERE id = $1
                 RETURNING nutrition_streak",
            )
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;

            achievement_service::nutrition_achievements(&mut tx, user_id, streak).await?;
        }
    }

    tx.commit().await?;
    Ok(meal_id)
}

pub async fn log_water(db: &PgPool, user_id: Uuid, request: &LogWaterRequest) -> Result<()> {
    let mut tx = db.begin().await?;

    sqlx::query("INSERT INTO water_logs (user_id, amount_ml, date) VALUES ($1, $2, $3)")
        .bind(user_id)
        .bind(request.amount_ml)
        .bind(request.date)
        .execute(&mut *tx)
        .await?;

    apply_nutrition_delta(
        &mut tx,
        user_id,
        request.date,
        NutritionDelta::from_water(request.amount_ml),
    )
    .await?;

    tx.commit().await?;
    Ok(())
}

/// Weight logs append-only; the user row mirrors the latest entry.
pub async fn log_weight(db: &PgPool, user_id: Uuid, request: &LogWeightRequest) -> Result<()> {
    let mut tx = db.begin().await?;

    sqlx::query("INSERT INTO weight_logs (user_id, weight_kg, date) VALUES ($1, $2, $3)")
        .bind(user_id)
        .bind(request.weight_kg)
        .bind(request.date)
        .execute(&mut *tx)
        .await?;

    sqlx::query("UPDATE users SET weight_kg = $2 WHERE id = $1")
        .bind(user_id)
        .bind(request.weight_kg)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

pub async fn day_log(
    db: &PgPool,
    user_id: Uuid,
    date: NaiveDate,
) -> Result<(Vec<Meal>, Option<DailyNutritionSummary>)> {
    let meals = sqlx::query_as::<_, Meal>(
        "SELECT * FROM meals WHERE user_id = $1 AND date = $2 ORDER BY timestamp ASC",
    )
    .bind(user_id)
    .bind(date)
    .fetch_all(db)
    .await?;

    let summary = sqlx::query_as::<_, DailyNutritionSummary>(
        "SELECT * FROM daily_nutrition_summary WHERE user_id = $1 AND date = $2",
    )
    .bind(user_id)
    .bind(date)
    .fetch_optional(db)
    .await?;

    Ok((meals, summary))
}

pub async fn weight_history(db: &PgPool, user_id: Uuid, limit: i64) -> Result<Vec<WeightLog>> {
    let logs = sqlx::query_as::<_, WeightLog>(
        "SELECT * FROM weight_logs WHERE user_id = $1 ORDER BY date DESC LIMIT $2",
    )
    .bind(user_id)
    .bind(limit.clamp(1, 365))
    .fetch_all(db)
    .await?;

    Ok(logs)
}

pub async fn analytics(db: &PgPool, user_id: Uuid, days: i64) -> Result<NutritionAnalytics> {
    let days = days.clamp(1, 365);

    let nutrition_history = sqlx::query_as::<_, NutritionHistoryPoint>(
        "SELECT date, total_calories, total_protein_g, total_carbs_g, total_fat_g, total_water_ml
         FROM daily_nutrition_summary
         WHERE user_id = $1 AND date >= CURRENT_DATE - $2::int
         ORDER BY date ASC",
    )
    .bind(user_id)
    .bind(days as i32)
    .fetch_all(db)
    .await?;

    let weight_history = sqlx::query_as::<_, WeightHistoryPoint>(
        "SELECT date, weight_kg
         FROM weight_logs
         WHERE user_id = $1 AND date >= CURRENT_DATE - $2::int
         ORDER BY date ASC",
    )
    .bind(user_id)
    .bind(days as i32)
    .fetch_all(db)
    .await?;

    let targets = sqlx::query_as::<_, TargetsSnapshot>(
        "SELECT daily_calorie_target, daily_protein_target, daily_carb_target, daily_fat_target,
                daily_water_goal_ml AS daily_water_goal, nutrition_streak
         FROM users
         WHERE id = $1",
    )
    .bind(user_id)
    .fetch_one(db)
    .await?;

    Ok(NutritionAnalytics {
        days,
        nutrition_history,
        weight_history,
        targets,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_bounds_are_inclusive() {
        assert!(within_calorie_window(1750, 2000));
        assert!(within_calorie_window(2250, 2000));
        assert!(within_calorie_window(2000, 2000));
        assert!(!within_calorie_window(1749, 2000));
        assert!(!within_calorie_window(2251, 2000));
    }

    #[test]
    fn missing_target_never_qualifies() {
        assert!(!within_calorie_window(0, 0));
        assert!(!within_calorie_window(100, 0));
        assert!(!within_calorie_window(100, -50));
    }

    #[test]
    fn only_the_crossing_meal_triggers() {
        // Target 2000, window [1750, 2250]. A 400 kcal meal taking the day
        // from 1500 to 1900 crosses in.
        assert!(crossed_into_window(1900, 400, 2000));
        // The next 200 kcal meal (1900 -> 2100) starts inside: no trigger.
        assert!(!crossed_into_window(2100, 200, 2000));
    }

    #[test]
    fn overshooting_past_the_window_does_not_trigger() {
        // 1500 -> 2400 jumps clean over the window.
        assert!(!crossed_into_window(2400, 900, 2000));
    }

    #[test]
    fn landing_exactly_on_the_lower_bound_triggers() {
        assert!(crossed_into_window(1750, 300, 2000));
    }

    #[test]
    fn meal_delta_moves_net_with_total() {
        let delta = NutritionDelta::from_meal(600, 40.0, 50.0, 20.0, 8.0);
        assert_eq!(delta.calories, 600);
        assert_eq!(delta.net_calories, 600);
        assert_eq!(delta.water_ml, 0);
    }

    #[test]
    fn workout_burn_only_lowers_net() {
        let delta = NutritionDelta::from_workout_burn(225);
        assert_eq!(delta.calories, 0);
        assert_eq!(delta.net_calories, -225);
        assert_eq!(delta.protein_g, 0.0);
    }

    #[test]
    fn water_delta_touches_water_alone() {
        let delta = NutritionDelta::from_water(500);
        assert_eq!(delta.water_ml, 500);
        assert_eq!(delta.calories, 0);
        assert_eq!(delta.net_calories, 0);
    }
}
