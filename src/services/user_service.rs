use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::{
        ActivityLevel, ExerciseSummary, FitnessGoal, Gender, NutritionTargets, PostPrivacy,
        ProfileResponse, ProfileSummary, ProfileWorkout, SharedWorkoutPost, UpdateProfileRequest,
    },
    services::achievement_service,
};

/// Daily intake targets from body metrics: Mifflin-St Jeor resting rate,
/// scaled by activity, shifted for the goal, then split into macros
/// (protein 2 g/kg, fat 25% of calories, carbs take the rest).
pub fn calculate_targets(
    weight_kg: f64,
    height_cm: f64,
    age: i32,
    gender: Gender,
    activity_level: ActivityLevel,
    goal: FitnessGoal,
) -> NutritionTargets {
    let mut bmr = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * f64::from(age);
    bmr += match gender {
        Gender::Male => 5.0,
        Gender::Female | Gender::Other => -161.0,
    };

    let tdee = (bmr * activity_level.multiplier()).round();

    let daily_calorie_target = match goal {
        FitnessGoal::FatLoss => tdee - 500.0,
        FitnessGoal::Maintenance => tdee,
        FitnessGoal::MuscleGain => tdee + 300.0,
    } as i32;

    let daily_protein_target = (weight_kg * 2.0).round() as i32;
    let protein_calories = daily_protein_target * 4;

    let daily_fat_target = (f64::from(daily_calorie_target) * 0.25 / 9.0).round() as i32;
    let fat_calories = daily_fat_target * 9;

    let remaining_calories = daily_calorie_target - protein_calories - fat_calories;
    let daily_carb_target = (f64::from(remaining_calories) / 4.0).round().max(0.0) as i32;

    let daily_water_goal_ml = (weight_kg * 30.0 + 500.0).round() as i32;

    NutritionTargets {
        daily_calorie_target,
        daily_protein_target,
        daily_fat_target,
        daily_carb_target,
        daily_water_goal_ml,
    }
}

/// Saves new body metrics and the targets derived from them in one update.
pub async fn update_profile(
    db: &PgPool,
    user_id: Uuid,
    request: &UpdateProfileRequest,
) -> Result<NutritionTargets> {
    let targets = calculate_targets(
        request.weight_kg,
        request.height_cm,
        request.age,
        request.gender,
        request.activity_level,
        request.fitness_goal,
    );

    sqlx::query(
        "UPDATE users SET
             weight_kg = $2, height_cm = $3, age = $4, gender = $5,
             activity_level = $6, fitness_goal = $7, dietary_preference = $8,
             daily_calorie_target = $9, daily_protein_target = $10,
             daily_fat_target = $11, daily_carb_target = $12, daily_water_goal_ml = $13
         WHERE id = $1",
    )
    .bind(user_id)
    .bind(request.weight_kg)
    .bind(request.height_cm)
    .bind(request.age)
    .bind(request.gender)
    .bind(request.activity_level)
    .bind(request.fitness_goal)
    .bind(request.dietary_preference.as_deref())
    .bind(targets.daily_calorie_target)
    .bind(targets.daily_protein_target)
    .bind(targets.daily_fat_target)
    .bind(targets.daily_carb_target)
    .bind(targets.daily_water_goal_ml)
    .execute(db)
    .await?;

    Ok(targets)
}

#[derive(sqlx::FromRow)]
struct ProfileHead {
    id: Uuid,
    name: String,
    current_streak: i32,
    longest_streak: i32,
    total_active_days: i32,
    weight_kg: Option<f64>,
    height_cm: Option<f64>,
    age: Option<i32>,
    gender: Option<Gender>,
    activity_level: Option<ActivityLevel>,
    fitness_goal: Option<FitnessGoal>,
    dietary_preference: Option<String>,
    daily_calorie_target: Option<i32>,
    daily_protein_target: Option<i32>,
    daily_fat_target: Option<i32>,
    daily_carb_target: Option<i32>,
    daily_water_goal: Option<i32>,
    nutrition_streak: i32,
    longest_nutrition_streak: i32,
    followers_count: i64,
    following_count: i64,
    total_workouts: i64,
    lifetime_volume: Option<f64>,
    is_following: bool,
}

/// Public profile aggregate. Viewing is open; an authenticated viewer
/// additionally gets their follow state and a wider slice of the target's
/// shared workouts (own profile sees everything, followers see
/// follower-visible posts, everyone else only public ones).
pub async fn profile(
    db: &PgPool,
    viewer_id: Option<Uuid>,
    target_user_id: Uuid,
) -> Result<ProfileResponse> {
    let head = sqlx::query_as::<_, ProfileHead>(
        "SELECT u.id, u.name, u.current_streak, u.longest_streak, u.total_active_days,
                u.weight_kg, u.height_cm, u.age, u.gender, u.activity_level, u.fitness_goal,
                u.dietary_preference, u.daily_calorie_target, u.daily_protein_target,
                u.daily_fat_target, u.daily_carb_target,
                u.daily_water_goal_ml AS daily_water_goal,
                u.nutrition_streak, u.longest_nutrition_streak,
                (SELECT COUNT(*) FROM follows WHERE following_id = u.id) AS followers_count,
                (SELECT COUNT(*) FROM follows WHERE follower_id = u.id) AS following_count,
                (SELECT COUNT(*) FROM workout_sessions WHERE user_id = u.id) AS total_workouts,
                (SELECT SUM(total_volume) FROM workout_sessions WHERE user_id = u.id) AS lifetime_volume,
                EXISTS(SELECT 1 FROM follows WHERE follower_id = $2 AND following_id = u.id) AS is_following
         FROM users u
         WHERE u.id = $1",
    )
    .bind(target_user_id)
    .bind(viewer_id)
    .fetch_optional(db)
    .await?
    .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let favorite_muscle: Option<String> = sqlx::query_scalar(
        "SELECT e.muscle_group
         FROM exercises e
         JOIN workout_sessions ws ON e.session_id = ws.id
         WHERE ws.user_id = $1
         GROUP BY e.muscle_group
         ORDER BY SUM(e.total_volume) DESC
         LIMIT 1",
    )
    .bind(target_user_id)
    .fetch_optional(db)
    .await?;

    let achievements = achievement_service::earned_achievements(db, target_user_id).await?;

    let is_self = viewer_id == Some(target_user_id);
    let privacy_condition = if is_self {
        "TRUE"
    } else if head.is_following {
        "wp.privacy IN ('public', 'followers')"
    } else {
        "wp.privacy = 'public'"
    };

    let posts_sql = format!(
        "SELECT wp.id AS post_id, wp.caption, wp.privacy, wp.created_at,
                ws.id AS workout_id, ws.duration, ws.total_volume,
                (SELECT COUNT(*) FROM votes v
                 WHERE v.target_id = wp.id AND v.target_type = 'workout_post' AND v.vote_value = 1) AS upvote_count,
                (SELECT COUNT(*) FROM votes v
                 WHERE v.target_id = wp.id AND v.target_type = 'workout_post' AND v.vote_value = -1) AS downvote_count,
                COALESCE((SELECT v.vote_value FROM votes v
                          WHERE v.target_id = wp.id AND v.target_type = 'workout_post' AND v.user_id = $2), 0::smallint) AS user_vote
         FROM workout_posts wp
         JOIN workout_sessions ws ON wp.workout_id = ws.id
         WHERE wp.user_id = $1 AND ({privacy_condition})
         ORDER BY wp.created_at DESC
         LIMIT 10"
    );

    let post_rows = sqlx::query(&posts_sql)
        .bind(target_user_id)
        .bind(viewer_id)
        .fetch_all(db)
        .await?;

    let mut recent_posts = Vec::with_capacity(post_rows.len());
    for row in post_rows {
        let workout_id: Uuid = row.try_get("workout_id")?;
        let upvote_count: i64 = row.try_get("upvote_count")?;
        let downvote_count: i64 = row.try_get("downvote_count")?;

        let exercises = sqlx::query_as::<_, ExerciseSummary>(
            "SELECT name, muscle_group, total_volume AS volume FROM exercises WHERE session_id = $1",
        )
        .bind(workout_id)
        .fetch_all(db)
        .await?;

        recent_posts.push(SharedWorkoutPost {
            post_id: row.try_get("post_id")?,
            caption: row.try_get("caption")?,
            privacy: row.try_get::<PostPrivacy, _>("privacy")?,
            created_at: row.try_get("created_at")?,
            score: upvote_count - downvote_count,
            user_vote: row.try_get("user_vote")?,
            workout: ProfileWorkout {
                id: workout_id,
                duration: row.try_get("duration")?,
                total_volume: row.try_get("total_volume")?,
                exercises,
            },
        });
    }

    Ok(ProfileResponse {
        profile: ProfileSummary {
            id: head.id,
            name: head.name,
            followers: head.followers_count,
            following: head.following_count,
            total_workouts: head.total_workouts,
            lifetime_volume: head.lifetime_volume.unwrap_or(0.0),
            current_streak: head.current_streak,
            longest_streak: head.longest_streak,
            total_active_days: head.total_active_days,
            favorite_muscle: favorite_muscle.unwrap_or_else(|| "None".to_string()),
            is_following: head.is_following,
            achievements,
            weight_kg: head.weight_kg,
            height_cm: head.height_cm,
            age: head.age,
            gender: head.gender,
            activity_level: head.activity_level,
            fitness_goal: head.fitness_goal,
            dietary_preference: head.dietary_preference,
            daily_calorie_target: head.daily_calorie_target,
            daily_protein_target: head.daily_protein_target,
            daily_fat_target: head.daily_fat_target,
            daily_carb_target: head.daily_carb_target,
            daily_water_goal: head.daily_water_goal,
            nutrition_streak: head.nutrition_streak,
            longest_nutrition_streak: head.longest_nutrition_streak,
        },
        recent_posts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn male_moderate_maintenance_targets() {
        // BMR = 10*80 + 6.25*180 - 5*30 + 5 = 1780; TDEE = round(1780 * 1.55) = 2759
        let targets = calculate_targets(
            80.0,
            180.0,
            30,
            Gender::Male,
            ActivityLevel::Moderate,
            FitnessGoal::Maintenance,
        );
        assert_eq!(targets.daily_calorie_target, 2759);
        assert_eq!(targets.daily_protein_target, 160);
        // fat = round(2759 * 0.25 / 9) = 77; carbs = round((2759 - 640 - 693) / 4) = 357
        assert_eq!(targets.daily_fat_target, 77);
        assert_eq!(targets.daily_carb_target, 357);
        assert_eq!(targets.daily_water_goal_ml, 2900);
    }

    #[test]
    fn fat_loss_takes_five_hundred_off() {
        let maintenance = calculate_targets(
            80.0,
            180.0,
            30,
            Gender::Male,
            ActivityLevel::Moderate,
            FitnessGoal::Maintenance,
        );
        let cutting = calculate_targets(
            80.0,
            180.0,
            30,
            Gender::Male,
            ActivityLevel::Moderate,
            FitnessGoal::FatLoss,
        );
        assert_eq!(
            cutting.daily_calorie_target,
            maintenance.daily_calorie_target - 500
        );
    }

    #[test]
    fn muscle_gain_adds_three_hundred() {
        let maintenance = calculate_targets(
            60.0,
            165.0,
            25,
            Gender::Female,
            ActivityLevel::Light,
            FitnessGoal::Maintenance,
        );
        let bulking = calculate_targets(
            60.0,
            165.0,
            25,
            Gender::Female,
            ActivityLevel::Light,
            FitnessGoal::MuscleGain,
        );
        assert_eq!(
            bulking.daily_calorie_target,
            maintenance.daily_calorie_target + 300
        );
    }

    #[test]
    fn non_male_genders_share_the_same_offset() {
        let female = calculate_targets(
            60.0,
            165.0,
            25,
            Gender::Female,
            ActivityLevel::Sedentary,
            FitnessGoal::Maintenance,
        );
        let other = calculate_targets(
            60.0,
            165.0,
            25,
            Gender::Other,
            ActivityLevel::Sedentary,
            FitnessGoal::Maintenance,
        );
        assert_eq!(female.daily_calorie_target, other.daily_calorie_target);
    }

    #[test]
    fn carbs_never_go_negative() {
        // Protein and fat calories can exceed a small calorie target on a
        // cut; the carb share clamps at zero instead of going negative.
        let targets = calculate_targets(
            150.0,
            150.0,
            80,
            Gender::Female,
            ActivityLevel::Sedentary,
            FitnessGoal::FatLoss,
        );
        assert!(targets.daily_carb_target >= 0);
    }

    #[test]
    fn water_goal_scales_with_weight() {
        let targets = calculate_targets(
            70.0,
            175.0,
            28,
            Gender::Male,
            ActivityLevel::Light,
            FitnessGoal::Maintenance,
        );
        assert_eq!(targets.daily_water_goal_ml, 2600);
    }
}
