use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::{
    error::Result,
    models::{
        AchievementType, EarnedAchievement, NotificationIntent, NotificationType, StreakSnapshot,
    },
};

/// Insert-if-absent grant. The unique (user, achievement) pair makes a
/// repeat grant a no-op, and the return value says whether THIS call was the
/// one that earned it.
pub async fn grant_achievement(
    conn: &mut PgConnection,
    user_id: Uuid,
    kind: AchievementType,
) -> Result<bool> {
    let granted: Option<Uuid> = sqlx::query_scalar(
        "INSERT INTO user_achievements (user_id, achievement_type)
         VALUES ($1, $2)
         ON CONFLICT (user_id, achievement_type) DO NOTHING
         RETURNING id",
    )
    .bind(user_id)
    .bind(kind)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(granted.is_some())
}

/// Milestone checks run against the streak snapshot a workout save produced.
/// Both are equality checks, so a snapshot that jumped past the milestone
/// (for example after backfilled data) does not grant retroactively.
pub async fn workout_achievements(
    conn: &mut PgConnection,
    user_id: Uuid,
    streaks: StreakSnapshot,
) -> Result<Option<NotificationIntent>> {
    let mut intent = None;

    if streaks.total_active_days == 1
        && grant_achievement(conn, user_id, AchievementType::FirstWorkout).await?
    {
        // Self-addressed celebration; only fires on the actual grant so a
        // second session on day one stays quiet.
        intent = Some(NotificationIntent {
            recipient: user_id,
            actor: user_id,
            kind: NotificationType::Achievement,
            reference_id: None,
        });
    }

    if streaks.current_streak == 7 {
        grant_achievement(conn, user_id, AchievementType::SevenDayStreak).await?;
    }

    Ok(intent)
}

/// Nutrition milestone, checked after a calorie-window streak bump.
pub async fn nutrition_achievements(
    conn: &mut PgConnection,
    user_id: Uuid,
    nutrition_streak: i32,
) -> Result<()> {
    if nutrition_streak == 7 {
        grant_achievement(conn, user_id, AchievementType::SevenDayNutritionStreak).await?;
    }
    Ok(())
}

pub async fn earned_achievements(db: &PgPool, user_id: Uuid) -> Result<Vec<EarnedAchievement>> {
    let achievements = sqlx::query_as::<_, EarnedAchievement>(
        "SELECT achievement_type, earned_at
         FROM user_achievements
         WHERE user_id = $1
         ORDER BY earned_at DESC",
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;

    Ok(achievements)
}
