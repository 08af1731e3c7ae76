use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::{
        FeedAuthor, FeedPost, FeedWorkout, NotificationIntent, NotificationType, PostPrivacy,
        ShareWorkoutRequest,
    },
    services::workout_service,
};

pub async fn follow(db: &PgPool, follower_id: Uuid, following_id: Uuid) -> Result<NotificationIntent> {
    if follower_id == following_id {
        return Err(AppError::BadRequest("Cannot follow yourself".to_string()));
    }

    let target: Option<Uuid> = sqlx::query_scalar("SELECT id FROM users WHERE id = $1")
        .bind(following_id)
        .fetch_optional(db)
        .await?;
    if target.is_none() {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    let inserted = sqlx::query("INSERT INTO follows (follower_id, following_id) VALUES ($1, $2)")
        .bind(follower_id)
        .bind(following_id)
        .execute(db)
        .await;

    match inserted {
        Ok(_) => Ok(NotificationIntent {
            recipient: following_id,
            actor: follower_id,
            kind: NotificationType::Follow,
            reference_id: None,
        }),
        Err(err)
            if err
                .as_database_error()
                .is_some_and(|db_err| db_err.is_unique_violation()) =>
        {
            Err(AppError::Conflict("Already following this user".to_string()))
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn unfollow(db: &PgPool, follower_id: Uuid, following_id: Uuid) -> Result<()> {
    let deleted = sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND following_id = $2")
        .bind(follower_id)
        .bind(following_id)
        .execute(db)
        .await?;

    if deleted.rows_affected() == 0 {
        return Err(AppError::NotFound("Not following this user".to_string()));
    }
    Ok(())
}

/// Publishes a workout as a post. Each session can be shared once, and only
/// by its owner.
pub async fn share_workout(
    db: &PgPool,
    user_id: Uuid,
    request: &ShareWorkoutRequest,
) -> Result<Uuid> {
    let owned: Option<Uuid> = sqlx::query_scalar(
        "SELECT id FROM workout_sessions WHERE id = $1 AND user_id = $2",
    )
    .bind(request.workout_id)
    .bind(user_id)
    .fetch_optional(db)
    .await?;
    if owned.is_none() {
        return Err(AppError::Authorization(
            "Workout not found or you don't own it".to_string(),
        ));
    }

    let post_id = Uuid::new_v4();
    let inserted = sqlx::query(
        "INSERT INTO workout_posts (id, user_id, workout_id, caption, privacy)
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(post_id)
    .bind(user_id)
    .bind(request.workout_id)
    .bind(request.caption.as_deref())
    .bind(request.privacy.unwrap_or(PostPrivacy::Public))
    .execute(db)
    .await;

    match inserted {
        Ok(_) => Ok(post_id),
        Err(err)
            if err
                .as_database_error()
                .is_some_and(|db_err| db_err.is_unique_violation()) =>
        {
            Err(AppError::Conflict("This workout is already shared".to_string()))
        }
        Err(err) => Err(err.into()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedSort {
    Newest,
    Trending,
}

impl FeedSort {
    pub fn from_query(raw: Option<&str>) -> Self {
        match raw {
            Some("trending") => FeedSort::Trending,
            _ => FeedSort::Newest,
        }
    }
}

/// The viewer's feed: their own posts, follower-visible posts from people
/// they follow, and everything public. Trending ranks by vote score with
/// recency as the tiebreak.
pub async fn feed(db: &PgPool, viewer_id: Uuid, sort: FeedSort) -> Result<Vec<FeedPost>> {
    let order_by = match sort {
        FeedSort::Trending => "ORDER BY score DESC, created_at DESC",
        FeedSort::Newest => "ORDER BY created_at DESC",
    };

    let feed_sql = format!(
        "SELECT wp.id AS post_id, wp.caption, wp.privacy, wp.created_at,
                u.id AS author_id, u.name AS author_name,
                ws.id AS workout_id, ws.duration, ws.total_volume,
                (SELECT COUNT(*) FROM votes v
                 WHERE v.target_id = wp.id AND v.target_type = 'workout_post' AND v.vote_value = 1) AS upvote_count,
                (SELECT COUNT(*) FROM votes v
                 WHERE v.target_id = wp.id AND v.target_type = 'workout_post' AND v.vote_value = -1) AS downvote_count,
                (SELECT COALESCE(SUM(v.vote_value), 0) FROM votes v
                 WHERE v.target_id = wp.id AND v.target_type = 'workout_post') AS score,
                COALESCE((SELECT v.vote_value FROM votes v
                          WHERE v.target_id = wp.id AND v.target_type = 'workout_post' AND v.user_id = $1), 0::smallint) AS user_vote
         FROM workout_posts wp
         JOIN users u ON wp.user_id = u.id
         JOIN workout_sessions ws ON wp.workout_id = ws.id
         WHERE wp.user_id = $1
            OR (wp.user_id IN (SELECT following_id FROM follows WHERE follower_id = $1)
                AND wp.privacy IN ('public', 'followers'))
            OR wp.privacy = 'public'
         {order_by}
         LIMIT 50"
    );

    let rows = sqlx::query(&feed_sql).bind(viewer_id).fetch_all(db).await?;

    let mut feed = Vec::with_capacity(rows.len());
    for row in rows {
        let workout_id: Uuid = row.try_get("workout_id")?;
        let exercises = workout_service::exercises_with_sets(db, workout_id).await?;

        feed.push(FeedPost {
            post_id: row.try_get("post_id")?,
            author: FeedAuthor {
                id: row.try_get("author_id")?,
                name: row.try_get("author_name")?,
            },
            caption: row.try_get("caption")?,
            privacy: row.try_get::<PostPrivacy, _>("privacy")?,
            created_at: row.try_get("created_at")?,
            upvote_count: row.try_get("upvote_count")?,
            downvote_count: row.try_get("downvote_count")?,
            score: row.try_get("score")?,
            user_vote: row.try_get("user_vote")?,
            workout: FeedWorkout {
                id: workout_id,
                duration: row.try_get("duration")?,
                total_volume: row.try_get("total_volume")?,
                exercises,
            },
        });
    }

    Ok(feed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_parses_trending_and_defaults_to_newest() {
        assert_eq!(FeedSort::from_query(Some("trending")), FeedSort::Trending);
        assert_eq!(FeedSort::from_query(Some("newest")), FeedSort::Newest);
        assert_eq!(FeedSort::from_query(Some("anything")), FeedSort::Newest);
        assert_eq!(FeedSort::from_query(None), FeedSort::Newest);
    }
}
