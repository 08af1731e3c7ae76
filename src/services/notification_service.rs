use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::Result,
    models::{NotificationIntent, NotificationItem, NotificationList},
};

pub async fn emit(db: &PgPool, intent: NotificationIntent) -> Result<()> {
    sqlx::query(
        "INSERT INTO notifications (user_id, actor_id, type, reference_id) VALUES ($1, $2, $3, $4)",
    )
    .bind(intent.recipient)
    .bind(intent.actor)
    .bind(intent.kind)
    .bind(intent.reference_id)
    .execute(db)
    .await?;
    Ok(())
}

/// Records an intent if there is one. The write that produced the intent has
/// already committed, so a failure here is logged rather than surfaced.
pub async fn dispatch(db: &PgPool, intent: Option<NotificationIntent>) {
    let Some(intent) = intent else { return };
    if let Err(e) = emit(db, intent).await {
        tracing::error!("Failed to record notification: {}", e);
    }
}

pub async fn list(db: &PgPool, user_id: Uuid) -> Result<NotificationList> {
    let notifications = sqlx::query_as::<_, NotificationItem>(
        "SELECT n.id, n.type AS kind, n.reference_id AS target_id, n.is_read, n.created_at,
                u.id AS actor_id, u.name AS actor_name
         FROM notifications n
         JOIN users u ON n.actor_id = u.id
         WHERE n.user_id = $1
         ORDER BY n.created_at DESC
         LIMIT 50",
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;

    let unread: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND is_read = FALSE",
    )
    .bind(user_id)
    .fetch_one(db)
    .await?;

    Ok(NotificationList { notifications, unread })
}

pub async fn mark_all_read(db: &PgPool, user_id: Uuid) -> Result<()> {
    sqlx::query("UPDATE notifications SET is_read = TRUE WHERE user_id = $1 AND is_read = FALSE")
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(())
}
