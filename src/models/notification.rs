use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    Follow,
    UpvotePost,
    CommentPost,
    Achievement,
    Mention,
}

// A notification a mutation wants to send, emitted only after the surrounding
// transaction commits so rolled-back writes never notify anyone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationIntent {
    pub recipient: Uuid,
    pub actor: Uuid,
    pub kind: NotificationType,
    pub reference_id: Option<Uuid>,
}

#[derive(Debug, Serialize, FromRow)]
pub struct NotificationItem {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub target_id: Option<Uuid>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    pub actor_id: Uuid,
    pub actor_name: String,
}

#[derive(Debug, Serialize)]
pub struct NotificationList {
    pub notifications: Vec<NotificationItem>,
    pub unread: i64,
}
