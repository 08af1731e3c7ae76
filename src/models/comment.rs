use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Validate, Deserialize)]
pub struct CreateCommentRequest {
    pub post_id: Uuid,
    pub parent_comment_id: Option<Uuid>,
    #[validate(length(min = 1, max = 10000))]
    pub content: String,
}

// Flat row as queried; threading happens in memory afterwards
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CommentRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub post_id: Uuid,
    pub parent_comment_id: Option<Uuid>,
    pub content: String,
    pub vote_score: i32,
    pub created_at: DateTime<Utc>,
    pub author_name: String,
    pub user_vote: i16,
}

#[derive(Debug, Serialize)]
pub struct CommentNode {
    #[serde(flatten)]
    pub comment: CommentRow,
    pub replies: Vec<CommentNode>,
}
