use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::comment::CommentNode;

#[derive(Debug, Validate, Deserialize)]
pub struct CreatePostRequest {
    #[validate(length(min = 1, max = 300))]
    pub title: String,
    #[validate(length(min = 1, max = 40000))]
    pub body: String,
    #[validate(length(max = 2048))]
    pub image_url: Option<String>,
}

// Row shape for community post listings
#[derive(Debug, Serialize, FromRow)]
pub struct CommunityPostItem {
    pub post_id: Uuid,
    pub title: String,
    pub body: String,
    pub image_url: Option<String>,
    pub score: i32,
    pub upvote_count: i32,
    pub downvote_count: i32,
    pub created_at: DateTime<Utc>,
    pub is_pinned: bool,
    pub is_locked: bool,
    pub author_id: Uuid,
    pub author_name: String,
    pub comment_count: i64,
    pub user_vote: i16,
}

#[derive(Debug, Serialize, FromRow)]
pub struct PostDetail {
    pub id: Uuid,
    pub community_id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub body: String,
    pub image_url: Option<String>,
    pub is_pinned: bool,
    pub is_locked: bool,
    pub upvote_count: i32,
    pub downvote_count: i32,
    pub score: i32,
    pub created_at: DateTime<Utc>,
    pub edited_at: Option<DateTime<Utc>>,
    pub author_name: String,
    pub comment_count: i64,
    pub user_vote: i16,
}

#[derive(Debug, Serialize)]
pub struct PostPage {
    pub post: PostDetail,
    pub comments: Vec<CommentNode>,
}
