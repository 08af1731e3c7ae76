use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::post::CommunityPostItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "community_privacy", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CommunityPrivacy {
    Public,
    Private,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "member_role", rename_all = "lowercase")]
pub enum MemberRole {
    Moderator,
    Member,
}

#[derive(Debug, Validate, Deserialize)]
pub struct CreateCommunityRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub privacy: Option<CommunityPrivacy>,
    #[validate(length(max = 2048))]
    pub cover_image: Option<String>,
    #[validate(length(max = 5000))]
    pub rules: Option<String>,
    #[validate(length(max = 500))]
    pub tags: Option<String>,
}

#[derive(Debug, Serialize, FromRow)]
pub struct CommunityListItem {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub cover_image: Option<String>,
    pub rules: Option<String>,
    pub tags: Option<String>,
    pub privacy: CommunityPrivacy,
    pub creator_id: Option<Uuid>,
    pub member_count: i32,
    pub created_at: DateTime<Utc>,
    pub is_member: bool,
}

#[derive(Debug, Serialize)]
pub struct CommunityDetail {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub privacy: CommunityPrivacy,
    pub creator: Option<String>,
    pub members: i32,
    pub cover_image: Option<String>,
    pub rules: Option<String>,
    pub tags: Option<String>,
    pub is_member: bool,
}

#[derive(Debug, Serialize)]
pub struct CommunityPage {
    pub community: CommunityDetail,
    pub posts: Vec<CommunityPostItem>,
}
