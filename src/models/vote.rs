use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "vote_target", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum VoteTarget {
    Post,
    Comment,
    WorkoutPost,
}

// vote_value: 1 upvote, -1 downvote, 0 explicit removal
#[derive(Debug, Validate, Deserialize)]
pub struct CastVoteRequest {
    pub target_id: Uuid,
    pub target_type: VoteTarget,
    #[validate(range(min = -1, max = 1))]
    pub vote_value: i16,
}

// Recomputed totals for the target, returned to the caller after every vote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VoteTotals {
    pub score: i64,
    pub upvote_count: i64,
    pub downvote_count: i64,
}
