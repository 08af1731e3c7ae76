use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::Result,
    models::{CastVoteRequest, NotificationIntent, NotificationType, VoteTarget, VoteTotals},
};

/// What a requested vote value does to the voter's existing row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteAction {
    Remove,
    Set(i16),
}

/// A zero always clears, and repeating the current vote toggles it off.
/// Anything else lands as an upsert of the requested value.
pub fn resolve_vote(existing: Option<i16>, requested: i16) -> VoteAction {
    if requested == 0 || existing == Some(requested) {
        VoteAction::Remove
    } else {
        VoteAction::Set(requested)
    }
}

/// Whether this request turns into a fresh upvote, which is the only vote
/// transition that notifies the content owner.
pub fn is_new_upvote(existing: Option<i16>, requested: i16) -> bool {
    requested == 1 && existing != Some(1)
}

/// Totals recomputed from the actual vote rows, never by nudging counters.
pub fn tally(values: &[i16]) -> VoteTotals {
    let upvote_count = values.iter().filter(|&&v| v == 1).count() as i64;
    let downvote_count = values.iter().filter(|&&v| v == -1).count() as i64;
    VoteTotals {
        score: upvote_count - downvote_count,
        upvote_count,
        downvote_count,
    }
}

/// Applies one user's vote to a target and recounts that target's totals,
/// all in a single transaction. The target row (when it exists) is locked up
/// front so concurrent votes recount against a settled vote set; a vote on a
/// vanished target still records, it just notifies nobody.
pub async fn cast_vote(
    db: &PgPool,
    voter_id: Uuid,
    request: &CastVoteRequest,
) -> Result<(VoteTotals, Option<NotificationIntent>)> {
    let mut tx = db.begin().await?;

    let owner_id: Option<Uuid> = match request.target_type {
        VoteTarget::Post => {
            sqlx::query_scalar("SELECT user_id FROM community_posts WHERE id = $1 FOR UPDATE")
                .bind(request.target_id)
                .fetch_optional(&mut *tx)
                .await?
        }
        VoteTarget::Comment => {
            sqlx::query_scalar("SELECT user_id FROM comments WHERE id = $1 FOR UPDATE")
                .bind(request.target_id)
                .fetch_optional(&mut *tx)
                .await?
        }
        VoteTarget::WorkoutPost => {
            sqlx::query_scalar("SELECT user_id FROM workout_posts WHERE id = $1 FOR UPDATE")
                .bind(request.target_id)
                .fetch_optional(&mut *tx)
                .await?
        }
    };

    let existing: Option<i16> = sqlx::query_scalar(
        "SELECT vote_value FROM votes
         WHERE user_id = $1 AND target_id = $2 AND target_type = $3",
    )
    .bind(voter_id)
    .bind(request.target_id)
    .bind(request.target_type)
    .fetch_optional(&mut *tx)
    .await?;

    match resolve_vote(existing, request.vote_value) {
        VoteAction::Remove => {
            sqlx::query(
                "DELETE FROM votes
                 WHERE user_id = $1 AND target_id = $2 AND target_type = $3",
            )
            .bind(voter_id)
            .bind(request.target_id)
            .bind(request.target_type)
            .execute(&mut *tx)
            .await?;
        }
        VoteAction::Set(value) => {
            sqlx::query(
                "INSERT INTO votes (user_id, target_id, target_type, vote_value)
                 VALUES ($1, $2, $3, $4)
                 ON CONFLICT (user_id, target_id, target_type)
                 DO UPDATE SET vote_value = EXCLUDED.vote_value, created_at = NOW()",
            )
            .bind(voter_id)
            .bind(request.target_id)
            .bind(request.target_type)
            .bind(value)
            .execute(&mut *tx)
            .await?;
        }
    }

    let values: Vec<i16> = sqlx::query_scalar(
        "SELECT vote_value FROM votes WHERE target_id = $1 AND target_type = $2",
    )
    .bind(request.target_id)
    .bind(request.target_type)
    .fetch_all(&mut *tx)
    .await?;

    let totals = tally(&values);

    match request.target_type {
        VoteTarget::Post => {
            sqlx::query(
                "UPDATE community_posts
                 SET upvote_count = $2, downvote_count = $3, score = $4
                 WHERE id = $1",
            )
            .bind(request.target_id)
            .bind(totals.upvote_count as i32)
            .bind(totals.downvote_count as i32)
            .bind(totals.score as i32)
            .execute(&mut *tx)
            .await?;
        }
        VoteTarget::Comment => {
            sqlx::query("UPDATE comments SET vote_score = $2 WHERE id = $1")
                .bind(request.target_id)
                .bind(totals.score as i32)
                .execute(&mut *tx)
                .await?;
        }
        // Workout posts carry no counter columns; their totals are always
        // derived from vote rows at read time.
        VoteTarget::WorkoutPost => {}
    }

    tx.commit().await?;

    let intent = match owner_id {
        Some(owner) if owner != voter_id && is_new_upvote(existing, request.vote_value) => {
            Some(NotificationIntent {
                recipient: owner,
                actor: voter_id,
                kind: NotificationType::UpvotePost,
                reference_id: Some(request.target_id),
            })
        }
        _ => None,
    };

    Ok((totals, intent))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_always_removes() {
        assert_eq!(resolve_vote(None, 0), VoteAction::Remove);
        assert_eq!(resolve_vote(Some(1), 0), VoteAction::Remove);
        assert_eq!(resolve_vote(Some(-1), 0), VoteAction::Remove);
    }

    #[test]
    fn repeating_the_same_vote_toggles_it_off() {
        assert_eq!(resolve_vote(Some(1), 1), VoteAction::Remove);
        assert_eq!(resolve_vote(Some(-1), -1), VoteAction::Remove);
    }

    #[test]
    fn new_and_flipped_votes_are_upserts() {
        assert_eq!(resolve_vote(None, 1), VoteAction::Set(1));
        assert_eq!(resolve_vote(None, -1), VoteAction::Set(-1));
        assert_eq!(resolve_vote(Some(-1), 1), VoteAction::Set(1));
        assert_eq!(resolve_vote(Some(1), -1), VoteAction::Set(-1));
    }

    #[test]
    fn only_fresh_upvotes_notify() {
        assert!(is_new_upvote(None, 1));
        assert!(is_new_upvote(Some(-1), 1));
        // Re-upvoting toggles off, so it is not a new upvote
        assert!(!is_new_upvote(Some(1), 1));
        assert!(!is_new_upvote(None, -1));
        assert!(!is_new_upvote(None, 0));
        assert!(!is_new_upvote(Some(1), 0));
    }

    #[test]
    fn tally_counts_each_side_and_scores_the_difference() {
        let totals = tally(&[1, 1, 1, -1, -1]);
        assert_eq!(totals.upvote_count, 3);
        assert_eq!(totals.downvote_count, 2);
        assert_eq!(totals.score, 1);
    }

    #[test]
    fn tally_of_nothing_is_all_zeros() {
        let totals = tally(&[]);
        assert_eq!(totals.upvote_count, 0);
        assert_eq!(totals.downvote_count, 0);
        assert_eq!(totals.score, 0);
    }

    #[test]
    fn score_always_equals_upvotes_minus_downvotes() {
        let cases: &[&[i16]] = &[&[], &[1], &[-1], &[1, -1], &[1, 1, -1, -1, -1]];
        for values in cases {
            let totals = tally(values);
            assert_eq!(totals.score, totals.upvote_count - totals.downvote_count);
        }
    }
}
