use std::collections::{HashMap, HashSet};

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::{CommentNode, CommentRow, CreateCommentRequest, NotificationIntent, NotificationType},
};

/// Inserts a comment and resolves who should hear about it: the parent
/// comment's author for replies, the post's author otherwise. The caller
/// emits the returned intent after the write lands.
pub async fn create_comment(
    db: &PgPool,
    user_id: Uuid,
    request: &CreateCommentRequest,
) -> Result<(Uuid, Option<NotificationIntent>)> {
    let post_owner: Option<Uuid> =
        sqlx::query_scalar("SELECT user_id FROM community_posts WHERE id = $1")
            .bind(request.post_id)
            .fetch_optional(db)
            .await?;
    let post_owner = post_owner.ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    let recipient = match request.parent_comment_id {
        Some(parent_id) => {
            let parent_owner: Option<Uuid> =
                sqlx::query_scalar("SELECT user_id FROM comments WHERE id = $1 AND post_id = $2")
                    .bind(parent_id)
                    .bind(request.post_id)
                    .fetch_optional(db)
                    .await?;
            parent_owner.ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?
        }
        None => post_owner,
    };

    let comment_id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO comments (id, post_id, parent_comment_id, user_id, content)
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(comment_id)
    .bind(request.post_id)
    .bind(request.parent_comment_id)
    .bind(user_id)
    .bind(&request.content)
    .execute(db)
    .await?;

    let intent = (recipient != user_id).then_some(NotificationIntent {
        recipient,
        actor: user_id,
        kind: NotificationType::CommentPost,
        reference_id: Some(request.post_id),
    });

    Ok((comment_id, intent))
}

/// Arranges a flat, pre-sorted comment listing into a reply tree. Comments
/// whose parent is gone are lifted to the root level, and the input order is
/// preserved at every level.
pub fn build_comment_tree(rows: Vec<CommentRow>) -> Vec<CommentNode> {
    let ids: HashSet<Uuid> = rows.iter().map(|row| row.id).collect();

    let mut children: HashMap<Uuid, Vec<CommentRow>> = HashMap::new();
    let mut roots: Vec<CommentRow> = Vec::new();
    for row in rows {
        match row.parent_comment_id {
            Some(parent_id) if ids.contains(&parent_id) => {
                children.entry(parent_id).or_default().push(row);
            }
            _ => roots.push(row),
        }
    }

    roots
        .into_iter()
        .map(|row| attach_replies(row, &mut children))
        .collect()
}

fn attach_replies(row: CommentRow, children: &mut HashMap<Uuid, Vec<CommentRow>>) -> CommentNode {
    let replies = children
        .remove(&row.id)
        .unwrap_or_default()
        .into_iter()
        .map(|child| attach_replies(child, children))
        .collect();

    CommentNode { comment: row, replies }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn row(id: Uuid, parent: Option<Uuid>) -> CommentRow {
        CommentRow {
            id,
            user_id: Uuid::new_v4(),
            post_id: Uuid::new_v4(),
            parent_comment_id: parent,
            content: "nice lift".to_string(),
            vote_score: 0,
            created_at: Utc::now(),
            author_name: "sam".to_string(),
            user_vote: 0,
        }
    }

    #[test]
    fn nests_replies_under_their_parents() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        let d = Uuid::new_v4();

        let tree = build_comment_tree(vec![
            row(a, None),
            row(b, Some(a)),
            row(c, Some(a)),
            row(d, Some(b)),
        ]);

        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].comment.id, a);
        assert_eq!(tree[0].replies.len(), 2);
        assert_eq!(tree[0].replies[0].comment.id, b);
        assert_eq!(tree[0].replies[1].comment.id, c);
        assert_eq!(tree[0].replies[0].replies[0].comment.id, d);
    }

    #[test]
    fn lifts_orphaned_replies_to_the_root() {
        let a = Uuid::new_v4();
        let orphan = Uuid::new_v4();

        let tree = build_comment_tree(vec![row(a, None), row(orphan, Some(Uuid::new_v4()))]);

        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].comment.id, a);
        assert_eq!(tree[1].comment.id, orphan);
        assert!(tree[1].replies.is_empty());
    }

    #[test]
    fn preserves_input_order_at_every_level() {
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let reply_one = Uuid::new_v4();
        let reply_two = Uuid::new_v4();

        let tree = build_comment_tree(vec![
            row(first, None),
            row(second, None),
            row(reply_one, Some(second)),
            row(reply_two, Some(second)),
        ]);

        assert_eq!(tree[0].comment.id, first);
        assert_eq!(tree[1].comment.id, second);
        assert_eq!(tree[1].replies[0].comment.id, reply_one);
        assert_eq!(tree[1].replies[1].comment.id, reply_two);
    }

    #[test]
    fn empty_listing_builds_an_empty_tree() {
        assert!(build_comment_tree(Vec::new()).is_empty());
    }
}
