use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::{
        CommentRow, CommunityDetail, CommunityListItem, CommunityPage, CommunityPostItem,
        CommunityPrivacy, CreateCommunityRequest, CreatePostRequest, MemberRole, PostDetail,
        PostPage,
    },
    services::comment_service,
};

pub async fn list(db: &PgPool, user_id: Uuid) -> Result<Vec<CommunityListItem>> {
    let communities = sqlx::query_as::<_, CommunityListItem>(
        "SELECT c.*,
                EXISTS(SELECT 1 FROM community_members cm
                       WHERE cm.community_id = c.id AND cm.user_id = $1) AS is_member
         FROM communities c
         ORDER BY c.member_count DESC, c.created_at DESC",
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;

    Ok(communities)
}

/// Creates a community with the caller as its first member and moderator.
pub async fn create(db: &PgPool, user_id: Uuid, request: &CreateCommunityRequest) -> Result<Uuid> {
    let mut tx = db.begin().await?;

    let community_id = Uuid::new_v4();
    let inserted = sqlx::query(
        "INSERT INTO communities (id, name, description, privacy, cover_image, rules, tags, creator_id, member_count)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 1)",
    )
    .bind(community_id)
    .bind(&request.name)
    .bind(request.description.as_deref().unwrap_or(""))
    .bind(request.privacy.unwrap_or(CommunityPrivacy::Public))
    .bind(request.cover_image.as_deref())
    .bind(request.rules.as_deref())
    .bind(request.tags.as_deref())
    .bind(user_id)
    .execute(&mut *tx)
    .await;

    if let Err(err) = inserted {
        if err
            .as_database_error()
            .is_some_and(|db_err| db_err.is_unique_violation())
        {
            return Err(AppError::Conflict("Community name already taken".to_string()));
        }
        return Err(err.into());
    }

    sqlx::query("INSERT INTO community_members (community_id, user_id, role) VALUES ($1, $2, $3)")
        .bind(community_id)
        .bind(user_id)
        .bind(MemberRole::Moderator)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(community_id)
}

/// A community's header plus its post listing. Posts in private communities
/// are only visible to members.
pub async fn community_page(db: &PgPool, user_id: Uuid, community_id: Uuid) -> Result<CommunityPage> {
    let head = sqlx::query(
        "SELECT c.id, c.name, c.description, c.privacy, c.member_count,
                c.cover_image, c.rules, c.tags,
                u.name AS creator_name,
                EXISTS(SELECT 1 FROM community_members cm
                       WHERE cm.community_id = c.id AND cm.user_id = $2) AS is_member
         FROM communities c
         LEFT JOIN users u ON c.creator_id = u.id
         WHERE c.id = $1",
    )
    .bind(community_id)
    .bind(user_id)
    .fetch_optional(db)
    .await?
    .ok_or_else(|| AppError::NotFound("Community not found".to_string()))?;

    let privacy: CommunityPrivacy = head.try_get("privacy")?;
    let is_member: bool = head.try_get("is_member")?;

    let community = CommunityDetail {
        id: head.try_get("id")?,
        name: head.try_get("name")?,
        description: head.try_get("description")?,
        privacy,
        creator: head.try_get("creator_name")?,
        members: head.try_get("member_count")?,
        cover_image: head.try_get("cover_image")?,
        rules: head.try_get("rules")?,
        tags: head.try_get("tags")?,
        is_member,
    };

    let posts = if privacy == CommunityPrivacy::Public || is_member {
        post_listing(db, user_id, community_id).await?
    } else {
        Vec::new()
    };

    Ok(CommunityPage { community, posts })
}

async fn post_listing(db: &PgPool, user_id: Uuid, community_id: Uuid) -> Result<Vec<CommunityPostItem>> {
    let posts = sqlx::query_as::<_, CommunityPostItem>(
        "SELECT cp.id AS post_id, cp.title, cp.body, cp.image_url,
                cp.score, cp.upvote_count, cp.downvote_count,
                cp.created_at, cp.is_pinned, cp.is_locked,
                u.id AS author_id, u.name AS author_name,
                (SELECT COUNT(*) FROM comments c WHERE c.post_id = cp.id) AS comment_count,
                COALESCE((SELECT v.vote_value FROM votes v
                          WHERE v.target_id = cp.id AND v.target_type = 'post' AND v.user_id = $2),
                         0::smallint) AS user_vote
         FROM community_posts cp
         JOIN users u ON cp.user_id = u.id
         WHERE cp.community_id = $1
         ORDER BY cp.is_pinned DESC, cp.created_at DESC
         LIMIT 50",
    )
    .bind(community_id)
    .bind(user_id)
    .fetch_all(db)
    .await?;

    Ok(posts)
}

pub async fn join(db: &PgPool, user_id: Uuid, community_id: Uuid) -> Result<()> {
    let mut tx = db.begin().await?;

    let privacy: Option<CommunityPrivacy> =
        sqlx::query_scalar("SELECT privacy FROM communities WHERE id = $1 FOR UPDATE")
            .bind(community_id)
            .fetch_optional(&mut *tx)
            .await?;

    match privacy {
        None => return Err(AppError::NotFound("Community not found".to_string())),
        Some(CommunityPrivacy::Private) => {
            return Err(AppError::Authorization(
                "Cannot join private communities this way".to_string(),
            ));
        }
        Some(CommunityPrivacy::Public) => {}
    }

    let inserted =
        sqlx::query("INSERT INTO community_members (community_id, user_id, role) VALUES ($1, $2, $3)")
            .bind(community_id)
            .bind(user_id)
            .bind(MemberRole::Member)
            .execute(&mut *tx)
            .await;

    if let Err(err) = inserted {
        if err
            .as_database_error()
            .is_some_and(|db_err| db_err.is_unique_violation())
        {
            return Err(AppError::Conflict("Already a member".to_string()));
        }
        return Err(err.into());
    }

    recount_members(&mut tx, community_id).await?;
    tx.commit().await?;
    Ok(())
}

pub async fn leave(db: &PgPool, user_id: Uuid, community_id: Uuid) -> Result<()> {
    let mut tx = db.begin().await?;

    let creator_id: Option<Option<Uuid>> =
        sqlx::query_scalar("SELECT creator_id FROM communities WHERE id = $1 FOR UPDATE")
            .bind(community_id)
            .fetch_optional(&mut *tx)
            .await?;

    let creator_id =
        creator_id.ok_or_else(|| AppError::NotFound("Community not found".to_string()))?;

    let membership: Option<MemberRole> = sqlx::query_scalar(
        "SELECT role FROM community_members WHERE community_id = $1 AND user_id = $2",
    )
    .bind(community_id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?;
    if membership.is_none() {
        return Err(AppError::NotFound("Not a member".to_string()));
    }

    if creator_id == Some(user_id) {
        return Err(AppError::Authorization(
            "Creator cannot leave the community. Delete it instead.".to_string(),
        ));
    }

    sqlx::query("DELETE FROM community_members WHERE community_id = $1 AND user_id = $2")
        .bind(community_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    recount_members(&mut tx, community_id).await?;
    tx.commit().await?;
    Ok(())
}

// member_count is denormalized; recount it from the membership table instead
// of incrementing so it can never drift.
async fn recount_members(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    community_id: Uuid,
) -> Result<()> {
    sqlx::query(
        "UPDATE communities
         SET member_count = (SELECT COUNT(*) FROM community_members WHERE community_id = $1)::int
         WHERE id = $1",
    )
    .bind(community_id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn create_post(
    db: &PgPool,
    user_id: Uuid,
    community_id: Uuid,
    request: &CreatePostRequest,
) -> Result<Uuid> {
    let is_member: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM community_members WHERE community_id = $1 AND user_id = $2)",
    )
    .bind(community_id)
    .bind(user_id)
    .fetch_one(db)
    .await?;
    if !is_member {
        return Err(AppError::Authorization(
            "You must join this community to post".to_string(),
        ));
    }

    let post_id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO community_posts (id, community_id, user_id, title, body, image_url)
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(post_id)
    .bind(community_id)
    .bind(user_id)
    .bind(&request.title)
    .bind(&request.body)
    .bind(request.image_url.as_deref())
    .execute(db)
    .await?;

    Ok(post_id)
}

/// A post with its full comment tree. Enforces the community's privacy
/// before revealing anything.
pub async fn post_page(
    db: &PgPool,
    user_id: Uuid,
    community_id: Uuid,
    post_id: Uuid,
) -> Result<PostPage> {
    let gate = sqlx::query(
        "SELECT c.privacy,
                EXISTS(SELECT 1 FROM community_members cm
                       WHERE cm.community_id = c.id AND cm.user_id = $2) AS is_member
         FROM communities c
         WHERE c.id = $1",
    )
    .bind(community_id)
    .bind(user_id)
    .fetch_optional(db)
    .await?
    .ok_or_else(|| AppError::NotFound("Community not found".to_string()))?;

    let privacy: CommunityPrivacy = gate.try_get("privacy")?;
    let is_member: bool = gate.try_get("is_member")?;
    if privacy == CommunityPrivacy::Private && !is_member {
        return Err(AppError::Authorization("Private community".to_string()));
    }

    let post = sqlx::query_as::<_, PostDetail>(
        "SELECT cp.*, u.name AS author_name,
                (SELECT COUNT(*) FROM comments c WHERE c.post_id = cp.id) AS comment_count,
                COALESCE((SELECT v.vote_value FROM votes v
                          WHERE v.target_id = cp.id AND v.target_type = 'post' AND v.user_id = $3),
                         0::smallint) AS user_vote
         FROM community_posts cp
         JOIN users u ON cp.user_id = u.id
         WHERE cp.id = $1 AND cp.community_id = $2",
    )
    .bind(post_id)
    .bind(community_id)
    .bind(user_id)
    .fetch_optional(db)
    .await?
    .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    let rows = sqlx::query_as::<_, CommentRow>(
        "SELECT c.id, c.user_id, c.post_id, c.parent_comment_id, c.content,
                c.vote_score, c.created_at,
                u.name AS author_name,
                COALESCE((SELECT v.vote_value FROM votes v
                          WHERE v.target_id = c.id AND v.target_type = 'comment' AND v.user_id = $2),
                         0::smallint) AS user_vote
         FROM comments c
         JOIN users u ON c.user_id = u.id
         WHERE c.post_id = $1
         ORDER BY c.vote_score DESC, c.created_at ASC",
    )
    .bind(post_id)
    .bind(user_id)
    .fetch_all(db)
    .await?;

    Ok(PostPage {
        post,
        comments: comment_service::build_comment_tree(rows),
    })
}
