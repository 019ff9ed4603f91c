//! Follow and block edges between users.
//!
//! A block always wins over a follow: creating a block deletes any follow edge
//! between the two users, in both directions, inside the same transaction.

use crate::orm::{user_blocks, user_follows};
use chrono::Utc;
use sea_orm::{
    entity::*, query::*, ConnectionTrait, DatabaseConnection, DbErr, TransactionTrait,
};

#[derive(Debug)]
pub enum RelationshipError {
    /// A user cannot follow or block themselves.
    SelfReference,
    /// Following is refused while either user blocks the other.
    Blocked,
    Database(DbErr),
}

impl std::fmt::Display for RelationshipError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RelationshipError::SelfReference => write!(f, "Users cannot target themselves"),
            RelationshipError::Blocked => write!(f, "A block exists between these users"),
            RelationshipError::Database(e) => write!(f, "Database error: {}", e),
        }
    }
}

impl std::error::Error for RelationshipError {}

impl From<DbErr> for RelationshipError {
    fn from(e: DbErr) -> Self {
        RelationshipError::Database(e)
    }
}

/// Create the block edge `blocker -> blocked` and drop follows both ways.
///
/// Runs on whatever connection it is given; callers own the transaction.
/// Returns `false` when the edge already existed (follows are still cleared).
pub async fn block_in<C: ConnectionTrait>(
    conn: &C,
    blocker_id: i32,
    blocked_id: i32,
) -> Result<bool, RelationshipError> {
    if blocker_id == blocked_id {
        return Err(RelationshipError::SelfReference);
    }

    let existing = user_blocks::Entity::find()
        .filter(user_blocks::Column::BlockerId.eq(blocker_id))
        .filter(user_blocks::Column::BlockedId.eq(blocked_id))
        .one(conn)
        .await?;

    let created = if existing.is_none() {
        user_blocks::ActiveModel {
            blocker_id: Set(blocker_id),
            blocked_id: Set(blocked_id),
            blocked_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(conn)
        .await?;
        true
    } else {
        false
    };

    let removed = user_follows::Entity::delete_many()
        .filter(
            Condition::any()
                .add(
                    Condition::all()
                        .add(user_follows::Column::FollowerId.eq(blocker_id))
                        .add(user_follows::Column::FollowingId.eq(blocked_id)),
                )
                .add(
                    Condition::all()
                        .add(user_follows::Column::FollowerId.eq(blocked_id))
                        .add(user_follows::Column::FollowingId.eq(blocker_id)),
                ),
        )
        .exec(conn)
        .await?;

    log::info!(
        "User {} blocked user {} ({} follow edges removed)",
        blocker_id,
        blocked_id,
        removed.rows_affected
    );

    Ok(created)
}

/// Whether either user blocks the other.
pub async fn has_block_between<C: ConnectionTrait>(
    conn: &C,
    user_a: i32,
    user_b: i32,
) -> Result<bool, DbErr> {
    let block = user_blocks::Entity::find()
        .filter(
            Condition::any()
                .add(
                    Condition::all()
                        .add(user_blocks::Column::BlockerId.eq(user_a))
                        .add(user_blocks::Column::BlockedId.eq(user_b)),
                )
                .add(
                    Condition::all()
                        .add(user_blocks::Column::BlockerId.eq(user_b))
                        .add(user_blocks::Column::BlockedId.eq(user_a)),
                ),
        )
        .one(conn)
        .await?;

    Ok(block.is_some())
}

/// Follow and block edges over an injected connection.
#[derive(Clone)]
pub struct RelationshipStore {
    db: DatabaseConnection,
}

impl RelationshipStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Follow another user. Returns `false` if already following.
    pub async fn follow(&self, follower_id: i32, following_id: i32) -> Result<bool, RelationshipError> {
        if follower_id == following_id {
            return Err(RelationshipError::SelfReference);
        }

        if has_block_between(&self.db, follower_id, following_id).await? {
            return Err(RelationshipError::Blocked);
        }

        if self.is_following(follower_id, following_id).await? {
            return Ok(false);
        }

        user_follows::ActiveModel {
            follower_id: Set(follower_id),
            following_id: Set(following_id),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        Ok(true)
    }

    pub async fn is_following(&self, follower_id: i32, following_id: i32) -> Result<bool, DbErr> {
        let follow = user_follows::Entity::find()
            .filter(user_follows::Column::FollowerId.eq(follower_id))
            .filter(user_follows::Column::FollowingId.eq(following_id))
            .one(&self.db)
            .await?;

        Ok(follow.is_some())
    }

    /// Block a user in its own transaction.
    pub async fn block(&self, blocker_id: i32, blocked_id: i32) -> Result<bool, RelationshipError> {
        let txn = self.db.begin().await?;

        match block_in(&txn, blocker_id, blocked_id).await {
            Ok(created) => {
                txn.commit().await?;
                Ok(created)
            }
            Err(e) => {
                txn.rollback().await?;
                Err(e)
            }
        }
    }

    /// Symmetric: `has_block_relationship(a, b) == has_block_relationship(b, a)`.
    pub async fn has_block_relationship(&self, user_a: i32, user_b: i32) -> Result<bool, DbErr> {
        has_block_between(&self.db, user_a, user_b).await
    }
}
