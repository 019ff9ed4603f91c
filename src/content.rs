//! Content registry: turns a `(report_type, content_id)` pair into something
//! moderators can look at and act on.
//!
//! Lookups never fail for absent content. A missing row is reported as
//! [`ContentDetails::Missing`] or [`Ownership::Missing`] so callers can decide
//! what an orphaned report means for them. Database errors still propagate.

use crate::orm::reports::ReportType;
use crate::orm::{comments, messages, posts, users};
use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter,
};
use serde::Serialize;

/// Reference to a reportable entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum ContentRef {
    Post(i32),
    Comment(i32),
    User(i32),
    Message(i32),
}

impl std::fmt::Display for ContentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} #{}", self.report_type().as_str(), self.id())
    }
}

/// Who owns a piece of content, as far as moderation is concerned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ownership {
    Owner(i32),
    /// Content does not exist or was removed.
    Missing,
    /// Content exists but ownership is not tracked for its type (messages).
    Unresolved,
}

/// Normalized view of reported content.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ContentPreview {
    pub content_type: ReportType,
    pub content_id: i32,
    pub excerpt: String,
    pub author_id: Option<i32>,
    pub author_name: Option<String>,
    pub url: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ContentDetails {
    Found(ContentPreview),
    Missing,
}

impl ContentDetails {
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

/// Outcome of removing content.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Removal {
    Removed,
    Missing,
    /// Accepted without effect. Message removal is not implemented.
    Skipped,
    /// Accounts are not removed through the registry.
    NotApplicable,
}

impl ContentRef {
    pub fn new(report_type: ReportType, content_id: i32) -> Self {
        match report_type {
            ReportType::Post => Self::Post(content_id),
            ReportType::Comment => Self::Comment(content_id),
            ReportType::User => Self::User(content_id),
            ReportType::Message => Self::Message(content_id),
        }
    }

    pub fn report_type(&self) -> ReportType {
        match self {
            Self::Post(_) => ReportType::Post,
            Self::Comment(_) => ReportType::Comment,
            Self::User(_) => ReportType::User,
            Self::Message(_) => ReportType::Message,
        }
    }

    pub fn id(&self) -> i32 {
        match *self {
            Self::Post(id) | Self::Comment(id) | Self::User(id) | Self::Message(id) => id,
        }
    }

    /// Resolve the user moderation actions should target.
    pub async fn owner<C: ConnectionTrait>(&self, conn: &C) -> Result<Ownership, DbErr> {
        let owner = match *self {
            Self::Post(id) => find_live_post(conn, id).await?.map(|p| p.user_id),
            Self::Comment(id) => find_live_comment(conn, id).await?.map(|c| c.user_id),
            // Reporting an account targets the account itself.
            Self::User(id) => users::Entity::find_by_id(id).one(conn).await?.map(|u| u.id),
            Self::Message(id) => {
                return Ok(match messages::Entity::find_by_id(id).one(conn).await? {
                    Some(_) => Ownership::Unresolved,
                    None => Ownership::Missing,
                });
            }
        };

        Ok(owner.map_or(Ownership::Missing, Ownership::Owner))
    }

    /// Build a preview. `excerpt_length` is measured in characters.
    pub async fn preview<C: ConnectionTrait>(
        &self,
        conn: &C,
        excerpt_length: usize,
    ) -> Result<ContentDetails, DbErr> {
        let preview = match *self {
            Self::Post(id) => match find_live_post(conn, id).await? {
                Some(post) => {
                    let author = users::Entity::find_by_id(post.user_id).one(conn).await?;
                    Some(ContentPreview {
                        content_type: ReportType::Post,
                        content_id: post.id,
                        excerpt: excerpt(&format!("{}: {}", post.title, post.body), excerpt_length),
                        author_id: Some(post.user_id),
                        author_name: author.map(|a| a.public_name().to_string()),
                        url: format!("/posts/{}", post.id),
                    })
                }
                None => None,
            },
            Self::Comment(id) => match find_live_comment(conn, id).await? {
                Some(comment) => {
                    let author = users::Entity::find_by_id(comment.user_id).one(conn).await?;
                    Some(ContentPreview {
                        content_type: ReportType::Comment,
                        content_id: comment.id,
                        excerpt: excerpt(&comment.body, excerpt_length),
                        author_id: Some(comment.user_id),
                        author_name: author.map(|a| a.public_name().to_string()),
                        url: format!("/posts/{}#comment-{}", comment.post_id, comment.id),
                    })
                }
                None => None,
            },
            Self::User(id) => users::Entity::find_by_id(id)
                .one(conn)
                .await?
                .map(|user| ContentPreview {
                    content_type: ReportType::User,
                    content_id: user.id,
                    excerpt: excerpt(user.public_name(), excerpt_length),
                    author_id: Some(user.id),
                    author_name: Some(user.public_name().to_string()),
                    url: format!("/users/{}", user.id),
                }),
            // Author deliberately left unresolved, matching `owner`.
            Self::Message(id) => messages::Entity::find_by_id(id)
                .one(conn)
                .await?
                .map(|message| ContentPreview {
                    content_type: ReportType::Message,
                    content_id: message.id,
                    excerpt: excerpt(&message.body, excerpt_length),
                    author_id: None,
                    author_name: None,
                    url: format!("/messages/{}", message.id),
                }),
        };

        Ok(preview.map_or(ContentDetails::Missing, ContentDetails::Found))
    }

    /// Soft-delete the content.
    pub async fn remove<C: ConnectionTrait>(&self, conn: &C) -> Result<Removal, DbErr> {
        let now = Utc::now().naive_utc();

        let affected = match *self {
            Self::Post(id) => {
                posts::Entity::update_many()
                    .col_expr(posts::Column::DeletedAt, Expr::value(Some(now)))
                    .filter(posts::Column::Id.eq(id))
                    .filter(posts::Column::DeletedAt.is_null())
                    .exec(conn)
                    .await?
                    .rows_affected
            }
            Self::Comment(id) => {
                comments::Entity::update_many()
                    .col_expr(comments::Column::DeletedAt, Expr::value(Some(now)))
                    .filter(comments::Column::Id.eq(id))
                    .filter(comments::Column::DeletedAt.is_null())
                    .exec(conn)
                    .await?
                    .rows_affected
            }
            Self::User(_) => return Ok(Removal::NotApplicable),
            Self::Message(id) => {
                log::warn!("Removal of message {} requested; message removal is not implemented", id);
                return Ok(Removal::Skipped);
            }
        };

        if affected == 0 {
            Ok(Removal::Missing)
        } else {
            log::info!("Removed {}", self);
            Ok(Removal::Removed)
        }
    }
}

async fn find_live_post<C: ConnectionTrait>(conn: &C, id: i32) -> Result<Option<posts::Model>, DbErr> {
    posts::Entity::find_by_id(id)
        .filter(posts::Column::DeletedAt.is_null())
        .one(conn)
        .await
}

async fn find_live_comment<C: ConnectionTrait>(
    conn: &C,
    id: i32,
) -> Result<Option<comments::Model>, DbErr> {
    comments::Entity::find_by_id(id)
        .filter(comments::Column::DeletedAt.is_null())
        .one(conn)
        .await
}

/// Collapse whitespace and cut to `max_chars` characters, marking the cut with an ellipsis.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() <= max_chars {
        return collapsed;
    }

    let mut cut: String = collapsed.chars().take(max_chars).collect();
    cut.truncate(cut.trim_end().len());
    cut.push('…');
    cut
}

/// Read handle over reportable content.
#[derive(Clone)]
pub struct ContentRegistry {
    db: DatabaseConnection,
    excerpt_length: usize,
}

impl ContentRegistry {
    pub fn new(db: DatabaseConnection, excerpt_length: usize) -> Self {
        Self { db, excerpt_length }
    }

    pub async fn preview(&self, content: ContentRef) -> Result<ContentDetails, DbErr> {
        content.preview(&self.db, self.excerpt_length).await
    }

    pub async fn resolve_owner(&self, content: ContentRef) -> Result<Ownership, DbErr> {
        content.owner(&self.db).await
    }

    /// Display name for a user id, if the user exists.
    pub async fn user_name(&self, user_id: i32) -> Result<Option<String>, DbErr> {
        Ok(users::Entity::find_by_id(user_id)
            .one(&self.db)
            .await?
            .map(|u| u.public_name().to_string()))
    }
}
