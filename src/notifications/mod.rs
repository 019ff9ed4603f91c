//! In-app notifications delivered to users.

pub mod types;

use crate::content::ContentRef;
use crate::orm::notifications;
use crate::orm::reports::ReportReason;
use chrono::Utc;
use sea_orm::{entity::*, query::*, ConnectionTrait, DbErr, Set};

pub use types::NotificationType;

/// A notification waiting to be stored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewNotification {
    pub user_id: i32,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub url: Option<String>,
    pub source: Option<ContentRef>,
}

impl NewNotification {
    /// Warning sent to the owner of reported content.
    pub fn moderation_warning(user_id: i32, content: ContentRef, reason: ReportReason) -> Self {
        Self {
            user_id,
            notification_type: NotificationType::ModerationWarning,
            title: "Content Warning".to_string(),
            message: format!(
                "Your content has been reported for {}. Please review our community guidelines.",
                reason.label()
            ),
            url: None,
            source: Some(content),
        }
    }
}

/// Store a notification. Runs on the caller's connection so it can join a transaction.
pub async fn create_notification<C: ConnectionTrait>(
    conn: &C,
    notification: NewNotification,
) -> Result<i32, DbErr> {
    let (source_content_type, source_content_id) = match notification.source {
        Some(content) => (
            Some(content.report_type().as_str().to_string()),
            Some(content.id()),
        ),
        None => (None, None),
    };

    let result = notifications::ActiveModel {
        user_id: Set(notification.user_id),
        type_: Set(notification.notification_type.as_str().to_string()),
        title: Set(notification.title),
        message: Set(notification.message),
        url: Set(notification.url),
        source_content_type: Set(source_content_type),
        source_content_id: Set(source_content_id),
        is_read: Set(false),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    log::info!(
        "Notification {} ({}) created for user {}",
        result.id,
        notification.notification_type.as_str(),
        notification.user_id
    );

    Ok(result.id)
}

/// Fetch recent notifications for a user, newest first.
pub async fn get_user_notifications<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    limit: u64,
) -> Result<Vec<notifications::Model>, DbErr> {
    notifications::Entity::find()
        .filter(notifications::Column::UserId.eq(user_id))
        .order_by_desc(notifications::Column::CreatedAt)
        .order_by_desc(notifications::Column::Id)
        .limit(limit)
        .all(conn)
        .await
}
