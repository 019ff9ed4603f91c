//! Test fixtures for creating test data
#![allow(dead_code)]

use artspace::auth::AuthContext;
use artspace::orm::{comments, messages, posts, reports, user_follows, users};
use chrono::{Duration, Utc};
use sea_orm::{entity::*, ActiveValue::Set, DatabaseConnection, DbErr};

/// Create a user. `display_name` is left empty so the username is shown.
pub async fn create_test_user(
    db: &DatabaseConnection,
    username: &str,
    is_admin: bool,
) -> Result<users::Model, DbErr> {
    users::ActiveModel {
        username: Set(username.to_string()),
        display_name: Set(None),
        is_admin: Set(is_admin),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await
}

pub fn auth_for(user: &users::Model) -> AuthContext {
    AuthContext::new(user.id, user.is_admin)
}

pub async fn create_test_post(
    db: &DatabaseConnection,
    user_id: i32,
    title: &str,
    body: &str,
) -> Result<posts::Model, DbErr> {
    posts::ActiveModel {
        user_id: Set(user_id),
        title: Set(title.to_string()),
        body: Set(body.to_string()),
        created_at: Set(Utc::now().naive_utc()),
        deleted_at: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
}

pub async fn create_test_comment(
    db: &DatabaseConnection,
    post_id: i32,
    user_id: i32,
    body: &str,
) -> Result<comments::Model, DbErr> {
    comments::ActiveModel {
        post_id: Set(post_id),
        user_id: Set(user_id),
        body: Set(body.to_string()),
        created_at: Set(Utc::now().naive_utc()),
        deleted_at: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
}

pub async fn create_test_message(
    db: &DatabaseConnection,
    sender_id: i32,
    recipient_id: i32,
    body: &str,
) -> Result<messages::Model, DbErr> {
    messages::ActiveModel {
        sender_id: Set(sender_id),
        recipient_id: Set(recipient_id),
        body: Set(body.to_string()),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await
}

/// Insert a follow edge directly, bypassing block checks.
pub async fn create_test_follow(
    db: &DatabaseConnection,
    follower_id: i32,
    following_id: i32,
) -> Result<user_follows::Model, DbErr> {
    user_follows::ActiveModel {
        follower_id: Set(follower_id),
        following_id: Set(following_id),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await
}

/// Insert a pending report with an explicit age, for ordering tests.
pub async fn create_aged_report(
    db: &DatabaseConnection,
    reporter_id: i32,
    report_type: reports::ReportType,
    content_id: i32,
    minutes_ago: i64,
) -> Result<reports::Model, DbErr> {
    let created_at = Utc::now().naive_utc() - Duration::minutes(minutes_ago);

    reports::ActiveModel {
        reporter_id: Set(reporter_id),
        report_type: Set(report_type),
        content_id: Set(content_id),
        reason: Set(reports::ReportReason::Spam),
        description: Set(None),
        status: Set(reports::ReportStatus::Pending),
        admin_notes: Set(None),
        created_at: Set(created_at),
        updated_at: Set(created_at),
        ..Default::default()
    }
    .insert(db)
    .await
}
