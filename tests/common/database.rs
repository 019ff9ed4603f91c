//! Test database setup
#![allow(dead_code)]

use artspace::app_config::ModerationConfig;
use artspace::moderation::ModerationEngine;
use sea_orm::{DatabaseConnection, DbErr};

/// Fresh in-memory SQLite store with the full schema.
///
/// A single pooled connection keeps every query on the same in-memory
/// database, so each test gets its own isolated store.
pub async fn setup_test_database() -> Result<DatabaseConnection, DbErr> {
    let db = artspace::db::connect("sqlite::memory:", 1).await?;
    artspace::db::create_schema(&db).await?;
    Ok(db)
}

/// Engine with default moderation settings over a fresh store.
pub async fn setup_engine() -> Result<(DatabaseConnection, ModerationEngine), DbErr> {
    let db = setup_test_database().await?;
    let engine = ModerationEngine::new(db.clone(), &ModerationConfig::default());
    Ok((db, engine))
}
