//! Database connection setup and schema bootstrap.
//!
//! The connection is created once at startup and handed to every component
//! that needs it. Nothing here is global, so tests can build an isolated
//! store per test case.

use crate::orm::{comments, messages, notifications, posts, reports, user_blocks, user_follows, users};
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Schema, Statement,
};

/// Pair uniqueness that the entity derive cannot express.
///
/// Reports intentionally have no such index: duplicate filing is checked by
/// the report store before insert.
const UNIQUE_INDEXES: [&str; 2] = [
    "CREATE UNIQUE INDEX IF NOT EXISTS user_follows_pair ON user_follows (follower_id, following_id)",
    "CREATE UNIQUE INDEX IF NOT EXISTS user_blocks_pair ON user_blocks (blocker_id, blocked_id)",
];

/// Open a connection pool.
pub async fn connect(url: &str, max_connections: u32) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(url.to_owned());
    options.max_connections(max_connections.max(1));

    let db = Database::connect(options).await?;
    log::info!("Connected to database ({:?})", db.get_database_backend());

    Ok(db)
}

/// Create every table this service owns. Safe to call on an existing schema.
pub async fn create_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    // Parents before children so foreign keys resolve.
    let mut tables = vec![
        schema.create_table_from_entity(users::Entity),
        schema.create_table_from_entity(posts::Entity),
        schema.create_table_from_entity(comments::Entity),
        schema.create_table_from_entity(messages::Entity),
        schema.create_table_from_entity(user_follows::Entity),
        schema.create_table_from_entity(user_blocks::Entity),
        schema.create_table_from_entity(notifications::Entity),
        schema.create_table_from_entity(reports::Entity),
    ];

    for table in tables.iter_mut() {
        table.if_not_exists();
        db.execute(backend.build(&*table)).await?;
    }

    for sql in UNIQUE_INDEXES {
        db.execute(Statement::from_string(backend, sql.to_string()))
            .await?;
    }

    log::debug!("Schema ready");
    Ok(())
}
