//! Database entities.

pub mod comments;
pub mod messages;
pub mod notifications;
pub mod posts;
pub mod reports;
pub mod user_blocks;
pub mod user_follows;
pub mod users;
