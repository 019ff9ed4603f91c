//! Moderation error taxonomy.

use crate::content::ContentRef;
use crate::relationships::RelationshipError;
use sea_orm::DbErr;
use serde::Serialize;

/// One offending input field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug)]
pub enum ModerationError {
    /// Caller lacks the permission for the operation.
    Forbidden,
    /// Input rejected before any persistence.
    Validation(Vec<FieldError>),
    ReportNotFound(i32),
    /// Content referenced by a report or submission does not exist (or was removed).
    ContentMissing(ContentRef),
    /// Content exists but its owner cannot be determined.
    OwnerUnresolved(ContentRef),
    /// Report is no longer pending.
    ReportClosed(i32),
    Relationship(RelationshipError),
    Database(DbErr),
}

impl ModerationError {
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldError::new(field, message)])
    }
}

impl std::fmt::Display for ModerationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Forbidden => write!(f, "Insufficient permissions"),
            Self::Validation(errors) => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
                write!(f, "Invalid input: {}", fields.join(", "))
            }
            Self::ReportNotFound(id) => write!(f, "Report {} not found", id),
            Self::ContentMissing(content) => write!(f, "{} not found", content),
            Self::OwnerUnresolved(content) => {
                write!(f, "Owner of {} cannot be determined", content)
            }
            Self::ReportClosed(id) => write!(f, "Report {} has already been closed", id),
            Self::Relationship(e) => write!(f, "{}", e),
            Self::Database(e) => write!(f, "Database error: {}", e),
        }
    }
}

impl std::error::Error for ModerationError {}

impl From<DbErr> for ModerationError {
    fn from(e: DbErr) -> Self {
        ModerationError::Database(e)
    }
}

impl From<RelationshipError> for ModerationError {
    fn from(e: RelationshipError) -> Self {
        match e {
            RelationshipError::Database(e) => ModerationError::Database(e),
            other => ModerationError::Relationship(other),
        }
    }
}
