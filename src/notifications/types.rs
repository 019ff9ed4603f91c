//! Notification type definitions

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationType {
    ModerationWarning, // An admin warned you about reported content
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ModerationWarning => "moderation_warning",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "moderation_warning" => Some(Self::ModerationWarning),
            _ => None,
        }
    }
}
