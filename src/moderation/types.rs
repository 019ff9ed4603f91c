//! Value types shared by the report store, the engine and the web layer.

use crate::app_config::ModerationConfig;
use crate::content::{ContentDetails, ContentRef};
use crate::orm::reports;
use serde::Serialize;

pub use crate::orm::reports::{ReportReason, ReportStatus, ReportType};

impl ReportType {
    pub const ALL: [ReportType; 4] = [Self::Post, Self::Comment, Self::User, Self::Message];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::Comment => "comment",
            Self::User => "user",
            Self::Message => "message",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }
}

impl ReportReason {
    pub const ALL: [ReportReason; 7] = [
        Self::Inappropriate,
        Self::Spam,
        Self::Harassment,
        Self::Copyright,
        Self::AiDisclosure,
        Self::Impersonation,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inappropriate => "inappropriate",
            Self::Spam => "spam",
            Self::Harassment => "harassment",
            Self::Copyright => "copyright",
            Self::AiDisclosure => "ai_disclosure",
            Self::Impersonation => "impersonation",
            Self::Other => "other",
        }
    }

    /// Human readable label, used in notifications.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Inappropriate => "inappropriate content",
            Self::Spam => "spam",
            Self::Harassment => "harassment",
            Self::Copyright => "copyright infringement",
            Self::AiDisclosure => "undisclosed AI-generated content",
            Self::Impersonation => "impersonation",
            Self::Other => "a community guidelines violation",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.as_str() == name)
    }
}

impl ReportStatus {
    pub const ALL: [ReportStatus; 4] = [
        Self::Pending,
        Self::Reviewed,
        Self::Resolved,
        Self::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Reviewed => "reviewed",
            Self::Resolved => "resolved",
            Self::Rejected => "rejected",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == name)
    }

    /// Whether an admin may still move the report to another status.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// Administrative action an admin may take while closing a report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModerationAction {
    RemoveContent,
    WarnUser,
    BlockUser,
    NoAction,
}

impl ModerationAction {
    pub const ALL: [ModerationAction; 4] = [
        Self::RemoveContent,
        Self::WarnUser,
        Self::BlockUser,
        Self::NoAction,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RemoveContent => "remove_content",
            Self::WarnUser => "warn_user",
            Self::BlockUser => "block_user",
            Self::NoAction => "no_action",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.as_str() == name)
    }

    /// Whether the content owner must be known before the action can run.
    ///
    /// Message removal is a stub that never touches the owner.
    pub fn requires_owner(&self, content: ContentRef) -> bool {
        match self {
            Self::RemoveContent => !matches!(content, ContentRef::Message(_)),
            Self::WarnUser | Self::BlockUser => true,
            Self::NoAction => false,
        }
    }
}

/// A validated report submission.
#[derive(Clone, Debug, PartialEq)]
pub struct NewReport {
    pub reporter_id: i32,
    pub content: ContentRef,
    pub reason: ReportReason,
    pub description: Option<String>,
}

/// Result of filing a report. Duplicates are not an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CreateOutcome {
    Created(i32),
    AlreadyReported,
}

/// A report as shown to admins, with its content resolved at read time.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReportDetails {
    pub id: i32,
    pub reporter_id: i32,
    pub reporter_name: Option<String>,
    pub report_type: ReportType,
    pub content_id: i32,
    pub reason: ReportReason,
    pub description: Option<String>,
    pub status: ReportStatus,
    pub admin_notes: Option<String>,
    pub created_at: chrono::NaiveDateTime,
    pub updated_at: chrono::NaiveDateTime,
    pub content_details: ContentDetails,
}

impl ReportDetails {
    pub fn new(
        report: reports::Model,
        reporter_name: Option<String>,
        content_details: ContentDetails,
    ) -> Self {
        Self {
            id: report.id,
            reporter_id: report.reporter_id,
            reporter_name,
            report_type: report.report_type,
            content_id: report.content_id,
            reason: report.reason,
            description: report.description,
            status: report.status,
            admin_notes: report.admin_notes,
            created_at: report.created_at,
            updated_at: report.updated_at,
            content_details,
        }
    }
}

/// Number of reports per status. Every status is always present.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub pending: u64,
    pub reviewed: u64,
    pub resolved: u64,
    pub rejected: u64,
}

impl StatusCounts {
    pub fn set(&mut self, status: ReportStatus, count: u64) {
        match status {
            ReportStatus::Pending => self.pending = count,
            ReportStatus::Reviewed => self.reviewed = count,
            ReportStatus::Resolved => self.resolved = count,
            ReportStatus::Rejected => self.rejected = count,
        }
    }
}

/// Ceiling on reports per page. Configuration may lower it, never raise it.
pub const PAGE_SIZE_CAP: u64 = 50;

/// Bounded page request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Page {
    pub limit: u64,
    pub offset: u64,
}

impl Page {
    /// Clamp raw query values: `limit` into `[1, max_page_size]`, `offset` to `>= 0`.
    ///
    /// `max_page_size` itself is held within `[1, PAGE_SIZE_CAP]`.
    pub fn clamped(limit: Option<i64>, offset: Option<i64>, settings: &ModerationConfig) -> Self {
        let max = settings.max_page_size.clamp(1, PAGE_SIZE_CAP);
        let limit = match limit {
            Some(limit) => limit.clamp(1, max as i64) as u64,
            None => settings.default_page_size.clamp(1, max),
        };
        let offset = offset.unwrap_or(0).max(0) as u64;

        Self { limit, offset }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
    pub has_more: bool,
}

impl Pagination {
    pub fn new(page: Page, returned: usize, total: u64) -> Self {
        Self {
            total,
            limit: page.limit,
            offset: page.offset,
            has_more: page.offset + (returned as u64) < total,
        }
    }
}

/// One page of the review queue.
#[derive(Clone, Debug, Serialize)]
pub struct ReportListing {
    pub reports: Vec<ReportDetails>,
    pub pagination: Pagination,
    pub counts: StatusCounts,
}

/// Side effect applied by a moderation action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum ActionEffect {
    ContentRemoved,
    /// Message removal is not wired up yet; the action succeeds without effect.
    RemovalSkipped,
    UserWarned { user_id: i32, notification_id: i32 },
    UserBlocked { blocker_id: i32, blocked_id: i32 },
    None,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ActionOutcome {
    pub report_id: i32,
    pub action: ModerationAction,
    pub effect: ActionEffect,
    pub admin_notes: String,
}
