//! Report review workflow.
//!
//! Reports start `pending` and are closed exactly once by an admin, either
//! directly through [`ModerationEngine::update_status`] or by taking an action
//! with [`ModerationEngine::take_action`]. An action's side effect and the
//! report's move to `resolved` commit together or not at all.

pub mod error;
pub mod store;
pub mod types;

pub use error::{FieldError, ModerationError};
pub use store::ReportStore;
pub use types::*;

use crate::app_config::ModerationConfig;
use crate::auth::{AuthContext, Permissions};
use crate::content::{ContentRef, ContentRegistry, Ownership, Removal};
use crate::notifications::{create_notification, NewNotification};
use crate::orm::reports;
use crate::relationships::block_in;
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};

/// Longest reason an admin may give when acting on a report.
pub const MAX_ACTION_REASON_CHARS: usize = 1000;

fn authorize(auth: &AuthContext, permission: Permissions) -> Result<(), ModerationError> {
    if auth.can(permission) {
        Ok(())
    } else {
        log::warn!(
            "User {} denied {:?} on moderation endpoint",
            auth.user_id,
            permission
        );
        Err(ModerationError::Forbidden)
    }
}

/// Notes recorded on a report closed by an action.
pub fn action_notes(action: ModerationAction, reason_text: &str) -> String {
    format!("Action taken: {}. Reason: {}", action.as_str(), reason_text)
}

#[derive(Clone)]
pub struct ModerationEngine {
    db: DatabaseConnection,
    reports: ReportStore,
    registry: ContentRegistry,
    settings: ModerationConfig,
}

impl ModerationEngine {
    pub fn new(db: DatabaseConnection, settings: &ModerationConfig) -> Self {
        let registry = ContentRegistry::new(db.clone(), settings.excerpt_length);
        let reports = ReportStore::new(db.clone(), registry.clone());

        Self {
            db,
            reports,
            registry,
            settings: settings.clone(),
        }
    }

    pub fn settings(&self) -> &ModerationConfig {
        &self.settings
    }

    pub fn reports(&self) -> &ReportStore {
        &self.reports
    }

    /// File a report on behalf of `auth`.
    ///
    /// The content must exist at filing time. Reporting the same content twice
    /// is not an error and yields [`CreateOutcome::AlreadyReported`], even
    /// after the content has been removed.
    pub async fn file_report(
        &self,
        auth: &AuthContext,
        report_type: &str,
        content_id: i32,
        reason: &str,
        description: Option<String>,
    ) -> Result<CreateOutcome, ModerationError> {
        authorize(auth, Permissions::FILE_REPORTS)?;

        let report = NewReport::parse(auth.user_id, report_type, content_id, reason, description)?;

        // Duplicates win over missing content.
        if self
            .reports
            .find_duplicate(report.reporter_id, report.content)
            .await?
            .is_some()
        {
            return Ok(CreateOutcome::AlreadyReported);
        }

        if self.registry.resolve_owner(report.content).await? == Ownership::Missing {
            return Err(ModerationError::ContentMissing(report.content));
        }

        Ok(self.reports.create_report(report).await?)
    }

    /// One page of reports plus totals for the whole queue.
    pub async fn list_reports(
        &self,
        auth: &AuthContext,
        status: Option<ReportStatus>,
        page: Page,
    ) -> Result<ReportListing, ModerationError> {
        authorize(auth, Permissions::VIEW_REPORTS)?;

        let reports = self.reports.list_for_review(status, page).await?;
        let total = self.reports.count_matching(status).await?;
        let counts = self.reports.count_by_status().await?;

        Ok(ReportListing {
            pagination: Pagination::new(page, reports.len(), total),
            reports,
            counts,
        })
    }

    pub async fn get_report(
        &self,
        auth: &AuthContext,
        report_id: i32,
    ) -> Result<ReportDetails, ModerationError> {
        authorize(auth, Permissions::VIEW_REPORTS)?;
        self.reports.get_report(report_id).await
    }

    pub async fn count_by_status(&self, auth: &AuthContext) -> Result<StatusCounts, ModerationError> {
        authorize(auth, Permissions::VIEW_REPORTS)?;
        Ok(self.reports.count_by_status().await?)
    }

    /// Close a pending report without side effects.
    pub async fn update_status(
        &self,
        auth: &AuthContext,
        report_id: i32,
        status: ReportStatus,
        admin_notes: Option<String>,
    ) -> Result<(), ModerationError> {
        authorize(auth, Permissions::MANAGE_REPORTS)?;

        let admin_notes = admin_notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        if !self.reports.update_status(report_id, status, admin_notes).await? {
            return Err(ModerationError::ReportClosed(report_id));
        }

        log::info!(
            "Admin {} set report {} to {}",
            auth.user_id,
            report_id,
            status.as_str()
        );
        Ok(())
    }

    /// Apply `action` to the reported content and resolve the report.
    ///
    /// Fails without changing anything when the report is closed or the
    /// content owner the action needs cannot be resolved.
    pub async fn take_action(
        &self,
        auth: &AuthContext,
        report_id: i32,
        action: ModerationAction,
        reason_text: &str,
    ) -> Result<ActionOutcome, ModerationError> {
        authorize(auth, Permissions::MANAGE_REPORTS)?;

        let reason_text = reason_text.trim();
        if reason_text.is_empty() {
            return Err(ModerationError::invalid("reason", "Reason is required"));
        }
        if reason_text.chars().count() > MAX_ACTION_REASON_CHARS {
            return Err(ModerationError::invalid(
                "reason",
                format!("Must be at most {} characters", MAX_ACTION_REASON_CHARS),
            ));
        }

        let report = self
            .reports
            .find(report_id)
            .await?
            .ok_or(ModerationError::ReportNotFound(report_id))?;

        if !report.status.is_open() {
            return Err(ModerationError::ReportClosed(report_id));
        }

        let content = ContentRef::new(report.report_type, report.content_id);

        let owner = if action.requires_owner(content) {
            match self.registry.resolve_owner(content).await? {
                Ownership::Owner(user_id) => Some(user_id),
                Ownership::Missing => return Err(ModerationError::ContentMissing(content)),
                Ownership::Unresolved => return Err(ModerationError::OwnerUnresolved(content)),
            }
        } else {
            None
        };

        let admin_notes = action_notes(action, reason_text);

        let txn = self.db.begin().await?;
        let applied = apply_action(&txn, &report, content, action, owner, &admin_notes).await;

        let effect = match applied {
            Ok(effect) => {
                txn.commit().await?;
                effect
            }
            Err(e) => {
                if let Err(rollback) = txn.rollback().await {
                    log::error!("Rollback of action on report {} failed: {}", report_id, rollback);
                }
                return Err(e);
            }
        };

        log::info!(
            "Admin {} took {} on report {} ({})",
            auth.user_id,
            action.as_str(),
            report_id,
            content
        );

        Ok(ActionOutcome {
            report_id,
            action,
            effect,
            admin_notes,
        })
    }
}

/// Side effect plus the closing status update, on one connection.
async fn apply_action<C: ConnectionTrait>(
    conn: &C,
    report: &reports::Model,
    content: ContentRef,
    action: ModerationAction,
    owner: Option<i32>,
    admin_notes: &str,
) -> Result<ActionEffect, ModerationError> {
    let effect = match action {
        ModerationAction::RemoveContent => match content.remove(conn).await? {
            Removal::Removed => ActionEffect::ContentRemoved,
            Removal::Skipped => ActionEffect::RemovalSkipped,
            Removal::Missing => return Err(ModerationError::ContentMissing(content)),
            // Accounts are blocked rather than deleted.
            Removal::NotApplicable => block_owner(conn, report.reporter_id, owner, content).await?,
        },
        ModerationAction::WarnUser => {
            let user_id = owner.ok_or(ModerationError::OwnerUnresolved(content))?;
            let notification = NewNotification::moderation_warning(user_id, content, report.reason);
            let notification_id = create_notification(conn, notification).await?;

            ActionEffect::UserWarned {
                user_id,
                notification_id,
            }
        }
        ModerationAction::BlockUser => block_owner(conn, report.reporter_id, owner, content).await?,
        ModerationAction::NoAction => ActionEffect::None,
    };

    let closed = store::transition(
        conn,
        report.id,
        ReportStatus::Resolved,
        Some(admin_notes.to_string()),
    )
    .await?;

    // Someone else closed it between our read and this update.
    if !closed {
        return Err(ModerationError::ReportClosed(report.id));
    }

    Ok(effect)
}

async fn block_owner<C: ConnectionTrait>(
    conn: &C,
    reporter_id: i32,
    owner: Option<i32>,
    content: ContentRef,
) -> Result<ActionEffect, ModerationError> {
    let blocked_id = owner.ok_or(ModerationError::OwnerUnresolved(content))?;
    block_in(conn, reporter_id, blocked_id).await?;

    Ok(ActionEffect::UserBlocked {
        blocker_id: reporter_id,
        blocked_id,
    })
}
