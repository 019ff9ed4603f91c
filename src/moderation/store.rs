//! Persistence for user reports.

use super::error::{FieldError, ModerationError};
use super::types::{
    CreateOutcome, NewReport, Page, ReportDetails, ReportReason, ReportStatus, ReportType,
    StatusCounts,
};
use crate::content::{ContentRef, ContentRegistry};
use crate::orm::reports;
use chrono::Utc;
use sea_orm::{
    entity::*, query::*, sea_query::Expr, ConnectionTrait, DatabaseConnection, DbErr, Select,
};

/// Longest free-text description a reporter may attach.
pub const MAX_DESCRIPTION_CHARS: usize = 2000;

impl NewReport {
    /// Validate raw submission fields. All offending fields are reported at once.
    pub fn parse(
        reporter_id: i32,
        report_type: &str,
        content_id: i32,
        reason: &str,
        description: Option<String>,
    ) -> Result<Self, ModerationError> {
        let mut errors = Vec::new();

        let report_type = ReportType::from_name(report_type);
        if report_type.is_none() {
            errors.push(FieldError::new(
                "report_type",
                "Must be one of: post, comment, user, message",
            ));
        }

        if content_id <= 0 {
            errors.push(FieldError::new("content_id", "Must be a positive id"));
        }

        let reason = ReportReason::from_name(reason);
        if reason.is_none() {
            errors.push(FieldError::new("reason", "Unknown report reason"));
        }

        let description = description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        if let Some(d) = &description {
            if d.chars().count() > MAX_DESCRIPTION_CHARS {
                errors.push(FieldError::new(
                    "description",
                    format!("Must be at most {} characters", MAX_DESCRIPTION_CHARS),
                ));
            }
        }

        match (report_type, reason) {
            (Some(report_type), Some(reason)) if errors.is_empty() => Ok(Self {
                reporter_id,
                content: ContentRef::new(report_type, content_id),
                reason,
                description,
            }),
            _ => Err(ModerationError::Validation(errors)),
        }
    }
}

/// Move a pending report to `status`.
///
/// The update is conditional on the row still being pending, so concurrent
/// reviewers cannot both close the same report. Returns `false` when nothing
/// matched (report absent or already closed).
pub(crate) async fn transition<C: ConnectionTrait>(
    conn: &C,
    report_id: i32,
    status: ReportStatus,
    admin_notes: Option<String>,
) -> Result<bool, DbErr> {
    // Notes are overwritten even when absent: last write wins.
    let result = reports::Entity::update_many()
        .col_expr(reports::Column::Status, Expr::value(status))
        .col_expr(reports::Column::AdminNotes, Expr::value(admin_notes))
        .col_expr(reports::Column::UpdatedAt, Expr::value(Utc::now().naive_utc()))
        .filter(reports::Column::Id.eq(report_id))
        .filter(reports::Column::Status.eq(ReportStatus::Pending))
        .exec(conn)
        .await?;

    Ok(result.rows_affected > 0)
}

fn with_status(query: Select<reports::Entity>, status: Option<ReportStatus>) -> Select<reports::Entity> {
    match status {
        Some(status) => query.filter(reports::Column::Status.eq(status)),
        None => query,
    }
}

/// Report rows plus the read-side joins admins need.
#[derive(Clone)]
pub struct ReportStore {
    db: DatabaseConnection,
    registry: ContentRegistry,
}

impl ReportStore {
    pub fn new(db: DatabaseConnection, registry: ContentRegistry) -> Self {
        Self { db, registry }
    }

    /// Insert a pending report unless this reporter already reported the content.
    ///
    /// The duplicate check and the insert are separate statements; two racing
    /// submissions from the same reporter can both land.
    pub async fn create_report(&self, report: NewReport) -> Result<CreateOutcome, DbErr> {
        let content = report.content;

        if let Some(existing) = self.find_duplicate(report.reporter_id, content).await? {
            log::debug!(
                "User {} already reported {} (report {})",
                report.reporter_id,
                content,
                existing.id
            );
            return Ok(CreateOutcome::AlreadyReported);
        }

        let now = Utc::now().naive_utc();
        let inserted = reports::ActiveModel {
            reporter_id: Set(report.reporter_id),
            report_type: Set(content.report_type()),
            content_id: Set(content.id()),
            reason: Set(report.reason),
            description: Set(report.description),
            status: Set(ReportStatus::Pending),
            admin_notes: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        log::info!(
            "Report {} filed by user {} against {} for {}",
            inserted.id,
            report.reporter_id,
            content,
            report.reason.as_str()
        );

        Ok(CreateOutcome::Created(inserted.id))
    }

    /// Report already filed by `reporter_id` against `content`, whatever its status.
    pub async fn find_duplicate(
        &self,
        reporter_id: i32,
        content: ContentRef,
    ) -> Result<Option<reports::Model>, DbErr> {
        reports::Entity::find()
            .filter(reports::Column::ReporterId.eq(reporter_id))
            .filter(reports::Column::ReportType.eq(content.report_type()))
            .filter(reports::Column::ContentId.eq(content.id()))
            .one(&self.db)
            .await
    }

    /// Raw report row.
    pub async fn find(&self, report_id: i32) -> Result<Option<reports::Model>, DbErr> {
        reports::Entity::find_by_id(report_id).one(&self.db).await
    }

    pub async fn get_report(&self, report_id: i32) -> Result<ReportDetails, ModerationError> {
        let report = self
            .find(report_id)
            .await?
            .ok_or(ModerationError::ReportNotFound(report_id))?;

        Ok(self.details(report).await?)
    }

    /// Reports for the review queue, newest first.
    pub async fn list_for_review(
        &self,
        status: Option<ReportStatus>,
        page: Page,
    ) -> Result<Vec<ReportDetails>, DbErr> {
        let rows = with_status(reports::Entity::find(), status)
            .order_by_desc(reports::Column::CreatedAt)
            .order_by_desc(reports::Column::Id)
            .limit(page.limit)
            .offset(page.offset)
            .all(&self.db)
            .await?;

        let mut listing = Vec::with_capacity(rows.len());
        for row in rows {
            listing.push(self.details(row).await?);
        }

        Ok(listing)
    }

    /// Total rows matching a status filter, ignoring pagination.
    pub async fn count_matching(&self, status: Option<ReportStatus>) -> Result<u64, DbErr> {
        let count = with_status(reports::Entity::find(), status)
            .count(&self.db)
            .await?;

        Ok(count as u64)
    }

    pub async fn count_by_status(&self) -> Result<StatusCounts, DbErr> {
        let mut counts = StatusCounts::default();

        for status in ReportStatus::ALL {
            counts.set(status, self.count_matching(Some(status)).await?);
        }

        Ok(counts)
    }

    /// Close a pending report without taking an action.
    ///
    /// Returns `Ok(false)` when the report exists but is no longer pending.
    pub async fn update_status(
        &self,
        report_id: i32,
        status: ReportStatus,
        admin_notes: Option<String>,
    ) -> Result<bool, ModerationError> {
        if status == ReportStatus::Pending {
            return Err(ModerationError::invalid(
                "status",
                "Must be one of: reviewed, resolved, rejected",
            ));
        }

        if self.find(report_id).await?.is_none() {
            return Err(ModerationError::ReportNotFound(report_id));
        }

        let updated = transition(&self.db, report_id, status, admin_notes).await?;
        if updated {
            log::info!("Report {} moved to {}", report_id, status.as_str());
        }

        Ok(updated)
    }

    async fn details(&self, report: reports::Model) -> Result<ReportDetails, DbErr> {
        let reporter_name = self.registry.user_name(report.reporter_id).await?;
        let content = ContentRef::new(report.report_type, report.content_id);
        let content_details = self.registry.preview(content).await?;

        Ok(ReportDetails::new(report, reporter_name, content_details))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_submission() {
        let report = NewReport::parse(1, "comment", 5, "harassment", Some("  rude  ".into())).unwrap();

        assert_eq!(report.content, ContentRef::Comment(5));
        assert_eq!(report.reason, ReportReason::Harassment);
        assert_eq!(report.description.as_deref(), Some("rude"));
    }

    #[test]
    fn test_parse_blank_description_is_none() {
        let report = NewReport::parse(1, "post", 5, "spam", Some("   ".into())).unwrap();
        assert_eq!(report.description, None);
    }

    #[test]
    fn test_parse_collects_every_bad_field() {
        let err = NewReport::parse(1, "playlist", 0, "boring", None).unwrap_err();

        match err {
            ModerationError::Validation(errors) => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["report_type", "content_id", "reason"]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_long_description() {
        let long = "x".repeat(MAX_DESCRIPTION_CHARS + 1);
        assert!(NewReport::parse(1, "user", 2, "other", Some(long)).is_err());
    }
}
