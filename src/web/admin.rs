//! Admin review queue endpoints.

use super::error::ApiError;
use super::response::ApiResponse;
use crate::middleware::{AccessGate, ClientCtx};
use crate::moderation::{ModerationAction, ModerationEngine, Page, ReportDetails, ReportStatus};
use actix_web::{get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use validator::Validate;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    // Literal paths before `/admin/reports/{id}`.
    conf.service(update_report_status)
        .service(take_report_action)
        .service(view_reports)
        .service(view_report);
}

/// Query parameters for the review queue. Numbers that do not parse fall back
/// to the defaults rather than failing the request.
#[derive(Deserialize)]
struct ReportListQuery {
    status: Option<String>,
    limit: Option<String>,
    offset: Option<String>,
}

#[derive(Serialize)]
struct ReportEnvelope {
    report: ReportDetails,
}

#[derive(Deserialize, Validate)]
struct UpdateStatusRequest {
    report_id: i32,
    status: String,
    #[validate(length(max = 5000, message = "Must be at most 5000 characters"))]
    admin_notes: Option<String>,
}

#[derive(Deserialize, Validate)]
struct ReportActionRequest {
    report_id: i32,
    action: String,
    #[validate(length(min = 1, max = 1000, message = "Must be between 1 and 1000 characters"))]
    reason: String,
}

/// `None`, empty and `all` mean no filter.
fn parse_status_filter(status: Option<&str>) -> Result<Option<ReportStatus>, ApiError> {
    match status.map(str::trim) {
        None | Some("") | Some("all") => Ok(None),
        Some(name) => ReportStatus::from_name(name)
            .map(Some)
            .ok_or_else(invalid_status),
    }
}

fn invalid_status() -> ApiError {
    ApiError::Validation(vec![crate::moderation::FieldError::new(
        "status",
        "Must be one of: pending, reviewed, resolved, rejected",
    )])
}

fn parse_number(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|v| v.trim().parse().ok())
}

/// GET /admin/reports - Review queue with pagination and per-status counts
#[get("/admin/reports", wrap = "AccessGate::admin()")]
async fn view_reports(
    client: ClientCtx,
    engine: web::Data<ModerationEngine>,
    query: web::Query<ReportListQuery>,
) -> Result<HttpResponse, ApiError> {
    let auth = client.require_admin()?;

    let status = parse_status_filter(query.status.as_deref())?;
    let page = Page::clamped(
        parse_number(query.limit.as_deref()),
        parse_number(query.offset.as_deref()),
        engine.settings(),
    );

    let listing = engine.list_reports(auth, status, page).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(listing)))
}

/// GET /admin/reports/{id} - One report with its content preview
#[get("/admin/reports/{id}", wrap = "AccessGate::admin()")]
async fn view_report(
    client: ClientCtx,
    engine: web::Data<ModerationEngine>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let auth = client.require_admin()?;

    let report_id = path
        .trim()
        .parse::<i32>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ApiError::BadRequest("Invalid report id".to_string()))?;

    let report = engine.get_report(auth, report_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(ReportEnvelope { report })))
}

/// POST /admin/reports/update - Close a pending report without an action
#[post("/admin/reports/update", wrap = "AccessGate::admin()")]
async fn update_report_status(
    client: ClientCtx,
    engine: web::Data<ModerationEngine>,
    body: web::Json<UpdateStatusRequest>,
) -> Result<HttpResponse, ApiError> {
    let auth = client.require_admin()?;
    body.validate()?;

    let body = body.into_inner();
    let status = ReportStatus::from_name(body.status.trim()).ok_or_else(invalid_status)?;

    engine
        .update_status(auth, body.report_id, status, body.admin_notes)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::message(format!(
        "Report marked as {}",
        status.as_str()
    ))))
}

/// POST /admin/reports/action - Apply an action and resolve the report
#[post("/admin/reports/action", wrap = "AccessGate::admin()")]
async fn take_report_action(
    client: ClientCtx,
    engine: web::Data<ModerationEngine>,
    body: web::Json<ReportActionRequest>,
) -> Result<HttpResponse, ApiError> {
    let auth = client.require_admin()?;
    body.validate()?;

    let action = ModerationAction::from_name(body.action.trim()).ok_or_else(|| {
        ApiError::Validation(vec![crate::moderation::FieldError::new(
            "action",
            "Must be one of: remove_content, warn_user, block_user, no_action",
        )])
    })?;

    let outcome = engine
        .take_action(auth, body.report_id, action, &body.reason)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        outcome,
        "Action applied and report resolved",
    )))
}
