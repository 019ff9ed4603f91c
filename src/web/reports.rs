//! Report submission endpoint for signed-in users.

use super::error::ApiError;
use super::response::ApiResponse;
use crate::middleware::{AccessGate, ClientCtx};
use crate::moderation::{CreateOutcome, ModerationEngine};
use actix_web::{post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use validator::Validate;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(submit_report);
}

#[derive(Deserialize, Validate)]
struct ReportForm {
    report_type: String,
    content_id: i32,
    reason: String,
    #[validate(length(max = 2000, message = "Must be at most 2000 characters"))]
    description: Option<String>,
}

#[derive(Serialize)]
struct FiledReport {
    report_id: i32,
}

/// POST /reports - File a report against a post, comment, user or message
#[post("/reports", wrap = "AccessGate::login()")]
async fn submit_report(
    client: ClientCtx,
    engine: web::Data<ModerationEngine>,
    form: web::Json<ReportForm>,
) -> Result<HttpResponse, ApiError> {
    let auth = client.require_login()?;
    form.validate()?;

    let form = form.into_inner();
    let outcome = engine
        .file_report(
            auth,
            &form.report_type,
            form.content_id,
            &form.reason,
            form.description,
        )
        .await?;

    Ok(match outcome {
        CreateOutcome::Created(report_id) => HttpResponse::Ok().json(ApiResponse::ok_with_message(
            FiledReport { report_id },
            "Report submitted. Thank you for helping keep the community safe.",
        )),
        CreateOutcome::AlreadyReported => HttpResponse::Ok().json(ApiResponse::message(
            "You have already reported this content.",
        )),
    })
}
