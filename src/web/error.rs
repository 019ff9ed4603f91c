//! HTTP error type. Every failure renders the standard envelope.

use super::response::ApiResponse;
use crate::moderation::{FieldError, ModerationError};
use crate::relationships::RelationshipError;
use actix_web::{http::StatusCode, HttpResponse, ResponseError};

#[derive(Debug)]
pub enum ApiError {
    Unauthenticated,
    Forbidden,
    Validation(Vec<FieldError>),
    BadRequest(String),
    NotFound(String),
    /// Details are logged where the failure happened, never sent to the client.
    Internal,
}

impl ApiError {
    fn message(&self) -> String {
        match self {
            ApiError::Unauthenticated => "Authentication required".to_string(),
            ApiError::Forbidden => "Insufficient permissions".to_string(),
            ApiError::Validation(_) => "Validation failed".to_string(),
            ApiError::BadRequest(message) | ApiError::NotFound(message) => message.clone(),
            ApiError::Internal => "An internal error occurred".to_string(),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let errors = match self {
            ApiError::Validation(errors) => Some(errors.clone()),
            _ => None,
        };

        HttpResponse::build(self.status_code()).json(ApiResponse::failure(self.message(), errors))
    }
}

impl From<ModerationError> for ApiError {
    fn from(e: ModerationError) -> Self {
        match e {
            ModerationError::Forbidden => ApiError::Forbidden,
            ModerationError::Validation(errors) => ApiError::Validation(errors),
            ModerationError::ReportNotFound(_) | ModerationError::ContentMissing(_) => {
                ApiError::NotFound(e.to_string())
            }
            ModerationError::OwnerUnresolved(_) | ModerationError::ReportClosed(_) => {
                ApiError::BadRequest(e.to_string())
            }
            ModerationError::Relationship(RelationshipError::Database(e))
            | ModerationError::Database(e) => {
                log::error!("Moderation request failed: {}", e);
                ApiError::Internal
            }
            ModerationError::Relationship(e) => ApiError::BadRequest(e.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(e: validator::ValidationErrors) -> Self {
        let mut errors: Vec<FieldError> = e
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |err| {
                    let message = err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value ({})", err.code));
                    FieldError::new(field, message)
                })
            })
            .collect();
        errors.sort_by(|a, b| a.field.cmp(&b.field));

        ApiError::Validation(errors)
    }
}
