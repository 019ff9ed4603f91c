pub mod admin;
pub mod error;
pub mod reports;
pub mod response;

use actix_web::{error::InternalError, web, ResponseError};
use error::ApiError;

/// Configures the web app by adding services from each web file.
///
/// Malformed JSON bodies and query strings are answered with the standard
/// envelope instead of actix's plain-text errors.
pub fn configure(conf: &mut web::ServiceConfig) {
    conf.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        log::debug!("Rejected JSON body: {}", err);
        let response = ApiError::BadRequest(format!("Invalid request body: {}", err)).error_response();
        InternalError::from_response(err, response).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        log::debug!("Rejected query string: {}", err);
        let response = ApiError::BadRequest(format!("Invalid query string: {}", err)).error_response();
        InternalError::from_response(err, response).into()
    }));

    admin::configure(conf);
    reports::configure(conf);
}
