use actix_web::{HttpRequest, error};
use tracing::debug;

use crate::errors::HWSystemError;

// JSON 请求体解析失败时返回 400 {"error": ...}
pub fn json_error_handler(err: error::JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    debug!("Invalid JSON body for {}: {}", req.path(), err);
    let message = match &err {
        error::JsonPayloadError::ContentType => "Content type must be application/json".to_string(),
        error::JsonPayloadError::OverflowKnownLength { .. }
        | error::JsonPayloadError::Overflow { .. } => "Request body is too large".to_string(),
        other => format!("Invalid request body: {other}"),
    };
    HWSystemError::validation(message).into()
}

// 查询参数解析失败时返回 400 {"error": ...}
pub fn query_error_handler(err: error::QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    debug!("Invalid query string for {}: {}", req.path(), err);
    HWSystemError::validation(format!("Invalid query parameters: {err}")).into()
}
