use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{AssignmentService, parse_due_date};
use crate::errors::HWSystemError;
use crate::middlewares::RequireJWT;
use crate::models::assignments::requests::{CreateAssignmentRequest, NewAssignment};

const DEFAULT_MAX_FILE_SIZE: i64 = 10;

pub async fn create_assignment(
    service: &AssignmentService,
    request: &HttpRequest,
    body: CreateAssignmentRequest,
) -> ActixResult<HttpResponse> {
    let creator = RequireJWT::current_user(request)?;

    let title = body.title.map(|t| t.trim().to_string()).filter(|t| !t.is_empty());
    let due_date = body.due_date.filter(|d| !d.trim().is_empty());
    let (Some(title), Some(due_date)) = (title, due_date) else {
        return Err(HWSystemError::validation("Title and due date are required").into());
    };

    // maxFileSize 和 allowedFileTypes 只做原样存储
    let assignment = NewAssignment {
        title,
        description: body.description,
        created_by: creator.id,
        due_date: parse_due_date(&due_date)?,
        allow_late_submission: body.allow_late_submission.unwrap_or(false),
        max_file_size: body.max_file_size.unwrap_or(DEFAULT_MAX_FILE_SIZE),
        allowed_file_types: body
            .allowed_file_types
            .unwrap_or_else(|| serde_json::json!([])),
    };

    let storage = service.get_storage(request)?;
    let created = storage.create_assignment(assignment).await?;
    info!("User {} created assignment {}", creator.id, created.id);

    Ok(HttpResponse::Created().json(created))
}
