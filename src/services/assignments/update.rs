use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{AssignmentService, parse_due_date};
use crate::authorization::{Action, Resource, authorize};
use crate::errors::HWSystemError;
use crate::middlewares::RequireJWT;
use crate::models::assignments::requests::{AssignmentChanges, UpdateAssignmentRequest};

pub async fn update_assignment(
    service: &AssignmentService,
    request: &HttpRequest,
    assignment_id: i64,
    body: UpdateAssignmentRequest,
) -> ActixResult<HttpResponse> {
    let actor = RequireJWT::current_user(request)?;
    let storage = service.get_storage(request)?;

    // 先确认存在，再检查所有权
    let existing = storage
        .get_assignment_by_id(assignment_id)
        .await?
        .ok_or_else(|| HWSystemError::not_found("Assignment not found"))?;
    authorize(
        &actor,
        Resource::Assignment,
        Action::Update,
        Some(existing.created_by),
    )?;

    let due_date = match body.due_date.as_deref() {
        Some(raw) => Some(parse_due_date(raw)?),
        None => None,
    };

    let changes = AssignmentChanges {
        title: body.title,
        description: body.description,
        due_date,
        allow_late_submission: body.allow_late_submission,
        max_file_size: body.max_file_size,
        allowed_file_types: body.allowed_file_types,
    };

    match storage.update_assignment(assignment_id, changes).await? {
        Some(assignment) => Ok(HttpResponse::Ok().json(assignment)),
        None => Err(HWSystemError::not_found("Assignment not found").into()),
    }
}
