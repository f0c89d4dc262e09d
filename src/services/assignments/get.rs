use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::AssignmentService;
use crate::errors::HWSystemError;

pub async fn get_assignment(
    service: &AssignmentService,
    request: &HttpRequest,
    assignment_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    match storage.get_assignment_by_id(assignment_id).await? {
        Some(assignment) => Ok(HttpResponse::Ok().json(assignment)),
        None => Err(HWSystemError::not_found("Assignment not found").into()),
    }
}
