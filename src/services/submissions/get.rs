use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::SubmissionService;
use crate::authorization::{Action, Resource, authorize};
use crate::errors::HWSystemError;
use crate::middlewares::RequireJWT;

pub async fn get_submission(
    service: &SubmissionService,
    request: &HttpRequest,
    submission_id: i64,
) -> ActixResult<HttpResponse> {
    let actor = RequireJWT::current_user(request)?;
    let storage = service.get_storage(request)?;

    let submission = storage
        .get_submission_by_id(submission_id)
        .await?
        .ok_or_else(|| HWSystemError::not_found("Submission not found"))?;
    authorize(
        &actor,
        Resource::Submission,
        Action::Read,
        Some(submission.student_id),
    )?;

    let detail = storage.load_submission_detail(submission).await?;
    Ok(HttpResponse::Ok().json(detail))
}
