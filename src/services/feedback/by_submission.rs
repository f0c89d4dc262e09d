use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::FeedbackService;
use crate::authorization::{Action, Resource, authorize};
use crate::errors::HWSystemError;
use crate::middlewares::RequireJWT;

// 提交所属学生或教学人员可查看
pub async fn list_by_submission(
    service: &FeedbackService,
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
        Resource::Feedback,
        Action::List,
        Some(submission.student_id),
    )?;

    let feedback = storage.list_feedback_by_submission(submission_id).await?;
    Ok(HttpResponse::Ok().json(feedback))
}
