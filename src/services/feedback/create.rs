use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{FeedbackService, check_grade};
use crate::errors::HWSystemError;
use crate::middlewares::RequireJWT;
use crate::models::feedback::{requests::CreateFeedbackRequest, responses::FeedbackResponse};

pub async fn create_feedback(
    service: &FeedbackService,
    request: &HttpRequest,
    body: CreateFeedbackRequest,
) -> ActixResult<HttpResponse> {
    let reviewer = RequireJWT::current_user(request)?;

    let content = body.content.filter(|c| !c.trim().is_empty());
    let (Some(submission_id), Some(content)) = (body.submission_id, content) else {
        return Err(HWSystemError::validation("Submission ID and content are required").into());
    };
    check_grade(body.grade)?;

    let storage = service.get_storage(request)?;
    if storage.get_submission_by_id(submission_id).await?.is_none() {
        return Err(HWSystemError::not_found("Submission not found").into());
    }

    // 反馈与分数在同一事务中写入
    let feedback = storage
        .record_feedback(submission_id, reviewer.id, content, body.grade)
        .await?;

    info!(
        "User {} left feedback {} on submission {} (grade: {:?})",
        reviewer.id, feedback.id, submission_id, body.grade
    );

    Ok(HttpResponse::Created().json(FeedbackResponse {
        feedback,
        grade: body.grade,
    }))
}
