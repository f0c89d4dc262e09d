use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{FeedbackService, check_grade};
use crate::authorization::{Action, Resource, authorize};
use crate::errors::HWSystemError;
use crate::middlewares::RequireJWT;
use crate::models::feedback::{requests::UpdateFeedbackRequest, responses::FeedbackResponse};

pub async fn update_feedback(
    service: &FeedbackService,
    request: &HttpRequest,
    feedback_id: i64,
    body: UpdateFeedbackRequest,
) -> ActixResult<HttpResponse> {
    let actor = RequireJWT::current_user(request)?;

    if body.content.is_none() && body.grade.is_none() {
        return Err(HWSystemError::validation("Content or grade is required").into());
    }
    if body.content.as_deref().is_some_and(|c| c.trim().is_empty()) {
        return Err(HWSystemError::validation("Content cannot be empty").into());
    }
    check_grade(body.grade)?;

    let storage = service.get_storage(request)?;
    let existing = storage
        .get_feedback_by_id(feedback_id)
        .await?
        .ok_or_else(|| HWSystemError::not_found("Feedback not found"))?;
    authorize(
        &actor,
        Resource::Feedback,
        Action::Update,
        Some(existing.reviewer_id),
    )?;

    let feedback = storage
        .revise_feedback(feedback_id, body.content, body.grade)
        .await?
        .ok_or_else(|| HWSystemError::not_found("Feedback not found"))?;

    Ok(HttpResponse::Ok().json(FeedbackResponse {
        feedback,
        grade: body.grade,
    }))
}
