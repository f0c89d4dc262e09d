use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::SubmissionService;
use crate::middlewares::RequireJWT;
use crate::models::submissions::requests::MySubmissionsQuery;

pub async fn list_my_submissions(
    service: &SubmissionService,
    request: &HttpRequest,
    query: MySubmissionsQuery,
) -> ActixResult<HttpResponse> {
    let student = RequireJWT::current_user(request)?;
    let storage = service.get_storage(request)?;

    let submissions = storage
        .list_my_submissions(student.id, query.assignment_id)
        .await?;

    Ok(HttpResponse::Ok().json(submissions))
}
