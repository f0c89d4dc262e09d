use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::SubmissionService;
use crate::errors::HWSystemError;
use crate::models::PaginationQuery;

// 角色已由路由中间件检查
pub async fn list_by_assignment(
    service: &SubmissionService,
    request: &HttpRequest,
    assignment_id: i64,
    query: PaginationQuery,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    if storage.get_assignment_by_id(assignment_id).await?.is_none() {
        return Err(HWSystemError::not_found("Assignment not found").into());
    }

    let response = storage
        .list_submissions_by_assignment(assignment_id, query.normalized())
        .await?;

    Ok(HttpResponse::Ok().json(response))
}
