use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::AssignmentService;
use crate::errors::HWSystemError;
use crate::middlewares::RequireJWT;
use crate::models::SuccessResponse;
use crate::services::submissions::upload::remove_stored_files;

// 角色已由路由中间件检查，删除不涉及所有权
pub async fn delete_assignment(
    service: &AssignmentService,
    request: &HttpRequest,
    assignment_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    let stored_files = storage
        .delete_assignment(assignment_id)
        .await?
        .ok_or_else(|| HWSystemError::not_found("Assignment not found"))?;

    if let Some(user_id) = RequireJWT::extract_user_id(request) {
        info!(
            "User {} deleted assignment {} ({} attachment files)",
            user_id,
            assignment_id,
            stored_files.len()
        );
    }

    remove_stored_files(&stored_files).await;

    Ok(HttpResponse::Ok().json(SuccessResponse::ok()))
}
