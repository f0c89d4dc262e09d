use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::UserService;
use crate::errors::HWSystemError;
use crate::middlewares::RequireJWT;
use crate::models::users::{entities::UserRole, requests::UpdateRoleRequest};

pub async fn update_user_role(
    service: &UserService,
    user_id: i64,
    update: UpdateRoleRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let role = update
        .role
        .as_deref()
        .and_then(|r| r.parse::<UserRole>().ok())
        .ok_or_else(|| HWSystemError::validation("Invalid role"))?;

    let storage = service.get_storage(request)?;
    let user = storage
        .update_user_role(user_id, role)
        .await?
        .ok_or_else(|| HWSystemError::not_found("User not found"))?;

    if let Some(admin_id) = RequireJWT::extract_user_id(request) {
        info!("User {} changed role of user {} to {}", admin_id, user.id, role);
    }

    Ok(HttpResponse::Ok().json(user))
}
