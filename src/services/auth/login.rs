use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::AuthService;
use crate::errors::HWSystemError;
use crate::models::auth::{AuthResponse, LoginRequest};
use crate::utils::password::verify_password;

pub async fn handle_login(
    service: &AuthService,
    login_request: LoginRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let (Some(email), Some(password)) = (
        login_request.email.filter(|e| !e.trim().is_empty()),
        login_request.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(HWSystemError::validation("Email and password are required").into());
    };

    let storage = service.get_storage(request)?;

    // 未知邮箱和密码错误返回同一条信息
    let user = storage
        .get_user_by_email(email.trim())
        .await?
        .filter(|user| verify_password(&password, &user.password_hash))
        .ok_or_else(|| HWSystemError::authentication("Invalid credentials"))?;

    let token = service.issue_token(&user)?;
    info!("User {} logged in", user.id);

    Ok(HttpResponse::Ok().json(AuthResponse { token, user }))
}
