use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::AuthService;
use crate::errors::HWSystemError;
use crate::models::auth::{AuthResponse, RegisterRequest};
use crate::models::users::{
    entities::{Language, UserRole},
    requests::CreateUserRequest,
};
use crate::utils::password::hash_password;
use crate::utils::validate::{validate_email, validate_password};

fn required(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

pub async fn handle_register(
    service: &AuthService,
    register_request: RegisterRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    // 密码不做 trim，其余字段去掉首尾空白
    let (Some(email), Some(password), Some(first_name), Some(last_name)) = (
        required(register_request.email),
        register_request.password.filter(|p| !p.is_empty()),
        required(register_request.first_name),
        required(register_request.last_name),
    ) else {
        return Err(HWSystemError::validation("All fields are required").into());
    };

    validate_email(&email).map_err(HWSystemError::validation)?;
    validate_password(&password).map_err(HWSystemError::validation)?;

    let storage = service.get_storage(request)?;

    if storage.get_user_by_email(&email).await?.is_some() {
        return Err(HWSystemError::conflict("User already exists").into());
    }

    // 注册用户的角色固定为 student
    let user = storage
        .create_user(CreateUserRequest {
            email,
            password: hash_password(&password)?,
            first_name,
            last_name,
            role: UserRole::Student,
            language: Language::default(),
        })
        .await?;

    let token = service.issue_token(&user)?;
    info!("User {} registered", user.id);

    Ok(HttpResponse::Created().json(AuthResponse { token, user }))
}
