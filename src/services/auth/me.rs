use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::AuthService;
use crate::middlewares::RequireJWT;

// RequireJWT 每次请求都会从存储重新加载用户，这里直接返回
pub async fn handle_get_current_user(
    _service: &AuthService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = RequireJWT::current_user(request)?;
    Ok(HttpResponse::Ok().json(user))
}
