use crate::models::users::entities::User;
use serde::Serialize;

// 登录/注册响应
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}
