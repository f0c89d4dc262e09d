use super::entities::User;
use crate::models::PaginationInfo;
use serde::Serialize;

// 用户列表响应
#[derive(Debug, Clone, Serialize)]
pub struct UserListResponse {
    pub users: Vec<User>,
    #[serde(flatten)]
    pub pagination: PaginationInfo,
}
