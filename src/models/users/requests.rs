use super::entities::{Language, UserRole};
use crate::models::common::PaginationQuery;
use serde::Deserialize;

// 用户列表查询参数（来自HTTP请求）
#[derive(Debug, Deserialize)]
pub struct UserListParams {
    #[serde(flatten)]
    pub pagination: PaginationQuery,
    /// 精确匹配的角色筛选，未知角色返回空列表
    pub role: Option<String>,
}

// 创建用户（注册或初始化管理员），password 已是哈希值
#[derive(Debug, Clone)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub language: Language,
}

// 管理员修改角色
#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: Option<String>,
}

// 个人资料更新（存储层使用）
#[derive(Debug, Clone, Default)]
pub struct UpdateProfile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub language: Option<Language>,
}
