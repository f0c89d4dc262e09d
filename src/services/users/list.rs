use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::UserService;
use crate::models::users::requests::UserListParams;

pub async fn list_users(
    service: &UserService,
    query: UserListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;

    // 角色筛选为精确匹配，空字符串视为不筛选
    let role = query.role.filter(|r| !r.is_empty());
    let response = storage
        .list_users_with_pagination(query.pagination.normalized(), role)
        .await?;

    Ok(HttpResponse::Ok().json(response))
}
