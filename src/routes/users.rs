use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::authorization::{Action, Resource};
use crate::middlewares;
use crate::models::users::requests::{UpdateRoleRequest, UserListParams};
use crate::services::UserService;
use crate::utils::SafeIDI64;

// 懒加载的全局 UserService 实例
static USER_SERVICE: Lazy<UserService> = Lazy::new(UserService::new_lazy);

// HTTP处理程序
pub async fn list_users(
    req: HttpRequest,
    query: web::Query<UserListParams>,
) -> ActixResult<HttpResponse> {
    USER_SERVICE.list_users(query.into_inner(), &req).await
}

pub async fn update_user_role(
    req: HttpRequest,
    user_id: SafeIDI64,
    body: web::Json<UpdateRoleRequest>,
) -> ActixResult<HttpResponse> {
    USER_SERVICE
        .update_user_role(user_id.0, body.into_inner(), &req)
        .await
}

// 配置路由（仅管理员）
pub fn configure_user_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/users")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    .route(web::get().to(list_users))
                    .wrap(middlewares::RequireRole::for_action(
                        Resource::UserRole,
                        Action::List,
                    )),
            )
            .service(
                web::resource("/{id}/role")
                    .route(web::patch().to(update_user_role))
                    .wrap(middlewares::RequireRole::for_action(
                        Resource::UserRole,
                        Action::Update,
                    )),
            ),
    );
}
