/*!
 * 基于角色的访问控制中间件
 *
 * 必须挂在 RequireJWT 之后：角色取自 RequireJWT 写入请求扩展的当前用户。
 *
 * ```rust,ignore
 * web::resource("")
 *     .route(
 *         web::post()
 *             .to(create_assignment)
 *             .wrap(RequireRole::for_action(Resource::Assignment, Action::Create)),
 *     )
 *
 * web::resource("/my")
 *     .wrap(RequireRole::new_any(UserRole::student_roles()))
 * ```
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use tracing::info;

use crate::{
    authorization::{self, Action, Resource},
    models::users::entities::{User, UserRole},
};

use super::create_error_response;

/// 当前用户的角色属于 `allowed_roles` 之一才放行，否则 403
#[derive(Clone)]
pub struct RequireRole {
    allowed_roles: Vec<UserRole>,
}

impl RequireRole {
    /// 任一角色即可
    pub fn new_any(roles: &[&UserRole]) -> Self {
        Self {
            allowed_roles: roles.iter().map(|r| **r).collect(),
        }
    }

    /// 使用访问控制矩阵中 (资源, 操作) 允许的角色
    pub fn for_action(resource: Resource, action: Action) -> Self {
        Self::new_any(authorization::permission(resource, action).roles)
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireRole
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireRoleMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireRoleMiddleware {
            service: Rc::new(service),
            allowed_roles: Rc::new(self.allowed_roles.clone()),
        }))
    }
}

pub struct RequireRoleMiddleware<S> {
    service: Rc<S>,
    allowed_roles: Rc<Vec<UserRole>>,
}

impl<S, B> Service<ServiceRequest> for RequireRoleMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let allowed_roles = self.allowed_roles.clone();

        Box::pin(async move {
            // 当前用户由 RequireJWT 写入请求扩展
            let actor = req
                .extensions()
                .get::<User>()
                .map(|u| (u.id, u.role));

            let Some((user_id, role)) = actor else {
                info!("Role check without an authenticated user, RequireJWT must run first");
                return Ok(req.into_response(
                    create_error_response(
                        StatusCode::UNAUTHORIZED,
                        "Unauthorized: authentication required",
                    )
                    .map_into_right_body(),
                ));
            };

            if allowed_roles.contains(&role) {
                return Ok(srv.call(req).await?.map_into_left_body());
            }

            info!(
                "Access denied for user {} (role: {}). Allowed roles: {:?}",
                user_id, role, allowed_roles
            );
            Ok(req.into_response(
                create_error_response(
                    StatusCode::FORBIDDEN,
                    authorization::forbidden().message(),
                )
                .map_into_right_body(),
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, HttpResponse, test, web};
    use chrono::Utc;

    use crate::models::users::entities::Language;

    fn user_with_role(role: UserRole) -> User {
        User {
            id: 7,
            email: "u@x.com".to_string(),
            password_hash: String::new(),
            first_name: "Test".to_string(),
            last_name: role.to_string(),
            role,
            language: Language::default(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    async fn status_for(actor: Option<UserRole>, gate: RequireRole) -> StatusCode {
        let app = test::init_service(
            App::new().service(
                web::resource("/gated")
                    .wrap(gate)
                    .wrap_fn(move |req, srv| {
                        if let Some(role) = actor {
                            req.extensions_mut().insert(user_with_role(role));
                        }
                        srv.call(req)
                    })
                    .route(web::get().to(HttpResponse::Ok)),
            ),
        )
        .await;
        let req = test::TestRequest::get().uri("/gated").to_request();
        test::call_service(&app, req).await.status()
    }

    #[actix_web::test]
    async fn test_any_listed_role_passes() {
        let gate = || RequireRole::new_any(&[&UserRole::Ta, &UserRole::Instructor]);
        assert_eq!(status_for(Some(UserRole::Ta), gate()).await, StatusCode::OK);
        assert_eq!(status_for(Some(UserRole::Instructor), gate()).await, StatusCode::OK);
        assert_eq!(
            status_for(Some(UserRole::Student), gate()).await,
            StatusCode::FORBIDDEN
        );
    }

    #[actix_web::test]
    async fn test_for_action_follows_permission_matrix() {
        let gate = || RequireRole::for_action(Resource::Assignment, Action::Delete);
        assert_eq!(
            status_for(Some(UserRole::Instructor), gate()).await,
            StatusCode::OK
        );
        assert_eq!(status_for(Some(UserRole::Ta), gate()).await, StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn test_missing_user_is_unauthorized() {
        let gate = RequireRole::new_any(&[&UserRole::Admin]);
        assert_eq!(status_for(None, gate).await, StatusCode::UNAUTHORIZED);
    }
}
