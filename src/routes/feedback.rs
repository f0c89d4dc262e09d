use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::authorization::{Action, Resource};
use crate::middlewares::{self, RequireRole};
use crate::models::feedback::requests::{CreateFeedbackRequest, UpdateFeedbackRequest};
use crate::services::FeedbackService;
use crate::utils::SafeIDI64;

// 懒加载的全局 FeedbackService 实例
static FEEDBACK_SERVICE: Lazy<FeedbackService> = Lazy::new(FeedbackService::new_lazy);

pub async fn create_feedback(
    req: HttpRequest,
    body: web::Json<CreateFeedbackRequest>,
) -> ActixResult<HttpResponse> {
    FEEDBACK_SERVICE
        .create_feedback(&req, body.into_inner())
        .await
}

pub async fn update_feedback(
    req: HttpRequest,
    path: SafeIDI64,
    body: web::Json<UpdateFeedbackRequest>,
) -> ActixResult<HttpResponse> {
    FEEDBACK_SERVICE
        .update_feedback(&req, path.0, body.into_inner())
        .await
}

pub async fn list_by_submission(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    FEEDBACK_SERVICE.list_by_submission(&req, path.0).await
}

// 配置路由
pub fn configure_feedback_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/feedback")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    .route(web::post().to(create_feedback))
                    .wrap(RequireRole::for_action(Resource::Feedback, Action::Create)),
            )
            .service(
                web::resource("/by-submission/{id}").route(web::get().to(list_by_submission)),
            )
            .service(
                web::resource("/{id}")
                    .route(web::put().to(update_feedback))
                    .wrap(RequireRole::for_action(Resource::Feedback, Action::Update)),
            ),
    );
}
