use actix_multipart::Multipart;
use actix_web::{
    HttpRequest, HttpResponse, Result as ActixResult, guard,
    http::header::CONTENT_TYPE,
    web,
};
use once_cell::sync::Lazy;

use crate::authorization::{Action, Resource};
use crate::middlewares::{self, RequireRole};
use crate::models::PaginationQuery;
use crate::models::submissions::requests::{MySubmissionsQuery, SubmitRequest};
use crate::models::users::entities::UserRole;
use crate::services::SubmissionService;
use crate::services::submissions::Disposition;
use crate::utils::SafeIDI64;

// 懒加载的全局 SubmissionService 实例
static SUBMISSION_SERVICE: Lazy<SubmissionService> = Lazy::new(SubmissionService::new_lazy);

// 带附件的提交
pub async fn submit_multipart(req: HttpRequest, payload: Multipart) -> ActixResult<HttpResponse> {
    SUBMISSION_SERVICE.submit_multipart(&req, payload).await
}

// 不带附件的提交
pub async fn submit_json(
    req: HttpRequest,
    body: web::Json<SubmitRequest>,
) -> ActixResult<HttpResponse> {
    SUBMISSION_SERVICE.submit_json(&req, body.into_inner()).await
}

pub async fn list_my_submissions(
    req: HttpRequest,
    query: web::Query<MySubmissionsQuery>,
) -> ActixResult<HttpResponse> {
    SUBMISSION_SERVICE
        .list_my_submissions(&req, query.into_inner())
        .await
}

pub async fn get_submission(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    SUBMISSION_SERVICE.get_submission(&req, path.0).await
}

pub async fn list_by_assignment(
    req: HttpRequest,
    path: SafeIDI64,
    query: web::Query<PaginationQuery>,
) -> ActixResult<HttpResponse> {
    SUBMISSION_SERVICE
        .list_by_assignment(&req, path.0, query.into_inner())
        .await
}

pub async fn download_attachment(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    SUBMISSION_SERVICE
        .serve_attachment(&req, path.0, Disposition::Download)
        .await
}

pub async fn view_attachment(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    SUBMISSION_SERVICE
        .serve_attachment(&req, path.0, Disposition::Inline)
        .await
}

fn is_multipart(ctx: &guard::GuardContext) -> bool {
    ctx.head()
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("multipart/form-data"))
}

// 配置路由
pub fn configure_submission_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/submissions")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    // 创建或更新提交 - 仅学生本人
                    .route(
                        web::post()
                            .guard(guard::fn_guard(is_multipart))
                            .to(submit_multipart)
                            .wrap(RequireRole::for_action(Resource::Submission, Action::Create)),
                    )
                    .route(
                        web::post()
                            .to(submit_json)
                            .wrap(RequireRole::for_action(Resource::Submission, Action::Create)),
                    ),
            )
            // 固定路径需注册在 /{id} 之前
            .service(
                web::resource("/my")
                    .route(web::get().to(list_my_submissions))
                    .wrap(RequireRole::new_any(UserRole::student_roles())),
            )
            .service(
                web::resource("/by-assignment/{id}")
                    .route(web::get().to(list_by_assignment))
                    .wrap(RequireRole::for_action(Resource::Submission, Action::List)),
            )
            .route(
                "/attachments/{id}/download",
                web::get().to(download_attachment),
            )
            .route("/attachments/{id}/view", web::get().to(view_attachment))
            .route("/{id}", web::get().to(get_submission)),
    );
}
