use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};

use super::SystemService;
use crate::models::{AppStartTime, HealthResponse};

pub async fn handle_health(
    _service: &SystemService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let now = chrono::Utc::now();
    let uptime = request
        .app_data::<web::Data<AppStartTime>>()
        .map(|start| now.signed_duration_since(start.start_datetime).num_seconds())
        .unwrap_or(0);

    Ok(HttpResponse::Ok().json(HealthResponse {
        status: "healthy",
        timestamp: now,
        uptime,
    }))
}
