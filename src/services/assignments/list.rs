use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::AssignmentService;
use crate::models::PaginationQuery;

pub async fn list_assignments(
    service: &AssignmentService,
    request: &HttpRequest,
    query: PaginationQuery,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let response = storage
        .list_assignments_with_pagination(query.normalized())
        .await?;

    Ok(HttpResponse::Ok().json(response))
}
