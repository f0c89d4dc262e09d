pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::errors::{HWSystemError, Result};
use crate::models::PaginationQuery;
use crate::models::assignments::requests::{CreateAssignmentRequest, UpdateAssignmentRequest};
use crate::storage::Storage;
use crate::utils::validate::parse_datetime;

pub struct AssignmentService {
    storage: Option<Arc<dyn Storage>>,
}

impl AssignmentService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Result<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from(request),
        }
    }

    // 创建作业
    pub async fn create_assignment(
        &self,
        request: &HttpRequest,
        body: CreateAssignmentRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_assignment(self, request, body).await
    }

    // 分页列出作业
    pub async fn list_assignments(
        &self,
        request: &HttpRequest,
        query: PaginationQuery,
    ) -> ActixResult<HttpResponse> {
        list::list_assignments(self, request, query).await
    }

    // 获取作业详情
    pub async fn get_assignment(
        &self,
        request: &HttpRequest,
        assignment_id: i64,
    ) -> ActixResult<HttpResponse> {
        get::get_assignment(self, request, assignment_id).await
    }

    // 更新作业
    pub async fn update_assignment(
        &self,
        request: &HttpRequest,
        assignment_id: i64,
        body: UpdateAssignmentRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_assignment(self, request, assignment_id, body).await
    }

    // 删除作业
    pub async fn delete_assignment(
        &self,
        request: &HttpRequest,
        assignment_id: i64,
    ) -> ActixResult<HttpResponse> {
        delete::delete_assignment(self, request, assignment_id).await
    }
}

// 解析请求中的截止时间
fn parse_due_date(raw: &str) -> Result<chrono::DateTime<chrono::Utc>> {
    parse_datetime(raw).map_err(|_| HWSystemError::date_parse(format!("Invalid due date: {raw}")))
}
