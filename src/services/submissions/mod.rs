pub mod by_assignment;
pub mod download;
pub mod get;
pub mod my;
pub mod submit;
pub mod upload;

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::errors::Result;
use crate::models::PaginationQuery;
use crate::models::submissions::requests::{MySubmissionsQuery, SubmissionForm, SubmitRequest};
use crate::storage::Storage;

pub use download::Disposition;

pub struct SubmissionService {
    storage: Option<Arc<dyn Storage>>,
}

impl SubmissionService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Result<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from(request),
        }
    }

    // 通过 multipart 表单创建或更新提交
    pub async fn submit_multipart(
        &self,
        request: &HttpRequest,
        payload: Multipart,
    ) -> ActixResult<HttpResponse> {
        let form = upload::read_submission_form(payload).await?;
        submit::submit(self, request, form).await
    }

    // 通过 JSON 创建或更新提交（无附件）
    pub async fn submit_json(
        &self,
        request: &HttpRequest,
        body: SubmitRequest,
    ) -> ActixResult<HttpResponse> {
        submit::submit(self, request, SubmissionForm::from(body)).await
    }

    // 当前学生的提交
    pub async fn list_my_submissions(
        &self,
        request: &HttpRequest,
        query: MySubmissionsQuery,
    ) -> ActixResult<HttpResponse> {
        my::list_my_submissions(self, request, query).await
    }

    // 提交详情
    pub async fn get_submission(
        &self,
        request: &HttpRequest,
        submission_id: i64,
    ) -> ActixResult<HttpResponse> {
        get::get_submission(self, request, submission_id).await
    }

    // 某作业的全部提交
    pub async fn list_by_assignment(
        &self,
        request: &HttpRequest,
        assignment_id: i64,
        query: PaginationQuery,
    ) -> ActixResult<HttpResponse> {
        by_assignment::list_by_assignment(self, request, assignment_id, query).await
    }

    // 下载或在线查看附件
    pub async fn serve_attachment(
        &self,
        request: &HttpRequest,
        attachment_id: i64,
        disposition: Disposition,
    ) -> ActixResult<HttpResponse> {
        download::serve_attachment(self, request, attachment_id, disposition).await
    }
}
