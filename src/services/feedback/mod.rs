pub mod by_submission;
pub mod create;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::errors::{HWSystemError, Result};
use crate::models::feedback::requests::{CreateFeedbackRequest, UpdateFeedbackRequest};
use crate::storage::Storage;
use crate::utils::validate::validate_grade;

pub struct FeedbackService {
    storage: Option<Arc<dyn Storage>>,
}

impl FeedbackService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Result<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from(request),
        }
    }

    // 创建反馈（可附带分数）
    pub async fn create_feedback(
        &self,
        request: &HttpRequest,
        body: CreateFeedbackRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_feedback(self, request, body).await
    }

    // 修改反馈
    pub async fn update_feedback(
        &self,
        request: &HttpRequest,
        feedback_id: i64,
        body: UpdateFeedbackRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_feedback(self, request, feedback_id, body).await
    }

    // 某提交的全部反馈
    pub async fn list_by_submission(
        &self,
        request: &HttpRequest,
        submission_id: i64,
    ) -> ActixResult<HttpResponse> {
        by_submission::list_by_submission(self, request, submission_id).await
    }
}

fn check_grade(grade: Option<f64>) -> Result<()> {
    match grade {
        Some(grade) => validate_grade(grade).map_err(HWSystemError::validation),
        None => Ok(()),
    }
}
