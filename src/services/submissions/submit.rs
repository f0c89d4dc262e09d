use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::SubmissionService;
use super::upload::remove_stored_files;
use crate::errors::{HWSystemError, Result};
use crate::middlewares::RequireJWT;
use crate::models::submissions::{
    entities::{SubmissionStatus, SubmissionUpsert},
    requests::SubmissionForm,
    responses::SubmissionResponse,
};

/// 创建或更新当前学生对某作业的提交
///
/// 顺序：参数校验 → 作业存在性 → 截止时间 → upsert。
/// 请求被拒绝时，本次已落盘的附件会被删除。
pub async fn submit(
    service: &SubmissionService,
    request: &HttpRequest,
    mut form: SubmissionForm,
) -> ActixResult<HttpResponse> {
    let files = std::mem::take(&mut form.files);
    let stored: Vec<String> = files.iter().map(|f| f.file_path.clone()).collect();

    let upsert = match prepare_upsert(service, request, form).await {
        Ok(mut upsert) => {
            upsert.attachments = files;
            upsert
        }
        Err(e) => {
            remove_stored_files(&stored).await;
            return Err(e.into());
        }
    };

    let storage = match service.get_storage(request) {
        Ok(storage) => storage,
        Err(e) => {
            remove_stored_files(&stored).await;
            return Err(e.into());
        }
    };

    let outcome = match storage.upsert_submission(upsert).await {
        Ok(outcome) => outcome,
        Err(e) => {
            remove_stored_files(&stored).await;
            return Err(e.into());
        }
    };

    info!(
        "Student {} {} submission {} ({}, {} new attachments)",
        outcome.submission.student_id,
        if outcome.created { "created" } else { "updated" },
        outcome.submission.id,
        outcome.submission.status,
        stored.len()
    );

    let body = SubmissionResponse {
        submission: outcome.submission,
        attachments: outcome.attachments,
    };
    if outcome.created {
        Ok(HttpResponse::Created().json(body))
    } else {
        Ok(HttpResponse::Ok().json(body))
    }
}

async fn prepare_upsert(
    service: &SubmissionService,
    request: &HttpRequest,
    form: SubmissionForm,
) -> Result<SubmissionUpsert> {
    let student = RequireJWT::current_user(request)?;

    let assignment_id = form
        .assignment_id
        .ok_or_else(|| HWSystemError::validation("Assignment ID is required"))?;

    // 未提供状态时按草稿保存
    let status = match form.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => SubmissionStatus::parse_requested(raw).ok_or_else(|| {
            HWSystemError::validation(r#"Invalid status. Must be "draft" or "submitted""#)
        })?,
        None => SubmissionStatus::Draft,
    };

    let storage = service.get_storage(request)?;
    let assignment = storage
        .get_assignment_by_id(assignment_id)
        .await?
        .ok_or_else(|| HWSystemError::not_found("Assignment not found"))?;

    // 草稿不受截止时间限制
    if status == SubmissionStatus::Submitted
        && !assignment.accepts_submission_at(chrono::Utc::now())
    {
        return Err(HWSystemError::deadline("Submission deadline has passed"));
    }

    Ok(SubmissionUpsert {
        assignment_id,
        student_id: student.id,
        text_content: form.text_content,
        status,
        attachments: Vec::new(),
    })
}
