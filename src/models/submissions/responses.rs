use super::entities::{Attachment, Submission};
use crate::models::PaginationInfo;
use crate::models::feedback::entities::FeedbackEntry;
use serde::Serialize;

// 创建/更新提交的响应
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionResponse {
    #[serde(flatten)]
    pub submission: Submission,
    pub attachments: Vec<Attachment>,
}

// 我的提交列表项
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MySubmission {
    #[serde(flatten)]
    pub submission: Submission,
    pub assignment_title: String,
    pub due_date: chrono::DateTime<chrono::Utc>,
    pub attachments: Vec<Attachment>,
}

// 提交详情
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionDetail {
    #[serde(flatten)]
    pub submission: Submission,
    pub assignment_title: String,
    pub student_name: String,
    pub attachments: Vec<Attachment>,
    pub feedback: Vec<FeedbackEntry>,
}

// 按作业查看的提交列表项
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionListItem {
    #[serde(flatten)]
    pub submission: Submission,
    pub student_name: String,
}

// 按作业查看的提交列表
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionListResponse {
    pub submissions: Vec<SubmissionListItem>,
    #[serde(flatten)]
    pub pagination: PaginationInfo,
}
