use super::entities::Feedback;
use serde::Serialize;

// 创建/更新反馈的响应，grade 为本次请求提供的分数
#[derive(Debug, Clone, Serialize)]
pub struct FeedbackResponse {
    #[serde(flatten)]
    pub feedback: Feedback,
    pub grade: Option<f64>,
}
