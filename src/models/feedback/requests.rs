use serde::Deserialize;

// 创建反馈请求
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFeedbackRequest {
    pub submission_id: Option<i64>,
    pub content: Option<String>,
    pub grade: Option<f64>,
}

// 更新反馈请求，content 与 grade 至少提供一个
#[derive(Debug, Deserialize)]
pub struct UpdateFeedbackRequest {
    pub content: Option<String>,
    pub grade: Option<f64>,
}
