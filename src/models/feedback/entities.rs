use serde::{Deserialize, Serialize};

// 批改反馈实体；分数只保存在提交记录上
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub id: i64,
    pub submission_id: i64,
    pub reviewer_id: i64,
    pub content: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

// 反馈列表项，附带批改人姓名和提交当前分数
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackEntry {
    #[serde(flatten)]
    pub feedback: Feedback,
    pub reviewer_name: String,
    pub grade: Option<f64>,
}
