use serde::Deserialize;

// 创建作业请求；title 与 dueDate 必填，其余字段使用默认值
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssignmentRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub allow_late_submission: Option<bool>,
    pub max_file_size: Option<i64>,
    pub allowed_file_types: Option<serde_json::Value>,
}

// 更新作业请求（部分更新，创建者字段不接受修改）
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAssignmentRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub allow_late_submission: Option<bool>,
    pub max_file_size: Option<i64>,
    pub allowed_file_types: Option<serde_json::Value>,
}

// 存储层使用的新建作业数据
#[derive(Debug, Clone)]
pub struct NewAssignment {
    pub title: String,
    pub description: Option<String>,
    pub created_by: i64,
    pub due_date: chrono::DateTime<chrono::Utc>,
    pub allow_late_submission: bool,
    pub max_file_size: i64,
    pub allowed_file_types: serde_json::Value,
}

// 存储层使用的作业更新数据，None 表示保留原值
#[derive(Debug, Clone, Default)]
pub struct AssignmentChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<chrono::DateTime<chrono::Utc>>,
    pub allow_late_submission: Option<bool>,
    pub max_file_size: Option<i64>,
    pub allowed_file_types: Option<serde_json::Value>,
}
