use super::entities::Assignment;
use crate::models::PaginationInfo;
use serde::Serialize;

// 作业列表响应
#[derive(Debug, Clone, Serialize)]
pub struct AssignmentListResponse {
    pub assignments: Vec<Assignment>,
    #[serde(flatten)]
    pub pagination: PaginationInfo,
}
