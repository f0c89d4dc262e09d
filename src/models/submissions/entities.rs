use serde::{Deserialize, Serialize};

// 提交状态，只会向前推进：draft -> submitted -> graded
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Draft,
    Submitted,
    Graded,
}

impl SubmissionStatus {
    pub const DRAFT: &'static str = "draft";
    pub const SUBMITTED: &'static str = "submitted";
    pub const GRADED: &'static str = "graded";

    /// 解析学生可请求的状态，graded 只能由批改产生
    pub fn parse_requested(s: &str) -> Option<Self> {
        match s {
            Self::DRAFT => Some(SubmissionStatus::Draft),
            Self::SUBMITTED => Some(SubmissionStatus::Submitted),
            _ => None,
        }
    }

    /// 学生再次提交后的状态：取当前状态与请求状态中靠后者
    pub fn advance(current: Option<Self>, requested: Self) -> Self {
        match current {
            Some(current) => current.max(requested),
            None => requested,
        }
    }
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmissionStatus::Draft => write!(f, "{}", Self::DRAFT),
            SubmissionStatus::Submitted => write!(f, "{}", Self::SUBMITTED),
            SubmissionStatus::Graded => write!(f, "{}", Self::GRADED),
        }
    }
}

impl std::str::FromStr for SubmissionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            Self::DRAFT => Ok(SubmissionStatus::Draft),
            Self::SUBMITTED => Ok(SubmissionStatus::Submitted),
            Self::GRADED => Ok(SubmissionStatus::Graded),
            _ => Err(format!("Invalid submission status: {s}")),
        }
    }
}

/// 首次进入 submitted 时记录提交时间，之后保持不变
pub fn next_submitted_at(existing: Option<i64>, requested: SubmissionStatus, now: i64) -> Option<i64> {
    existing.or((requested == SubmissionStatus::Submitted).then_some(now))
}

// 提交实体
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: i64,
    pub assignment_id: i64,
    pub student_id: i64,
    pub text_content: Option<String>,
    pub status: SubmissionStatus,
    pub submitted_at: Option<chrono::DateTime<chrono::Utc>>,
    pub grade: Option<f64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

// 附件实体
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: i64,
    pub submission_id: i64,
    pub file_name: String,
    #[serde(skip)]
    pub file_path: String,
    pub file_size: i64,
    pub file_type: String,
    pub uploaded_at: chrono::DateTime<chrono::Utc>,
}

// 已落盘、待写入数据库的附件
#[derive(Debug, Clone)]
pub struct NewAttachment {
    pub file_name: String,
    pub file_path: String,
    pub file_size: i64,
    pub file_type: String,
}

// 附件及其所属学生，用于访问控制
#[derive(Debug, Clone)]
pub struct OwnedAttachment {
    pub attachment: Attachment,
    pub student_id: i64,
}

// 创建或更新提交
#[derive(Debug, Clone)]
pub struct SubmissionUpsert {
    pub assignment_id: i64,
    pub student_id: i64,
    pub text_content: Option<String>,
    pub status: SubmissionStatus,
    pub attachments: Vec<NewAttachment>,
}

// 创建或更新的结果
#[derive(Debug, Clone)]
pub struct UpsertOutcome {
    pub submission: Submission,
    pub attachments: Vec<Attachment>,
    pub created: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use SubmissionStatus::*;

    #[test]
    fn test_first_submission_takes_requested_status() {
        assert_eq!(SubmissionStatus::advance(None, Draft), Draft);
        assert_eq!(SubmissionStatus::advance(None, Submitted), Submitted);
    }

    #[test]
    fn test_status_never_moves_backward() {
        assert_eq!(SubmissionStatus::advance(Some(Draft), Draft), Draft);
        assert_eq!(SubmissionStatus::advance(Some(Draft), Submitted), Submitted);
        assert_eq!(SubmissionStatus::advance(Some(Submitted), Draft), Submitted);
        assert_eq!(SubmissionStatus::advance(Some(Graded), Submitted), Graded);
        assert_eq!(SubmissionStatus::advance(Some(Graded), Draft), Graded);
    }

    #[test]
    fn test_submitted_at_is_set_once() {
        assert_eq!(next_submitted_at(None, Draft, 100), None);
        assert_eq!(next_submitted_at(None, Submitted, 100), Some(100));
        assert_eq!(next_submitted_at(Some(50), Submitted, 100), Some(50));
        assert_eq!(next_submitted_at(Some(50), Draft, 100), Some(50));
    }

    #[test]
    fn test_students_cannot_request_graded() {
        assert_eq!(SubmissionStatus::parse_requested("draft"), Some(Draft));
        assert_eq!(SubmissionStatus::parse_requested("submitted"), Some(Submitted));
        assert_eq!(SubmissionStatus::parse_requested("graded"), None);
        assert_eq!(SubmissionStatus::parse_requested("done"), None);
    }
}
