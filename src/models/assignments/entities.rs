use serde::{Deserialize, Serialize};

// 作业实体
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    /// 创建者 ID，创建后不可修改
    pub created_by: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator_name: Option<String>,
    pub due_date: chrono::DateTime<chrono::Utc>,
    pub allow_late_submission: bool,
    /// 提示性字段，服务端不据此校验上传
    pub max_file_size: i64,
    /// 提示性字段，原样存储
    pub allowed_file_types: serde_json::Value,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Assignment {
    /// 在给定时刻提交是否已超过截止时间（截止时刻本身仍可提交）。
    /// 截止时间按秒存储，因此按整秒比较：截止那一秒内的提交都不算迟交
    pub fn is_past_due(&self, now: chrono::DateTime<chrono::Utc>) -> bool {
        now.timestamp() > self.due_date.timestamp()
    }

    /// 该时刻是否仍接受正式提交
    pub fn accepts_submission_at(&self, now: chrono::DateTime<chrono::Utc>) -> bool {
        self.allow_late_submission || !self.is_past_due(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn assignment(due: chrono::DateTime<Utc>, allow_late: bool) -> Assignment {
        Assignment {
            id: 1,
            title: "HW1".to_string(),
            description: None,
            created_by: 1,
            creator_name: None,
            due_date: due,
            allow_late_submission: allow_late,
            max_file_size: 10,
            allowed_file_types: serde_json::json!([]),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_due_instant_is_still_accepted() {
        let due = Utc::now();
        let hw = assignment(due, false);
        assert!(hw.accepts_submission_at(due));
        assert!(!hw.accepts_submission_at(due + Duration::seconds(1)));
    }

    #[test]
    fn test_deadline_compares_whole_seconds() {
        let due = Utc.with_ymd_and_hms(2030, 1, 1, 12, 0, 0).unwrap();
        let hw = assignment(due, false);
        assert!(hw.accepts_submission_at(due + Duration::milliseconds(500)));
        assert!(hw.accepts_submission_at(due + Duration::milliseconds(999)));
        assert!(!hw.accepts_submission_at(due + Duration::milliseconds(1000)));
    }

    #[test]
    fn test_late_allowed_accepts_after_due() {
        let due = Utc::now() - Duration::days(3);
        let hw = assignment(due, true);
        assert!(hw.is_past_due(Utc::now()));
        assert!(hw.accepts_submission_at(Utc::now()));
    }
}
