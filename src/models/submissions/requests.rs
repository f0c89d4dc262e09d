use serde::Deserialize;

use super::entities::NewAttachment;

// JSON 形式的提交请求（无附件）
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub assignment_id: Option<i64>,
    pub text_content: Option<String>,
    pub status: Option<String>,
}

// 解析后的提交表单（multipart 或 JSON）
#[derive(Debug, Default)]
pub struct SubmissionForm {
    pub assignment_id: Option<i64>,
    pub text_content: Option<String>,
    pub status: Option<String>,
    pub files: Vec<NewAttachment>,
}

impl From<SubmitRequest> for SubmissionForm {
    fn from(req: SubmitRequest) -> Self {
        Self {
            assignment_id: req.assignment_id,
            text_content: req.text_content,
            status: req.status,
            files: Vec::new(),
        }
    }
}

// 我的提交查询参数
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MySubmissionsQuery {
    pub assignment_id: Option<i64>,
}

// assignmentId 既可以是数字也可以是数字字符串
fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(i64),
        Text(String),
    }

    match Option::<RawId>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawId::Number(id)) => Ok(Some(id)),
        Some(RawId::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(RawId::Text(s)) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("Invalid assignment ID: {s}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assignment_id_accepts_number_or_string() {
        let req: SubmitRequest = serde_json::from_str(r#"{"assignmentId": 7}"#).unwrap();
        assert_eq!(req.assignment_id, Some(7));

        let req: SubmitRequest = serde_json::from_str(r#"{"assignmentId": "8"}"#).unwrap();
        assert_eq!(req.assignment_id, Some(8));

        let req: SubmitRequest = serde_json::from_str(r#"{"textContent": "x"}"#).unwrap();
        assert_eq!(req.assignment_id, None);

        assert!(serde_json::from_str::<SubmitRequest>(r#"{"assignmentId": "abc"}"#).is_err());
    }
}
