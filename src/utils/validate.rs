use chrono::{DateTime, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid email regex"));

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MIN_GRADE: f64 = 0.0;
pub const MAX_GRADE: f64 = 100.0;

pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if !EMAIL_RE.is_match(email) {
        return Err("Invalid email format");
    }
    Ok(())
}

/// 密码只校验长度
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err("Password must be at least 8 characters");
    }
    Ok(())
}

/// 分数必须在 [0, 100] 闭区间内
pub fn validate_grade(grade: f64) -> Result<(), &'static str> {
    if !grade.is_finite() || !(MIN_GRADE..=MAX_GRADE).contains(&grade) {
        return Err("Grade must be between 0 and 100");
    }
    Ok(())
}

/// 解析截止时间：RFC 3339，或不带时区的 `YYYY-MM-DDTHH:MM[:SS]`（按 UTC 处理）
pub fn parse_datetime(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Ok(naive.and_utc());
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M").map(|naive| naive.and_utc())
}
