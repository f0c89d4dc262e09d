//! 路径参数提取器
//!
//! 在访问存储之前拒绝格式错误的 ID，统一返回 400 `{"error": ...}`。

use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::{Ready, ready};

use crate::errors::HWSystemError;

/// 路径中的 `{id}`，必须是正整数
#[derive(Debug, Clone, Copy)]
pub struct SafeIDI64(pub i64);

impl SafeIDI64 {
    fn parse(raw: &str) -> Result<Self, HWSystemError> {
        raw.parse::<i64>()
            .ok()
            .filter(|id| *id > 0)
            .map(SafeIDI64)
            .ok_or_else(|| HWSystemError::validation(format!("Invalid id: {raw}")))
    }
}

impl FromRequest for SafeIDI64 {
    type Error = HWSystemError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(match req.match_info().get("id") {
            Some(raw) => Self::parse(raw),
            None => Err(HWSystemError::validation("Missing id in path")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rejects_malformed_ids() {
        assert_eq!(SafeIDI64::parse("17").unwrap().0, 17);
        assert!(SafeIDI64::parse("abc").is_err());
        assert!(SafeIDI64::parse("0").is_err());
        assert!(SafeIDI64::parse("-3").is_err());
        assert!(SafeIDI64::parse("1.5").is_err());
    }
}
