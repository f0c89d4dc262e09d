use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 20;
pub const MAX_LIMIT: i64 = 100;

// 分页查询参数
#[derive(Debug, Clone, Deserialize)]
pub struct PaginationQuery {
    #[serde(
        default = "default_page",
        deserialize_with = "deserialize_string_to_i64"
    )]
    pub page: i64,
    #[serde(
        default = "default_limit",
        deserialize_with = "deserialize_string_to_i64"
    )]
    pub limit: i64,
}

impl PaginationQuery {
    /// 规范化分页参数：page 小于 1 时按 1 处理，limit 非法时回退到默认值并限制上限。
    /// page 的上限保证偏移量 `(page - 1) * limit` 不溢出 i64
    pub fn normalized(&self) -> Page {
        let limit = if self.limit < 1 {
            DEFAULT_LIMIT
        } else {
            self.limit.min(MAX_LIMIT)
        };
        let page = self.page.clamp(1, i64::MAX / limit);
        Page { page, limit }
    }
}

/// 规范化后的分页参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: i64,
    pub limit: i64,
}

impl Page {
    /// 从 0 开始的页序号，供 `Paginator::fetch_page` 使用
    pub fn index(&self) -> u64 {
        (self.page - 1) as u64
    }

    pub fn info(&self, total: u64) -> PaginationInfo {
        let total = total as i64;
        PaginationInfo {
            total,
            page: self.page,
            total_pages: (total + self.limit - 1) / self.limit,
        }
    }
}

// 分页响应信息，与列表字段平铺在同一层
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInfo {
    pub total: i64,
    pub page: i64,
    pub total_pages: i64,
}

// 自定义反序列化函数，支持字符串到i64的转换
fn deserialize_string_to_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{Error, Unexpected, Visitor};
    use std::fmt;

    struct I64Visitor;

    impl<'de> Visitor<'de> for I64Visitor {
        type Value = i64;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("an integer or a string containing an integer")
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: Error,
        {
            Ok(value)
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: Error,
        {
            if value <= i64::MAX as u64 {
                Ok(value as i64)
            } else {
                Err(Error::invalid_value(Unexpected::Unsigned(value), &self))
            }
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: Error,
        {
            value
                .parse()
                .map_err(|_| Error::invalid_value(Unexpected::Str(value), &self))
        }
    }

    deserializer.deserialize_any(I64Visitor)
}

fn default_page() -> i64 {
    DEFAULT_PAGE
}

fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

impl Default for PaginationQuery {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: i64, limit: i64) -> PaginationQuery {
        PaginationQuery { page, limit }
    }

    #[test]
    fn test_page_zero_is_clamped_to_first_page() {
        let page = query(0, 10).normalized();
        assert_eq!(page, Page { page: 1, limit: 10 });
        assert_eq!(page.index(), 0);
    }

    #[test]
    fn test_invalid_limit_falls_back_to_default() {
        assert_eq!(query(1, 0).normalized().limit, DEFAULT_LIMIT);
        assert_eq!(query(1, -5).normalized().limit, DEFAULT_LIMIT);
        assert_eq!(query(1, 1000).normalized().limit, MAX_LIMIT);
    }

    #[test]
    fn test_index_and_total_pages() {
        let page = query(3, 20).normalized();
        assert_eq!(page.index(), 2);

        let info = page.info(41);
        assert_eq!(info.total, 41);
        assert_eq!(info.page, 3);
        assert_eq!(info.total_pages, 3);

        assert_eq!(page.info(0).total_pages, 0);
        assert_eq!(page.info(40).total_pages, 2);
    }

    #[test]
    fn test_huge_page_keeps_offset_in_range() {
        for limit in [1, 20, MAX_LIMIT] {
            let page = query(i64::MAX, limit).normalized();
            assert_eq!(page.page, i64::MAX / limit);
            assert!(page.index().checked_mul(limit as u64).is_some());
            assert!((page.page - 1).checked_mul(limit).is_some());
        }
    }

    #[test]
    fn test_query_accepts_string_numbers() {
        let q: PaginationQuery = serde_json::from_str(r#"{"page":"2","limit":"5"}"#).unwrap();
        assert_eq!(q.page, 2);
        assert_eq!(q.limit, 5);

        let q: PaginationQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(q.page, DEFAULT_PAGE);
        assert_eq!(q.limit, DEFAULT_LIMIT);
    }
}
