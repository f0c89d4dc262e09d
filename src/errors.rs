//! 统一错误处理模块
//!
//! 使用宏自动生成错误类型，支持错误代码和类型名称。
//! 每个变体同时决定 HTTP 状态码，响应体统一为 `{"error": "..."}`。

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use std::fmt;

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() 方法 - 返回错误代码
/// - error_type() 方法 - 返回错误类型名称
/// - message() 方法 - 返回错误详情
/// - 便捷构造函数
macro_rules! define_hwsystem_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone)]
        pub enum HWSystemError {
            $($variant(String),)*
        }

        impl HWSystemError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(HWSystemError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(HWSystemError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(HWSystemError::$variant(msg) => msg,)*
                }
            }
        }

        // 生成便捷构造函数
        paste::paste! {
            impl HWSystemError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        HWSystemError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_hwsystem_errors! {
    DatabaseConfig("E001", "Database Configuration Error"),
    DatabaseConnection("E002", "Database Connection Error"),
    DatabaseOperation("E003", "Database Operation Error"),
    FileOperation("E004", "File Operation Error"),
    Validation("E005", "Validation Error"),
    Deadline("E006", "Deadline Exceeded"),
    NotFound("E007", "Resource Not Found"),
    Conflict("E008", "Conflict"),
    Serialization("E009", "Serialization Error"),
    DateParse("E010", "Date Parse Error"),
    Authentication("E011", "Authentication Error"),
    Authorization("E012", "Authorization Error"),
}

impl HWSystemError {
    /// 格式化为彩色输出（用于开发环境）
    #[cfg(debug_assertions)]
    pub fn format_colored(&self) -> String {
        format!(
            "\x1b[1;31m[ERROR]\x1b[0m \x1b[33m{}\x1b[0m \x1b[31m{}\x1b[0m\n  {}",
            self.code(),
            self.error_type(),
            self.message()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }

    /// 是否为服务端内部错误（详情只写日志，不返回给调用方）
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            HWSystemError::DatabaseConfig(_)
                | HWSystemError::DatabaseConnection(_)
                | HWSystemError::DatabaseOperation(_)
                | HWSystemError::FileOperation(_)
                | HWSystemError::Serialization(_)
        )
    }

    /// 面向调用方的错误信息
    pub fn public_message(&self) -> &str {
        if self.is_internal() {
            "Internal server error"
        } else {
            self.message()
        }
    }
}

impl fmt::Display for HWSystemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for HWSystemError {}

impl ResponseError for HWSystemError {
    fn status_code(&self) -> StatusCode {
        match self {
            HWSystemError::Authentication(_) => StatusCode::UNAUTHORIZED,
            HWSystemError::Authorization(_) => StatusCode::FORBIDDEN,
            HWSystemError::NotFound(_) => StatusCode::NOT_FOUND,
            HWSystemError::Validation(_)
            | HWSystemError::Deadline(_)
            | HWSystemError::DateParse(_) => StatusCode::BAD_REQUEST,
            HWSystemError::Conflict(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.is_internal() {
            tracing::error!("[{}] {}", self.code(), self.format_simple());
        }
        HttpResponse::build(self.status_code())
            .json(serde_json::json!({ "error": self.public_message() }))
    }
}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for HWSystemError {
    fn from(err: sea_orm::DbErr) -> Self {
        HWSystemError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for HWSystemError {
    fn from(err: std::io::Error) -> Self {
        HWSystemError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for HWSystemError {
    fn from(err: serde_json::Error) -> Self {
        HWSystemError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for HWSystemError {
    fn from(err: chrono::ParseError) -> Self {
        HWSystemError::DateParse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, HWSystemError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(HWSystemError::database_config("test").code(), "E001");
        assert_eq!(HWSystemError::validation("test").code(), "E005");
        assert_eq!(HWSystemError::deadline("test").code(), "E006");
        assert_eq!(HWSystemError::authentication("test").code(), "E011");
    }

    #[test]
    fn test_error_types() {
        assert_eq!(
            HWSystemError::not_found("test").error_type(),
            "Resource Not Found"
        );
        assert_eq!(
            HWSystemError::validation("test").error_type(),
            "Validation Error"
        );
    }

    #[test]
    fn test_format_simple() {
        let err = HWSystemError::validation("Title and due date are required");
        let formatted = err.format_simple();
        assert!(formatted.contains("Validation Error"));
        assert!(formatted.contains("Title and due date are required"));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            HWSystemError::authentication("x").status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            HWSystemError::authorization("x").status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            HWSystemError::not_found("x").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            HWSystemError::deadline("x").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            HWSystemError::conflict("x").status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            HWSystemError::database_operation("x").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_errors_are_opaque() {
        let err = HWSystemError::database_operation("UNIQUE constraint failed: users.email");
        assert_eq!(err.public_message(), "Internal server error");

        let err = HWSystemError::validation("Invalid role");
        assert_eq!(err.public_message(), "Invalid role");
    }
}
