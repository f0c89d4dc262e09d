pub mod assignments;
pub mod auth;
pub mod common;
pub mod feedback;
pub mod submissions;
pub mod users;

pub use common::*;

/// 程序启动时间，用于健康检查中的 uptime
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}
