pub mod assignments;
pub mod auth;
pub mod feedback;
pub mod submissions;
pub mod system;
pub mod users;

pub use assignments::AssignmentService;
pub use auth::AuthService;
pub use feedback::FeedbackService;
pub use submissions::SubmissionService;
pub use system::SystemService;
pub use users::UserService;

use actix_web::HttpRequest;
use std::sync::Arc;

use crate::errors::{HWSystemError, Result};
use crate::storage::Storage;

// 从 app_data 中取出注入的存储实例
pub(crate) fn storage_from(request: &HttpRequest) -> Result<Arc<dyn Storage>> {
    request
        .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
        .map(|data| data.get_ref().clone())
        .ok_or_else(|| HWSystemError::database_connection("Storage not found in app data"))
}
