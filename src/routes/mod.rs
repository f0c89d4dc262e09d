pub mod assignments;
pub mod auth;
pub mod feedback;
pub mod submissions;
pub mod system;
pub mod users;

pub use assignments::configure_assignment_routes;
pub use auth::configure_auth_routes;
pub use feedback::configure_feedback_routes;
pub use submissions::configure_submission_routes;
pub use system::configure_system_routes;
pub use users::configure_user_routes;

use actix_web::web;

// 注册全部路由
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(configure_auth_routes)
        .configure(configure_user_routes)
        .configure(configure_assignment_routes)
        .configure(configure_submission_routes)
        .configure(configure_feedback_routes)
        .configure(configure_system_routes);
}
