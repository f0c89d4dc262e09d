//! HTTP 应用装配：注入存储与启动时间，注册参数错误处理器并挂载全部 API 路由。
//! 正式服务与集成测试共用同一套装配。

use std::sync::Arc;
use std::time::Duration;

use actix_cors::Cors;
use actix_web::middleware::DefaultHeaders;
use actix_web::web;

use crate::config::AppConfig;
use crate::models::AppStartTime;
use crate::routes;
use crate::storage::Storage;
use crate::utils::{json_error_handler, query_error_handler};

/// 返回可传给 `App::configure` 的装配函数
pub fn mount_api(
    storage: Arc<dyn Storage>,
    started: AppStartTime,
) -> impl Fn(&mut web::ServiceConfig) + Clone + Send + 'static {
    move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(web::Data::new(storage.clone()))
            .app_data(web::Data::new(started.clone()))
            .app_data(web::QueryConfig::default().error_handler(query_error_handler))
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(web::PayloadConfig::new(
                AppConfig::get().server.limits.max_payload_size,
            ));
        routes::configure_routes(cfg);
    }
}

pub fn cors(config: &AppConfig) -> Cors {
    Cors::default()
        .allow_any_origin()
        .allow_any_method()
        .allow_any_header()
        .expose_headers(["Content-Disposition", "Retry-After"])
        .max_age(config.cors.max_age)
}

// API 响应一律不缓存；附件下载另行设置 Content-Disposition
pub fn default_headers(config: &AppConfig) -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("Connection", "keep-alive"))
        .add((
            "Keep-Alive",
            format!("timeout={}, max=1000", config.server.timeouts.keep_alive),
        ))
        .add(("Cache-Control", "no-cache, no-store, must-revalidate"))
}

pub fn keep_alive(config: &AppConfig) -> Duration {
    Duration::from_secs(config.server.timeouts.keep_alive)
}
