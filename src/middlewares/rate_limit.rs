/*!
 * 登录、注册的速率限制中间件
 *
 * 按 (端点, 客户端 IP) 计数的固定窗口：窗口内超过上限返回 429，
 * `Retry-After` 为窗口剩余秒数。次数与窗口长度取自 `rate_limit` 配置，
 * `rate_limit.enabled = false` 时直接放行。
 *
 * ```rust,ignore
 * web::resource("/login")
 *     .wrap(RateLimit::login())
 *     .route(web::post().to(login))
 * ```
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::{StatusCode, header},
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use moka::future::Cache;
use once_cell::sync::Lazy;
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::warn;

use crate::config::AppConfig;

use super::create_error_response;

/// 每个键当前窗口的起点与已计次数
#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    hits: u32,
}

// 键: 端点:IP。条目最多存活一个窗口
static WINDOWS: Lazy<Cache<String, Window>> = Lazy::new(|| {
    Cache::builder()
        .time_to_live(Duration::from_secs(AppConfig::get().rate_limit.window_secs))
        .max_capacity(100_000)
        .build()
});

#[derive(Clone)]
pub struct RateLimit {
    endpoint: &'static str,
    max_hits: u32,
    window: Duration,
}

impl RateLimit {
    pub fn new(endpoint: &'static str, max_hits: u32, window: Duration) -> Self {
        Self {
            endpoint,
            max_hits,
            window,
        }
    }

    /// 登录：防止暴力猜测密码
    pub fn login() -> Self {
        let config = &AppConfig::get().rate_limit;
        Self::new(
            "login",
            config.login_max,
            Duration::from_secs(config.window_secs),
        )
    }

    /// 注册：防止批量注册
    pub fn register() -> Self {
        let config = &AppConfig::get().rate_limit;
        Self::new(
            "register",
            config.register_max,
            Duration::from_secs(config.window_secs),
        )
    }
}

/// 计入一次请求后的窗口：旧窗口已过期则从 `now` 重新开始
fn record_hit(current: Option<Window>, now: Instant, window: Duration) -> Window {
    match current {
        Some(w) if now.duration_since(w.started) < window => Window {
            started: w.started,
            hits: w.hits.saturating_add(1),
        },
        _ => Window {
            started: now,
            hits: 1,
        },
    }
}

/// 窗口剩余秒数，至少为 1
fn retry_after(w: &Window, now: Instant, window: Duration) -> u64 {
    window
        .saturating_sub(now.duration_since(w.started))
        .as_secs()
        .max(1)
}

fn client_key(endpoint: &str, req: &ServiceRequest) -> String {
    // realip_remote_addr 依次取 Forwarded / X-Forwarded-For / 对端地址
    let info = req.connection_info();
    let ip = info.realip_remote_addr().unwrap_or("unknown");
    format!("{endpoint}:{ip}")
}

fn too_many_requests(retry_after: u64) -> HttpResponse {
    let mut response = create_error_response(
        StatusCode::TOO_MANY_REQUESTS,
        "Too many requests, please try again later",
    );
    if let Ok(value) = header::HeaderValue::from_str(&retry_after.to_string()) {
        response.headers_mut().insert(header::RETRY_AFTER, value);
    }
    response
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service: Rc::new(service),
            limit: self.clone(),
        }))
    }
}

pub struct RateLimitMiddleware<S> {
    service: Rc<S>,
    limit: RateLimit,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let limit = self.limit.clone();

        Box::pin(async move {
            if !AppConfig::get().rate_limit.enabled {
                return Ok(srv.call(req).await?.map_into_left_body());
            }

            let key = client_key(limit.endpoint, &req);
            let now = Instant::now();
            // 原子地读取并更新计数，同一客户端的并发请求不会漏计
            let current = WINDOWS
                .entry(key.clone())
                .and_upsert_with(|existing| {
                    ready(record_hit(
                        existing.map(|e| e.into_value()),
                        now,
                        limit.window,
                    ))
                })
                .await
                .into_value();

            if current.hits > limit.max_hits {
                warn!(
                    "Rate limit exceeded for {} ({}/{})",
                    key, current.hits, limit.max_hits
                );
                let wait = retry_after(&current, now, limit.window);
                return Ok(req.into_response(too_many_requests(wait).map_into_right_body()));
            }

            Ok(srv.call(req).await?.map_into_left_body())
        })
    }
}
