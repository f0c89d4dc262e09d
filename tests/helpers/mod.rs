#![allow(dead_code)]

use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{StatusCode, header};
use actix_web::test;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::{Arc, Once, OnceLock};

use rust_homework_review::models::assignments::{entities::Assignment, requests::NewAssignment};
use rust_homework_review::models::users::{
    entities::{Language, User, UserRole},
    requests::CreateUserRequest,
};
use rust_homework_review::storage::{Storage, sea_orm_storage::SeaOrmStorage};
use rust_homework_review::utils::{jwt::JwtUtils, password::hash_password};

pub const TEST_PASSWORD: &str = "password123";
pub const BOUNDARY: &str = "----homework-review-test-boundary";

static INIT: Once = Once::new();
static UPLOAD_DIR: OnceLock<tempfile::TempDir> = OnceLock::new();

// 在第一次读取配置之前设置环境变量
pub fn init_test_env() {
    INIT.call_once(|| {
        let dir = tempfile::tempdir().expect("Failed to create upload dir");
        // SAFETY: 只在 Once 中、任何配置读取之前执行一次
        unsafe {
            std::env::set_var("UPLOAD_DIR", dir.path());
            std::env::set_var("RATE_LIMIT_ENABLED", "false");
        }
        let _ = UPLOAD_DIR.set(dir);
    });
}

pub fn upload_dir() -> &'static std::path::Path {
    UPLOAD_DIR.get().expect("test env not initialised").path()
}

pub async fn setup_storage() -> Arc<dyn Storage> {
    init_test_env();
    let storage = SeaOrmStorage::new_in_memory()
        .await
        .expect("Failed to create in-memory storage");
    Arc::new(storage)
}

/// 基于文件的 SQLite 存储，连接池有多个连接，用于并发测试
pub async fn setup_file_storage(dir: &std::path::Path) -> Arc<dyn Storage> {
    init_test_env();
    let url = format!("sqlite://{}?mode=rwc", dir.join("review.db").display());
    let storage = SeaOrmStorage::connect(&url)
        .await
        .expect("Failed to create file storage");
    Arc::new(storage)
}

/// 构建与正式服务相同装配的测试应用
macro_rules! test_app {
    ($storage:expr) => {
        actix_web::test::init_service(actix_web::App::new().configure(
            rust_homework_review::runtime::server::mount_api(
                $storage.clone(),
                rust_homework_review::models::AppStartTime {
                    start_datetime: chrono::Utc::now(),
                },
            ),
        ))
        .await
    };
}

pub(crate) use test_app;

pub struct TestUser {
    pub user: User,
    pub token: String,
}

impl TestUser {
    pub fn id(&self) -> i64 {
        self.user.id
    }

    pub fn bearer(&self) -> (header::HeaderName, String) {
        bearer(&self.token)
    }
}

pub fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {token}"))
}

pub async fn create_user(storage: &Arc<dyn Storage>, email: &str, role: UserRole) -> TestUser {
    let user = storage
        .create_user(CreateUserRequest {
            email: email.to_string(),
            password: hash_password(TEST_PASSWORD).expect("hash"),
            first_name: "Test".to_string(),
            last_name: role.to_string(),
            role,
            language: Language::En,
        })
        .await
        .expect("Failed to create user");
    let token = JwtUtils::generate_access_token(user.id, user.role.as_str()).expect("token");
    TestUser { user, token }
}

pub async fn create_assignment(
    storage: &Arc<dyn Storage>,
    creator: &TestUser,
    title: &str,
    due_date: DateTime<Utc>,
    allow_late_submission: bool,
) -> Assignment {
    storage
        .create_assignment(NewAssignment {
            title: title.to_string(),
            description: None,
            created_by: creator.id(),
            due_date,
            allow_late_submission,
            max_file_size: 10,
            allowed_file_types: serde_json::json!([]),
        })
        .await
        .expect("Failed to create assignment")
}

/// 发送请求，返回状态码与 JSON 响应体（空响应体为 Null）
pub async fn send<S, R, B>(app: &S, req: R) -> (StatusCode, Value)
where
    S: Service<R, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let bytes = test::read_body(resp).await;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

/// 构造 multipart/form-data 请求体，files 为 (文件名, 媒体类型, 内容)
pub fn multipart_body(fields: &[(&str, &str)], files: &[(&str, &str, &[u8])]) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    for (file_name, content_type, content) in files {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"files\"; filename=\"{file_name}\"\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}
