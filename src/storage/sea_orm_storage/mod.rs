//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod assignments;
mod feedback;
mod submissions;
mod users;

use crate::config::AppConfig;
use crate::errors::{HWSystemError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 创建新的 SeaORM 存储实例
    pub async fn new_async() -> Result<Self> {
        Self::connect(&AppConfig::get().database.url).await
    }

    /// 连接指定数据库并运行迁移，连接池参数取自配置
    pub async fn connect(url: &str) -> Result<Self> {
        let config = AppConfig::get();
        let db_url = Self::build_database_url(url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite:") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        let storage = Self::from_connection(db).await?;
        info!("SeaORM storage initialized, database: {}", db_url);
        Ok(storage)
    }

    /// 基于已有连接创建存储实例并运行迁移
    pub async fn from_connection(db: DatabaseConnection) -> Result<Self> {
        Migrator::up(&db, None)
            .await
            .map_err(|e| HWSystemError::database_operation(format!("Migration failed: {e}")))?;
        Ok(Self { db })
    }

    /// 内存 SQLite 存储（单连接，保证所有查询看到同一个数据库）
    pub async fn new_in_memory() -> Result<Self> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| HWSystemError::database_config(format!("SQLite URL parse failed: {e}")))?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(opt)
            .await
            .map_err(|e| {
                HWSystemError::database_connection(format!("SQLite connection failed: {e}"))
            })?;

        Self::from_connection(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool)).await
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| HWSystemError::database_config(format!("SQLite URL parse failed: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.database.pool_size)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| {
                HWSystemError::database_connection(format!("SQLite connection failed: {e}"))
            })?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.database.pool_size)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(config.database.timeout))
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false);

        Database::connect(opt).await.map_err(|e| {
            HWSystemError::database_connection(format!("Unable to connect to database: {e}"))
        })
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite:") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") {
            Ok(format!("sqlite://{url}?mode=rwc"))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(HWSystemError::database_config(format!(
                "Cannot infer database type from URL: {url}. Supported: sqlite://, postgres://, mysql://, or a .db/.sqlite file path"
            )))
        }
    }
}

/// 插入是否因唯一约束失败
pub(crate) fn is_unique_violation(err: &sea_orm::DbErr) -> bool {
    matches!(
        err.sql_err(),
        Some(sea_orm::SqlErr::UniqueConstraintViolation(_))
    )
}

/// 并发写冲突：唯一约束冲突，或 SQLite 的 BUSY / LOCKED（含 WAL 下的 BUSY_SNAPSHOT）
pub(crate) fn is_write_conflict(err: &sea_orm::DbErr) -> bool {
    use sea_orm::{DbErr, RuntimeErr};

    if is_unique_violation(err) {
        return true;
    }
    let sqlx_err = match err {
        DbErr::Exec(RuntimeErr::SqlxError(e))
        | DbErr::Query(RuntimeErr::SqlxError(e))
        | DbErr::Conn(RuntimeErr::SqlxError(e)) => e,
        _ => return false,
    };
    // SQLite 扩展错误码的低 8 位是主错误码：5 = BUSY，6 = LOCKED
    sqlx_err
        .as_database_error()
        .and_then(|db_err| db_err.code())
        .and_then(|code| code.parse::<i32>().ok())
        .is_some_and(|code| matches!(code & 0xff, 5 | 6))
}

// Storage trait 实现
use crate::models::{
    Page,
    assignments::{
        entities::Assignment,
        requests::{AssignmentChanges, NewAssignment},
        responses::AssignmentListResponse,
    },
    feedback::entities::{Feedback, FeedbackEntry},
    submissions::{
        entities::{OwnedAttachment, Submission, SubmissionUpsert, UpsertOutcome},
        responses::{MySubmission, SubmissionDetail, SubmissionListResponse},
    },
    users::{
        entities::{User, UserRole},
        requests::{CreateUserRequest, UpdateProfile},
        responses::UserListResponse,
    },
};
use crate::storage::Storage;
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 用户模块
    async fn create_user(&self, user: CreateUserRequest) -> Result<User> {
        self.create_user_impl(user).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.get_user_by_email_impl(email).await
    }

    async fn list_users_with_pagination(
        &self,
        page: Page,
        role: Option<String>,
    ) -> Result<UserListResponse> {
        self.list_users_with_pagination_impl(page, role).await
    }

    async fn update_user_role(&self, id: i64, role: UserRole) -> Result<Option<User>> {
        self.update_user_role_impl(id, role).await
    }

    async fn update_user_profile(&self, id: i64, update: UpdateProfile) -> Result<Option<User>> {
        self.update_user_profile_impl(id, update).await
    }

    async fn count_users(&self) -> Result<u64> {
        self.count_users_impl().await
    }

    // 作业模块
    async fn create_assignment(&self, assignment: NewAssignment) -> Result<Assignment> {
        self.create_assignment_impl(assignment).await
    }

    async fn get_assignment_by_id(&self, id: i64) -> Result<Option<Assignment>> {
        self.get_assignment_by_id_impl(id).await
    }

    async fn list_assignments_with_pagination(
        &self,
        page: Page,
    ) -> Result<AssignmentListResponse> {
        self.list_assignments_with_pagination_impl(page).await
    }

    async fn update_assignment(
        &self,
        id: i64,
        changes: AssignmentChanges,
    ) -> Result<Option<Assignment>> {
        self.update_assignment_impl(id, changes).await
    }

    async fn delete_assignment(&self, id: i64) -> Result<Option<Vec<String>>> {
        self.delete_assignment_impl(id).await
    }

    // 提交模块
    async fn upsert_submission(&self, upsert: SubmissionUpsert) -> Result<UpsertOutcome> {
        self.upsert_submission_impl(upsert).await
    }

    async fn get_submission_by_id(&self, id: i64) -> Result<Option<Submission>> {
        self.get_submission_by_id_impl(id).await
    }

    async fn load_submission_detail(&self, submission: Submission) -> Result<SubmissionDetail> {
        self.load_submission_detail_impl(submission).await
    }

    async fn get_attachment_by_id(&self, id: i64) -> Result<Option<OwnedAttachment>> {
        self.get_attachment_by_id_impl(id).await
    }

    async fn list_my_submissions(
        &self,
        student_id: i64,
        assignment_id: Option<i64>,
    ) -> Result<Vec<MySubmission>> {
        self.list_my_submissions_impl(student_id, assignment_id)
            .await
    }

    async fn list_submissions_by_assignment(
        &self,
        assignment_id: i64,
        page: Page,
    ) -> Result<SubmissionListResponse> {
        self.list_submissions_by_assignment_impl(assignment_id, page)
            .await
    }

    // 批改反馈模块
    async fn record_feedback(
        &self,
        submission_id: i64,
        reviewer_id: i64,
        content: String,
        grade: Option<f64>,
    ) -> Result<Feedback> {
        self.record_feedback_impl(submission_id, reviewer_id, content, grade)
            .await
    }

    async fn get_feedback_by_id(&self, id: i64) -> Result<Option<Feedback>> {
        self.get_feedback_by_id_impl(id).await
    }

    async fn revise_feedback(
        &self,
        id: i64,
        content: Option<String>,
        grade: Option<f64>,
    ) -> Result<Option<Feedback>> {
        self.revise_feedback_impl(id, content, grade).await
    }

    async fn list_feedback_by_submission(&self, submission_id: i64) -> Result<Vec<FeedbackEntry>> {
        self.list_feedback_by_submission_impl(submission_id).await
    }
}
