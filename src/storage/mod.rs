use std::sync::Arc;

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

use crate::errors::Result;

pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户管理方法
    // 创建用户
    async fn create_user(&self, user: CreateUserRequest) -> Result<User>;
    // 通过ID获取用户信息
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    // 通过邮箱获取用户信息
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    // 列出用户，role 为精确匹配
    async fn list_users_with_pagination(
        &self,
        page: Page,
        role: Option<String>,
    ) -> Result<UserListResponse>;
    // 修改用户角色
    async fn update_user_role(&self, id: i64, role: UserRole) -> Result<Option<User>>;
    // 修改个人资料
    async fn update_user_profile(&self, id: i64, update: UpdateProfile) -> Result<Option<User>>;
    // 统计用户数量
    async fn count_users(&self) -> Result<u64>;

    /// 作业管理方法
    async fn create_assignment(&self, assignment: NewAssignment) -> Result<Assignment>;
    async fn get_assignment_by_id(&self, id: i64) -> Result<Option<Assignment>>;
    async fn list_assignments_with_pagination(&self, page: Page)
    -> Result<AssignmentListResponse>;
    async fn update_assignment(
        &self,
        id: i64,
        changes: AssignmentChanges,
    ) -> Result<Option<Assignment>>;
    // 删除作业及其提交、附件和反馈，返回被删除附件的存储文件名
    async fn delete_assignment(&self, id: i64) -> Result<Option<Vec<String>>>;

    /// 提交管理方法
    // 按 (作业, 学生) 创建或更新提交，并追加附件
    async fn upsert_submission(&self, upsert: SubmissionUpsert) -> Result<UpsertOutcome>;
    async fn get_submission_by_id(&self, id: i64) -> Result<Option<Submission>>;
    // 补全提交详情（作业标题、学生姓名、附件、反馈）
    async fn load_submission_detail(&self, submission: Submission) -> Result<SubmissionDetail>;
    async fn get_attachment_by_id(&self, id: i64) -> Result<Option<OwnedAttachment>>;
    async fn list_my_submissions(
        &self,
        student_id: i64,
        assignment_id: Option<i64>,
    ) -> Result<Vec<MySubmission>>;
    async fn list_submissions_by_assignment(
        &self,
        assignment_id: i64,
        page: Page,
    ) -> Result<SubmissionListResponse>;

    /// 批改反馈方法
    // 写入反馈；提供分数时在同一事务内更新提交的分数和状态
    async fn record_feedback(
        &self,
        submission_id: i64,
        reviewer_id: i64,
        content: String,
        grade: Option<f64>,
    ) -> Result<Feedback>;
    async fn get_feedback_by_id(&self, id: i64) -> Result<Option<Feedback>>;
    // 修改反馈；提供分数时同样覆盖提交的分数和状态
    async fn revise_feedback(
        &self,
        id: i64,
        content: Option<String>,
        grade: Option<f64>,
    ) -> Result<Option<Feedback>>;
    async fn list_feedback_by_submission(&self, submission_id: i64) -> Result<Vec<FeedbackEntry>>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
