use super::SeaOrmStorage;
use crate::entity::feedback::{ActiveModel, Column, Entity as Feedback};
use crate::entity::prelude::{Submissions, Users};
use crate::entity::submissions;
use crate::errors::{HWSystemError, Result};
use crate::models::{
    feedback::entities::{Feedback as FeedbackModel, FeedbackEntry},
    submissions::entities::SubmissionStatus,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set, TransactionTrait, sea_query::Expr,
};

impl SeaOrmStorage {
    /// 写入分数并将提交标记为已批改，返回受影响的行数
    async fn apply_grade<C: ConnectionTrait>(
        conn: &C,
        submission_id: i64,
        grade: f64,
        now: i64,
    ) -> std::result::Result<u64, DbErr> {
        let result = Submissions::update_many()
            .col_expr(submissions::Column::Grade, Expr::value(grade))
            .col_expr(
                submissions::Column::Status,
                Expr::value(SubmissionStatus::GRADED),
            )
            .col_expr(submissions::Column::UpdatedAt, Expr::value(now))
            .filter(submissions::Column::Id.eq(submission_id))
            .exec(conn)
            .await?;

        Ok(result.rows_affected)
    }

    /// 创建反馈；给出分数时在同一事务中更新提交
    pub async fn record_feedback_impl(
        &self,
        submission_id: i64,
        reviewer_id: i64,
        content: String,
        grade: Option<f64>,
    ) -> Result<FeedbackModel> {
        let txn = self.db.begin().await?;
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            submission_id: Set(submission_id),
            reviewer_id: Set(reviewer_id),
            content: Set(content),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| HWSystemError::database_operation(format!("Failed to create feedback: {e}")))?;

        if let Some(grade) = grade
            && Self::apply_grade(&txn, submission_id, grade, now).await? == 0
        {
            return Err(HWSystemError::not_found("Submission not found"));
        }

        txn.commit().await.map_err(|e| {
            HWSystemError::database_operation(format!("Failed to create feedback: {e}"))
        })?;

        Ok(model.into_feedback())
    }

    /// 通过 ID 获取反馈
    pub async fn get_feedback_by_id_impl(&self, id: i64) -> Result<Option<FeedbackModel>> {
        let result = Feedback::find_by_id(id).one(&self.db).await.map_err(|e| {
            HWSystemError::database_operation(format!("Failed to query feedback: {e}"))
        })?;

        Ok(result.map(|m| m.into_feedback()))
    }

    /// 修改反馈内容和/或分数
    pub async fn revise_feedback_impl(
        &self,
        id: i64,
        content: Option<String>,
        grade: Option<f64>,
    ) -> Result<Option<FeedbackModel>> {
        let txn = self.db.begin().await?;
        let now = chrono::Utc::now().timestamp();

        let Some(existing) = Feedback::find_by_id(id).one(&txn).await? else {
            return Ok(None);
        };
        let submission_id = existing.submission_id;

        let mut model: ActiveModel = existing.into();
        if let Some(content) = content {
            model.content = Set(content);
        }
        model.updated_at = Set(now);

        let updated = model.update(&txn).await.map_err(|e| {
            HWSystemError::database_operation(format!("Failed to update feedback: {e}"))
        })?;

        if let Some(grade) = grade {
            Self::apply_grade(&txn, submission_id, grade, now).await?;
        }

        txn.commit().await.map_err(|e| {
            HWSystemError::database_operation(format!("Failed to update feedback: {e}"))
        })?;

        Ok(Some(updated.into_feedback()))
    }

    /// 列出提交的所有反馈，按创建时间正序
    pub async fn list_feedback_by_submission_impl(
        &self,
        submission_id: i64,
    ) -> Result<Vec<FeedbackEntry>> {
        let grade = Submissions::find_by_id(submission_id)
            .one(&self.db)
            .await?
            .and_then(|s| s.grade);

        let rows = Feedback::find()
            .filter(Column::SubmissionId.eq(submission_id))
            .find_also_related(Users)
            .order_by_asc(Column::CreatedAt)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| {
                HWSystemError::database_operation(format!("Failed to list feedback: {e}"))
            })?;

        Ok(rows
            .into_iter()
            .map(|(feedback, reviewer)| FeedbackEntry {
                feedback: feedback.into_feedback(),
                reviewer_name: reviewer.map(|u| u.full_name()).unwrap_or_default(),
                grade,
            })
            .collect())
    }
}
