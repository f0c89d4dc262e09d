use super::SeaOrmStorage;
use crate::entity::assignments::{ActiveModel, Column, Entity as Assignments};
use crate::entity::prelude::{Attachments, Feedback, Submissions, Users};
use crate::entity::{attachments, feedback, submissions};
use crate::errors::{HWSystemError, Result};
use crate::models::{
    Page,
    assignments::{
        entities::Assignment,
        requests::{AssignmentChanges, NewAssignment},
        responses::AssignmentListResponse,
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};

impl SeaOrmStorage {
    /// 创建作业
    pub async fn create_assignment_impl(&self, req: NewAssignment) -> Result<Assignment> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            title: Set(req.title),
            description: Set(req.description),
            created_by: Set(req.created_by),
            due_date: Set(req.due_date.timestamp()),
            allow_late_submission: Set(req.allow_late_submission),
            max_file_size: Set(req.max_file_size),
            allowed_file_types: Set(serde_json::to_string(&req.allowed_file_types)?),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model.insert(&self.db).await.map_err(|e| {
            HWSystemError::database_operation(format!("Failed to create assignment: {e}"))
        })?;

        // 补全创建者姓名
        self.get_assignment_by_id_impl(result.id)
            .await?
            .ok_or_else(|| HWSystemError::database_operation("Created assignment disappeared"))
    }

    /// 通过 ID 获取作业（含创建者姓名）
    pub async fn get_assignment_by_id_impl(&self, id: i64) -> Result<Option<Assignment>> {
        let result = Assignments::find_by_id(id)
            .find_also_related(Users)
            .one(&self.db)
            .await
            .map_err(|e| {
                HWSystemError::database_operation(format!("Failed to query assignment: {e}"))
            })?;

        Ok(result.map(|(assignment, creator)| {
            assignment.into_assignment(creator.map(|u| u.full_name()))
        }))
    }

    /// 分页列出作业，按截止时间倒序
    pub async fn list_assignments_with_pagination_impl(
        &self,
        page: Page,
    ) -> Result<AssignmentListResponse> {
        let paginator = Assignments::find()
            .find_also_related(Users)
            .order_by_desc(Column::DueDate)
            .order_by_desc(Column::Id)
            .paginate(&self.db, page.limit as u64);

        let total = paginator.num_items().await.map_err(|e| {
            HWSystemError::database_operation(format!("Failed to count assignments: {e}"))
        })?;

        let rows = paginator
            .fetch_page(page.index())
            .await
            .map_err(|e| {
                HWSystemError::database_operation(format!("Failed to list assignments: {e}"))
            })?;

        Ok(AssignmentListResponse {
            assignments: rows
                .into_iter()
                .map(|(assignment, creator)| {
                    assignment.into_assignment(creator.map(|u| u.full_name()))
                })
                .collect(),
            pagination: page.info(total),
        })
    }

    /// 部分更新作业，未提供的字段保持原值
    pub async fn update_assignment_impl(
        &self,
        id: i64,
        changes: AssignmentChanges,
    ) -> Result<Option<Assignment>> {
        if Assignments::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| {
                HWSystemError::database_operation(format!("Failed to query assignment: {e}"))
            })?
            .is_none()
        {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(title) = changes.title {
            model.title = Set(title);
        }

        if let Some(description) = changes.description {
            model.description = Set(Some(description));
        }

        if let Some(due_date) = changes.due_date {
            model.due_date = Set(due_date.timestamp());
        }

        if let Some(allow_late) = changes.allow_late_submission {
            model.allow_late_submission = Set(allow_late);
        }

        if let Some(max_file_size) = changes.max_file_size {
            model.max_file_size = Set(max_file_size);
        }

        if let Some(types) = changes.allowed_file_types {
            model.allowed_file_types = Set(serde_json::to_string(&types)?);
        }

        model.update(&self.db).await.map_err(|e| {
            HWSystemError::database_operation(format!("Failed to update assignment: {e}"))
        })?;

        self.get_assignment_by_id_impl(id).await
    }

    /// 删除作业，并在同一事务中删除其提交、附件和反馈
    pub async fn delete_assignment_impl(&self, id: i64) -> Result<Option<Vec<String>>> {
        let txn = self.db.begin().await?;

        if Assignments::find_by_id(id).one(&txn).await?.is_none() {
            return Ok(None);
        }

        let submission_ids: Vec<i64> = Submissions::find()
            .select_only()
            .column(submissions::Column::Id)
            .filter(submissions::Column::AssignmentId.eq(id))
            .into_tuple()
            .all(&txn)
            .await?;

        let mut stored_files = Vec::new();
        if !submission_ids.is_empty() {
            stored_files = Attachments::find()
                .filter(attachments::Column::SubmissionId.is_in(submission_ids.clone()))
                .all(&txn)
                .await?
                .into_iter()
                .map(|a| a.file_path)
                .collect();

            Feedback::delete_many()
                .filter(feedback::Column::SubmissionId.is_in(submission_ids.clone()))
                .exec(&txn)
                .await?;

            Attachments::delete_many()
                .filter(attachments::Column::SubmissionId.is_in(submission_ids))
                .exec(&txn)
                .await?;

            Submissions::delete_many()
                .filter(submissions::Column::AssignmentId.eq(id))
                .exec(&txn)
                .await?;
        }

        Assignments::delete_by_id(id).exec(&txn).await?;

        txn.commit().await.map_err(|e| {
            HWSystemError::database_operation(format!("Failed to delete assignment: {e}"))
        })?;

        Ok(Some(stored_files))
    }
}
