use std::collections::HashMap;
use std::time::Duration;

use super::{SeaOrmStorage, is_write_conflict};
use crate::entity::attachments;
use crate::entity::prelude::{Assignments, Attachments, Users};
use crate::entity::submissions::{ActiveModel, Column, Entity as Submissions};
use crate::errors::{HWSystemError, Result};
use crate::models::{
    Page,
    submissions::{
        entities::{
            Attachment, OwnedAttachment, Submission, SubmissionStatus, SubmissionUpsert,
            UpsertOutcome, next_submitted_at,
        },
        responses::{MySubmission, SubmissionDetail, SubmissionListItem, SubmissionListResponse},
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::warn;

const MAX_UPSERT_ATTEMPTS: u32 = 8;

impl SeaOrmStorage {
    /// 按 (作业, 学生) 创建或更新提交
    ///
    /// 并发的首次提交会在唯一索引（或 SQLite 写锁）上冲突，失败的一方重试时读到已存在的记录并转为更新。
    pub async fn upsert_submission_impl(&self, upsert: SubmissionUpsert) -> Result<UpsertOutcome> {
        let mut attempt = 1;
        loop {
            match self.try_upsert_submission(&upsert).await {
                Ok(outcome) => return Ok(outcome),
                Err(e) if is_write_conflict(&e) && attempt < MAX_UPSERT_ATTEMPTS => {
                    warn!(
                        "Concurrent submission for assignment {} by student {} (attempt {}): {}",
                        upsert.assignment_id, upsert.student_id, attempt, e
                    );
                    tokio::time::sleep(Duration::from_millis(10 * attempt as u64)).await;
                    attempt += 1;
                }
                Err(e) => {
                    return Err(HWSystemError::database_operation(format!(
                        "Failed to save submission: {e}"
                    )));
                }
            }
        }
    }

    async fn try_upsert_submission(
        &self,
        upsert: &SubmissionUpsert,
    ) -> std::result::Result<UpsertOutcome, DbErr> {
        let txn = self.db.begin().await?;
        let now = chrono::Utc::now().timestamp();

        let existing = Submissions::find()
            .filter(Column::AssignmentId.eq(upsert.assignment_id))
            .filter(Column::StudentId.eq(upsert.student_id))
            .one(&txn)
            .await?;
        let created = existing.is_none();

        let model = match existing {
            Some(current) => {
                let current_status = current.status.parse::<SubmissionStatus>().ok();
                let status = SubmissionStatus::advance(current_status, upsert.status);
                let submitted_at = next_submitted_at(current.submitted_at, upsert.status, now);

                let mut active: ActiveModel = current.into();
                active.text_content = Set(upsert.text_content.clone());
                active.status = Set(status.to_string());
                active.submitted_at = Set(submitted_at);
                active.updated_at = Set(now);
                active.update(&txn).await?
            }
            None => {
                ActiveModel {
                    assignment_id: Set(upsert.assignment_id),
                    student_id: Set(upsert.student_id),
                    text_content: Set(upsert.text_content.clone()),
                    status: Set(upsert.status.to_string()),
                    submitted_at: Set(next_submitted_at(None, upsert.status, now)),
                    grade: Set(None),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                }
                .insert(&txn)
                .await?
            }
        };

        // 附件只追加，不删除已有附件
        for file in &upsert.attachments {
            attachments::ActiveModel {
                submission_id: Set(model.id),
                file_name: Set(file.file_name.clone()),
                file_path: Set(file.file_path.clone()),
                file_size: Set(file.file_size),
                file_type: Set(file.file_type.clone()),
                uploaded_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }

        let attachments = Self::attachments_of(&txn, model.id).await?;
        txn.commit().await?;

        Ok(UpsertOutcome {
            submission: model.into_submission(),
            attachments,
            created,
        })
    }

    async fn attachments_of<C: ConnectionTrait>(
        conn: &C,
        submission_id: i64,
    ) -> std::result::Result<Vec<Attachment>, DbErr> {
        Ok(Attachments::find()
            .filter(attachments::Column::SubmissionId.eq(submission_id))
            .order_by_asc(attachments::Column::UploadedAt)
            .order_by_asc(attachments::Column::Id)
            .all(conn)
            .await?
            .into_iter()
            .map(|a| a.into_attachment())
            .collect())
    }

    /// 批量查询多个提交的附件
    async fn attachments_by_submission(
        &self,
        submission_ids: Vec<i64>,
    ) -> Result<HashMap<i64, Vec<Attachment>>> {
        let mut grouped: HashMap<i64, Vec<Attachment>> = HashMap::new();
        if submission_ids.is_empty() {
            return Ok(grouped);
        }

        let rows = Attachments::find()
            .filter(attachments::Column::SubmissionId.is_in(submission_ids))
            .order_by_asc(attachments::Column::UploadedAt)
            .order_by_asc(attachments::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| {
                HWSystemError::database_operation(format!("Failed to query attachments: {e}"))
            })?;

        for row in rows {
            grouped
                .entry(row.submission_id)
                .or_default()
                .push(row.into_attachment());
        }
        Ok(grouped)
    }

    /// 通过 ID 获取提交
    pub async fn get_submission_by_id_impl(&self, id: i64) -> Result<Option<Submission>> {
        let result = Submissions::find_by_id(id).one(&self.db).await.map_err(|e| {
            HWSystemError::database_operation(format!("Failed to query submission: {e}"))
        })?;

        Ok(result.map(|m| m.into_submission()))
    }

    /// 补全提交详情
    pub async fn load_submission_detail_impl(
        &self,
        submission: Submission,
    ) -> Result<SubmissionDetail> {
        let assignment_title = Assignments::find_by_id(submission.assignment_id)
            .one(&self.db)
            .await?
            .map(|a| a.title)
            .unwrap_or_default();

        let student_name = Users::find_by_id(submission.student_id)
            .one(&self.db)
            .await?
            .map(|u| u.full_name())
            .unwrap_or_default();

        let attachments = self.list_attachments_impl(submission.id).await?;
        let feedback = self.list_feedback_by_submission_impl(submission.id).await?;

        Ok(SubmissionDetail {
            submission,
            assignment_title,
            student_name,
            attachments,
            feedback,
        })
    }

    /// 列出提交的附件
    async fn list_attachments_impl(&self, submission_id: i64) -> Result<Vec<Attachment>> {
        Self::attachments_of(&self.db, submission_id)
            .await
            .map_err(|e| {
                HWSystemError::database_operation(format!("Failed to query attachments: {e}"))
            })
    }

    /// 通过 ID 获取附件及其所属学生
    pub async fn get_attachment_by_id_impl(&self, id: i64) -> Result<Option<OwnedAttachment>> {
        let result = Attachments::find_by_id(id)
            .find_also_related(Submissions)
            .one(&self.db)
            .await
            .map_err(|e| {
                HWSystemError::database_operation(format!("Failed to query attachment: {e}"))
            })?;

        Ok(result.and_then(|(attachment, submission)| {
            submission.map(|s| OwnedAttachment {
                attachment: attachment.into_attachment(),
                student_id: s.student_id,
            })
        }))
    }

    /// 列出学生自己的提交，按更新时间倒序
    pub async fn list_my_submissions_impl(
        &self,
        student_id: i64,
        assignment_id: Option<i64>,
    ) -> Result<Vec<MySubmission>> {
        let mut select = Submissions::find().filter(Column::StudentId.eq(student_id));

        if let Some(assignment_id) = assignment_id {
            select = select.filter(Column::AssignmentId.eq(assignment_id));
        }

        let rows = select
            .find_also_related(Assignments)
            .order_by_desc(Column::UpdatedAt)
            .order_by_desc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| {
                HWSystemError::database_operation(format!("Failed to list submissions: {e}"))
            })?;

        let mut attachments = self
            .attachments_by_submission(rows.iter().map(|(s, _)| s.id).collect())
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(submission, assignment)| {
                let assignment = assignment?;
                let files = attachments.remove(&submission.id).unwrap_or_default();
                Some(MySubmission {
                    submission: submission.into_submission(),
                    assignment_title: assignment.title,
                    due_date: crate::entity::to_datetime(assignment.due_date),
                    attachments: files,
                })
            })
            .collect())
    }

    /// 分页列出某作业的所有提交，按提交时间倒序
    pub async fn list_submissions_by_assignment_impl(
        &self,
        assignment_id: i64,
        page: Page,
    ) -> Result<SubmissionListResponse> {
        let paginator = Submissions::find()
            .filter(Column::AssignmentId.eq(assignment_id))
            .find_also_related(Users)
            .order_by_desc(Column::SubmittedAt)
            .order_by_desc(Column::Id)
            .paginate(&self.db, page.limit as u64);

        let total = paginator.num_items().await.map_err(|e| {
            HWSystemError::database_operation(format!("Failed to count submissions: {e}"))
        })?;

        let rows = paginator
            .fetch_page(page.index())
            .await
            .map_err(|e| {
                HWSystemError::database_operation(format!("Failed to list submissions: {e}"))
            })?;

        Ok(SubmissionListResponse {
            submissions: rows
                .into_iter()
                .map(|(submission, student)| SubmissionListItem {
                    submission: submission.into_submission(),
                    student_name: student.map(|u| u.full_name()).unwrap_or_default(),
                })
                .collect(),
            pagination: page.info(total),
        })
    }
}
