//! 附件实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "attachments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub submission_id: i64,
    pub file_name: String,
    /// 上传目录下的存储文件名
    pub file_path: String,
    pub file_size: i64,
    pub file_type: String,
    pub uploaded_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::submissions::Entity",
        from = "Column::SubmissionId",
        to = "super::submissions::Column::Id"
    )]
    Submission,
}

impl Related<super::submissions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Submission.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_attachment(self) -> crate::models::submissions::entities::Attachment {
        crate::models::submissions::entities::Attachment {
            id: self.id,
            submission_id: self.submission_id,
            file_name: self.file_name,
            file_path: self.file_path,
            file_size: self.file_size,
            file_type: self.file_type,
            uploaded_at: super::to_datetime(self.uploaded_at),
        }
    }
}
