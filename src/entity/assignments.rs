//! 作业实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "assignments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub created_by: i64,
    pub due_date: i64,
    pub allow_late_submission: bool,
    pub max_file_size: i64,
    /// JSON 数组文本
    #[sea_orm(column_type = "Text")]
    pub allowed_file_types: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::CreatedBy",
        to = "super::users::Column::Id"
    )]
    Creator,
    #[sea_orm(has_many = "super::submissions::Entity")]
    Submissions,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Creator.def()
    }
}

impl Related<super::submissions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Submissions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_assignment(
        self,
        creator_name: Option<String>,
    ) -> crate::models::assignments::entities::Assignment {
        use crate::models::assignments::entities::Assignment;

        Assignment {
            id: self.id,
            title: self.title,
            description: self.description,
            created_by: self.created_by,
            creator_name,
            due_date: super::to_datetime(self.due_date),
            allow_late_submission: self.allow_late_submission,
            max_file_size: self.max_file_size,
            allowed_file_types: serde_json::from_str(&self.allowed_file_types)
                .unwrap_or_else(|_| serde_json::Value::Array(Vec::new())),
            created_at: super::to_datetime(self.created_at),
            updated_at: super::to_datetime(self.updated_at),
        }
    }
}
