use super::{SeaOrmStorage, is_unique_violation};
use crate::entity::users::{ActiveModel, Column, Entity as Users};
use crate::errors::{HWSystemError, Result};
use crate::models::{
    Page,
    users::{
        entities::{User, UserRole},
        requests::{CreateUserRequest, UpdateProfile},
        responses::UserListResponse,
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

impl SeaOrmStorage {
    /// 创建用户
    pub async fn create_user_impl(&self, req: CreateUserRequest) -> Result<User> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            email: Set(req.email),
            password_hash: Set(req.password),
            first_name: Set(req.first_name),
            last_name: Set(req.last_name),
            role: Set(req.role.to_string()),
            language: Set(req.language.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model.insert(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                HWSystemError::conflict("User already exists")
            } else {
                HWSystemError::database_operation(format!("Failed to create user: {e}"))
            }
        })?;

        Ok(result.into_user())
    }

    /// 通过 ID 获取用户
    pub async fn get_user_by_id_impl(&self, id: i64) -> Result<Option<User>> {
        let result = Users::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| HWSystemError::database_operation(format!("Failed to query user: {e}")))?;

        Ok(result.map(|m| m.into_user()))
    }

    /// 通过邮箱获取用户（大小写敏感）
    pub async fn get_user_by_email_impl(&self, email: &str) -> Result<Option<User>> {
        let result = Users::find()
            .filter(Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(|e| HWSystemError::database_operation(format!("Failed to query user: {e}")))?;

        Ok(result.map(|m| m.into_user()))
    }

    /// 分页列出用户
    pub async fn list_users_with_pagination_impl(
        &self,
        page: Page,
        role: Option<String>,
    ) -> Result<UserListResponse> {
        let mut select = Users::find();

        // 角色筛选
        if let Some(ref role) = role {
            select = select.filter(Column::Role.eq(role.as_str()));
        }

        // 排序
        select = select
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id);

        // 分页查询
        let paginator = select.paginate(&self.db, page.limit as u64);
        let total = paginator.num_items().await.map_err(|e| {
            HWSystemError::database_operation(format!("Failed to count users: {e}"))
        })?;

        let users = paginator
            .fetch_page(page.index())
            .await
            .map_err(|e| HWSystemError::database_operation(format!("Failed to list users: {e}")))?;

        Ok(UserListResponse {
            users: users.into_iter().map(|m| m.into_user()).collect(),
            pagination: page.info(total),
        })
    }

    /// 修改用户角色
    pub async fn update_user_role_impl(&self, id: i64, role: UserRole) -> Result<Option<User>> {
        // 先检查用户是否存在
        if self.get_user_by_id_impl(id).await?.is_none() {
            return Ok(None);
        }

        let model = ActiveModel {
            id: Set(id),
            role: Set(role.to_string()),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        model.update(&self.db).await.map_err(|e| {
            HWSystemError::database_operation(format!("Failed to update user role: {e}"))
        })?;

        self.get_user_by_id_impl(id).await
    }

    /// 修改个人资料（姓名、语言）
    pub async fn update_user_profile_impl(
        &self,
        id: i64,
        update: UpdateProfile,
    ) -> Result<Option<User>> {
        if self.get_user_by_id_impl(id).await?.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(first_name) = update.first_name {
            model.first_name = Set(first_name);
        }

        if let Some(last_name) = update.last_name {
            model.last_name = Set(last_name);
        }

        if let Some(language) = update.language {
            model.language = Set(language.to_string());
        }

        model.update(&self.db).await.map_err(|e| {
            HWSystemError::database_operation(format!("Failed to update profile: {e}"))
        })?;

        self.get_user_by_id_impl(id).await
    }

    /// 统计用户数量
    pub async fn count_users_impl(&self) -> Result<u64> {
        let count = Users::find()
            .count(&self.db)
            .await
            .map_err(|e| HWSystemError::database_operation(format!("Failed to count users: {e}")))?;

        Ok(count)
    }
}
