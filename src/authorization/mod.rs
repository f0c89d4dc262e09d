//! 访问控制矩阵
//!
//! 每个 (资源, 操作) 对应一条静态权限：允许的角色列表，以及可选的所有权约束。
//! 角色检查在中间件中完成（早于资源查询）；所有权检查在服务层中、资源存在性确认之后完成，
//! 因此对不存在资源的访问返回 404 而不是 403。

use tracing::info;

use crate::errors::{HWSystemError, Result};
use crate::models::users::entities::{User, UserRole};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Assignment,
    Submission,
    Attachment,
    Feedback,
    UserRole,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Read,
    List,
    Update,
    Delete,
}

/// 所有权约束
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// 不检查所有权
    Any,
    /// 资源所有者，或列出的角色之一
    OwnerOr(&'static [&'static UserRole]),
    /// 只有资源所有者
    OwnerOnly,
}

#[derive(Debug, Clone, Copy)]
pub struct Permission {
    pub roles: &'static [&'static UserRole],
    pub ownership: Ownership,
}

const NOBODY: &[&UserRole] = &[];

/// 查询权限表
pub fn permission(resource: Resource, action: Action) -> Permission {
    use Action::*;
    use Ownership::*;

    let all = UserRole::all_roles();
    let staff = UserRole::staff_roles();
    let instructors = UserRole::instructor_roles();
    let students = UserRole::student_roles();
    let admins = UserRole::admin_roles();

    let (roles, ownership) = match (resource, action) {
        (Resource::Assignment, Create) => (staff, Any),
        (Resource::Assignment, Read | List) => (all, Any),
        (Resource::Assignment, Update) => (staff, OwnerOr(instructors)),
        (Resource::Assignment, Delete) => (instructors, Any),

        (Resource::Submission, Create) => (students, Any),
        (Resource::Submission, Read) => (all, OwnerOr(staff)),
        (Resource::Submission, List) => (staff, Any),
        (Resource::Submission, Update) => (students, OwnerOnly),
        (Resource::Submission, Delete) => (NOBODY, Any),

        (Resource::Attachment, Read) => (all, OwnerOr(staff)),
        (Resource::Attachment, _) => (NOBODY, Any),

        (Resource::Feedback, Create) => (staff, Any),
        (Resource::Feedback, Read | List) => (all, OwnerOr(staff)),
        (Resource::Feedback, Update) => (staff, OwnerOr(instructors)),
        (Resource::Feedback, Delete) => (NOBODY, Any),

        (Resource::UserRole, List | Update) => (admins, Any),
        (Resource::UserRole, _) => (NOBODY, Any),
    };

    Permission { roles, ownership }
}

impl Permission {
    pub fn allows_role(&self, role: &UserRole) -> bool {
        self.roles.iter().any(|r| *r == role)
    }

    /// owner 为资源所有者的用户 ID；不涉及所有权的操作传 None
    pub fn allows(&self, actor: &User, owner: Option<i64>) -> bool {
        if !self.allows_role(&actor.role) {
            return false;
        }
        match self.ownership {
            Ownership::Any => true,
            Ownership::OwnerOnly => owner == Some(actor.id),
            Ownership::OwnerOr(overrides) => {
                owner == Some(actor.id) || overrides.iter().any(|r| **r == actor.role)
            }
        }
    }
}

/// 检查当前用户能否对资源执行操作，拒绝时返回 Authorization 错误
pub fn authorize(actor: &User, resource: Resource, action: Action, owner: Option<i64>) -> Result<()> {
    if permission(resource, action).allows(actor, owner) {
        Ok(())
    } else {
        info!(
            "Access denied for user {} (role: {}) on {:?}::{:?}",
            actor.id, actor.role, resource, action
        );
        Err(forbidden())
    }
}

pub fn forbidden() -> HWSystemError {
    HWSystemError::authorization("Forbidden: you do not have permission to perform this action")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::Language;

    fn user(id: i64, role: UserRole) -> User {
        User {
            id,
            email: format!("u{id}@x.com"),
            password_hash: String::new(),
            first_name: "U".to_string(),
            last_name: id.to_string(),
            role,
            language: Language::En,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_assignment_rules() {
        let student = user(1, UserRole::Student);
        let ta = user(2, UserRole::Ta);
        let other_ta = user(3, UserRole::Ta);
        let instructor = user(4, UserRole::Instructor);

        assert!(authorize(&student, Resource::Assignment, Action::Create, None).is_err());
        assert!(authorize(&ta, Resource::Assignment, Action::Create, None).is_ok());
        assert!(authorize(&student, Resource::Assignment, Action::List, None).is_ok());

        // TA 只能修改自己创建的作业，教师可修改任意作业
        assert!(authorize(&ta, Resource::Assignment, Action::Update, Some(2)).is_ok());
        assert!(authorize(&other_ta, Resource::Assignment, Action::Update, Some(2)).is_err());
        assert!(authorize(&instructor, Resource::Assignment, Action::Update, Some(2)).is_ok());
        assert!(authorize(&student, Resource::Assignment, Action::Update, Some(1)).is_err());

        assert!(authorize(&ta, Resource::Assignment, Action::Delete, None).is_err());
        assert!(authorize(&instructor, Resource::Assignment, Action::Delete, None).is_ok());
    }

    #[test]
    fn test_submission_rules() {
        let owner = user(10, UserRole::Student);
        let classmate = user(11, UserRole::Student);
        let ta = user(12, UserRole::Ta);
        let admin = user(13, UserRole::Admin);

        assert!(authorize(&owner, Resource::Submission, Action::Create, None).is_ok());
        assert!(authorize(&ta, Resource::Submission, Action::Create, None).is_err());
        assert!(authorize(&admin, Resource::Submission, Action::Create, None).is_err());

        assert!(authorize(&owner, Resource::Submission, Action::Read, Some(10)).is_ok());
        assert!(authorize(&classmate, Resource::Submission, Action::Read, Some(10)).is_err());
        assert!(authorize(&ta, Resource::Submission, Action::Read, Some(10)).is_ok());

        assert!(authorize(&owner, Resource::Submission, Action::Update, Some(10)).is_ok());
        assert!(authorize(&classmate, Resource::Submission, Action::Update, Some(10)).is_err());
        assert!(authorize(&admin, Resource::Submission, Action::Update, Some(10)).is_err());

        assert!(authorize(&owner, Resource::Submission, Action::List, None).is_err());
        assert!(authorize(&ta, Resource::Submission, Action::List, None).is_ok());
        assert!(authorize(&admin, Resource::Submission, Action::Delete, None).is_err());
    }

    #[test]
    fn test_feedback_rules() {
        let student = user(20, UserRole::Student);
        let reviewer = user(21, UserRole::Ta);
        let other_ta = user(22, UserRole::Ta);
        let instructor = user(23, UserRole::Instructor);

        assert!(authorize(&student, Resource::Feedback, Action::Create, None).is_err());
        assert!(authorize(&reviewer, Resource::Feedback, Action::Create, None).is_ok());

        assert!(authorize(&reviewer, Resource::Feedback, Action::Update, Some(21)).is_ok());
        assert!(authorize(&other_ta, Resource::Feedback, Action::Update, Some(21)).is_err());
        assert!(authorize(&instructor, Resource::Feedback, Action::Update, Some(21)).is_ok());

        // 反馈的读取以提交所属学生为所有者
        assert!(authorize(&student, Resource::Feedback, Action::List, Some(20)).is_ok());
        assert!(authorize(&student, Resource::Feedback, Action::List, Some(99)).is_err());
        assert!(authorize(&other_ta, Resource::Feedback, Action::List, Some(99)).is_ok());
    }

    #[test]
    fn test_user_role_rules() {
        for role in UserRole::all_roles() {
            let actor = user(30, **role);
            let allowed = **role == UserRole::Admin;
            assert_eq!(
                authorize(&actor, Resource::UserRole, Action::Update, None).is_ok(),
                allowed
            );
            assert_eq!(
                authorize(&actor, Resource::UserRole, Action::List, None).is_ok(),
                allowed
            );
        }
    }

    #[test]
    fn test_forbidden_message() {
        let msg = forbidden().message().to_lowercase();
        assert!(msg.contains("forbidden") || msg.contains("permission"));
    }
}
