//! 预导入模块，方便使用

pub use super::assignments::{
    ActiveModel as AssignmentActiveModel, Entity as Assignments, Model as AssignmentModel,
};
pub use super::attachments::{
    ActiveModel as AttachmentActiveModel, Entity as Attachments, Model as AttachmentModel,
};
pub use super::feedback::{
    ActiveModel as FeedbackActiveModel, Entity as Feedback, Model as FeedbackModel,
};
pub use super::submissions::{
    ActiveModel as SubmissionActiveModel, Entity as Submissions, Model as SubmissionModel,
};
pub use super::users::{ActiveModel as UserActiveModel, Entity as Users, Model as UserModel};
