//! 预导入模块，方便使用

pub use super::evaluations::{
    ActiveModel as EvaluationActiveModel, Entity as Evaluations, Model as EvaluationModel,
};
pub use super::rubric_templates::{
    ActiveModel as RubricTemplateActiveModel, Entity as RubricTemplates,
    Model as RubricTemplateModel,
};
pub use super::teaching_assignments::{
    ActiveModel as TeachingAssignmentActiveModel, Entity as TeachingAssignments,
    Model as TeachingAssignmentModel,
};
pub use super::users::{ActiveModel as UserActiveModel, Entity as Users, Model as UserModel};
