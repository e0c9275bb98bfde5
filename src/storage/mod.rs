use std::sync::Arc;

use crate::models::{
    PaginatedResponse,
    assignments::entities::TeachingAssignment,
    evaluations::{
        entities::{EvaluationRecord, ObservationRound, ObservationSection, QuestionSnapshot},
        requests::{EvaluationListQuery, UpdateScheduleRequest},
        responses::EvaluationListItem,
    },
    rubrics::{entities::RubricTemplate, requests::CreateRubricTemplateRequest},
    users::{entities::User, requests::CreateUserRequest},
};

use crate::errors::Result;

pub mod sea_orm_storage;

/// 新建评估记录的写入参数（快照已展平，由服务层构造）
#[derive(Debug, Clone)]
pub struct NewEvaluation {
    pub teacher_id: i64,
    pub subject: String,
    pub class_name: String,
    pub period: String,
    pub template_id: i64,
    pub questions_snapshot: Vec<QuestionSnapshot>,
}

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户管理方法
    // 创建用户
    async fn create_user(&self, user: CreateUserRequest) -> Result<User>;
    // 通过ID获取用户信息
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    // 通过用户名获取用户信息
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
    // 统计用户数量（种子判断用）
    async fn count_users(&self) -> Result<u64>;

    /// 量表目录方法（对评估引擎只读，写入仅供启动种子）
    // 通过ID获取模板
    async fn get_rubric_template(&self, id: i64) -> Result<Option<RubricTemplate>>;
    // 通过名称获取模板
    async fn get_rubric_template_by_name(&self, name: &str) -> Result<Option<RubricTemplate>>;
    // 创建模板
    async fn create_rubric_template(
        &self,
        template: CreateRubricTemplateRequest,
    ) -> Result<RubricTemplate>;

    /// 教学任务方法（外部协作数据，只读）
    // 列出教师在某学段的活跃教学任务
    async fn list_active_assignments(
        &self,
        teacher_id: i64,
        period: &str,
    ) -> Result<Vec<TeachingAssignment>>;

    /// 评估记录方法
    // 创建评估记录；同组合已存在时返回 Conflict（由数据库唯一索引保证原子性）
    async fn create_evaluation(&self, new: NewEvaluation) -> Result<EvaluationRecord>;
    // 通过ID获取评估记录
    async fn get_evaluation_by_id(&self, id: i64) -> Result<Option<EvaluationRecord>>;
    // 提交自评：单次条件写，前置状态不满足时返回 Conflict
    async fn submit_self_evaluation(
        &self,
        id: i64,
        section: ObservationSection,
    ) -> Result<EvaluationRecord>;
    // 提交观察评分：单次条件写，前置状态不满足时返回 Conflict
    async fn submit_observation(
        &self,
        id: i64,
        round: ObservationRound,
        section: ObservationSection,
    ) -> Result<EvaluationRecord>;
    // 更新排期元数据（不受生命周期约束）
    async fn update_schedule(
        &self,
        id: i64,
        update: UpdateScheduleRequest,
    ) -> Result<Option<EvaluationRecord>>;
    // 写入 AI 评语缓存字段
    async fn set_ai_comment(&self, id: i64, comment: &str) -> Result<bool>;
    // 分页列出评估记录
    async fn list_evaluations_with_pagination(
        &self,
        query: EvaluationListQuery,
    ) -> Result<PaginatedResponse<EvaluationListItem>>;
    // 列出教师在某学段的全部评估记录（AssignmentGate 用）
    async fn list_evaluations_for_teacher_period(
        &self,
        teacher_id: i64,
        period: &str,
    ) -> Result<Vec<EvaluationRecord>>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
