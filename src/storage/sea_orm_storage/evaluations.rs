//! 评估记录存储操作
//!
//! 生命周期迁移全部走单次条件更新：update 语句同时过滤记录 ID 与
//! 期望的当前状态，rows_affected 为 0 即判定前置状态不满足。
//! 创建唯一性由数据库唯一索引保证，不做先查后写。

use super::SeaOrmStorage;
use crate::entity::evaluations::{ActiveModel, Column, Entity as Evaluations};
use crate::errors::{EvalSystemError, Result};
use crate::models::{
    PaginatedResponse, PaginationInfo,
    evaluations::{
        entities::{EvaluationRecord, EvaluationStatus, ObservationRound, ObservationSection},
        requests::{EvaluationListQuery, UpdateScheduleRequest},
        responses::EvaluationListItem,
    },
};
use crate::storage::NewEvaluation;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    SqlErr,
};

impl SeaOrmStorage {
    /// 创建评估记录
    ///
    /// 三个环节初始化为 pending，整体状态 pending_self_evaluation。
    /// 同 教师+科目+班级+学段 组合已存在时由唯一索引拦截并映射为 Conflict，
    /// 并发创建时先写者赢。
    pub async fn create_evaluation_impl(&self, new: NewEvaluation) -> Result<EvaluationRecord> {
        let now = chrono::Utc::now().timestamp();

        let snapshot = serde_json::to_string(&new.questions_snapshot)
            .map_err(|e| EvalSystemError::serialization(format!("问题快照序列化失败: {e}")))?;
        let pending_section = serde_json::to_string(&ObservationSection::pending())
            .map_err(|e| EvalSystemError::serialization(format!("环节序列化失败: {e}")))?;

        let model = ActiveModel {
            teacher_id: Set(new.teacher_id),
            subject: Set(new.subject),
            class_name: Set(new.class_name),
            period: Set(new.period),
            template_id: Set(new.template_id),
            questions_snapshot: Set(snapshot),
            self_evaluation: Set(pending_section.clone()),
            observation_1: Set(pending_section.clone()),
            observation_2: Set(pending_section),
            status: Set(EvaluationStatus::PendingSelfEvaluation.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model.insert(&self.db).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                EvalSystemError::conflict("该 教师+科目+班级+学段 组合已存在评估记录")
            } else {
                EvalSystemError::database_operation(format!("创建评估记录失败: {e}"))
            }
        })?;

        result
            .into_record()
            .map_err(|e| EvalSystemError::serialization(format!("评估记录 JSON 损坏: {e}")))
    }

    /// 通过 ID 获取评估记录
    pub async fn get_evaluation_by_id_impl(&self, id: i64) -> Result<Option<EvaluationRecord>> {
        let result = Evaluations::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| EvalSystemError::database_operation(format!("查询评估记录失败: {e}")))?;

        result
            .map(|m| m.into_record())
            .transpose()
            .map_err(|e| EvalSystemError::serialization(format!("评估记录 JSON 损坏: {e}")))
    }

    /// 提交自评（条件写）
    pub async fn submit_self_evaluation_impl(
        &self,
        id: i64,
        section: ObservationSection,
    ) -> Result<EvaluationRecord> {
        self.conditional_submit(
            id,
            Column::SelfEvaluation,
            section,
            EvaluationStatus::PendingSelfEvaluation,
            EvaluationStatus::PendingObservation1,
        )
        .await
    }

    /// 提交观察评分（条件写）
    pub async fn submit_observation_impl(
        &self,
        id: i64,
        round: ObservationRound,
        section: ObservationSection,
    ) -> Result<EvaluationRecord> {
        let (column, expected) = match round {
            ObservationRound::First => (Column::Observation1, EvaluationStatus::PendingObservation1),
            ObservationRound::Second => {
                (Column::Observation2, EvaluationStatus::PendingObservation2)
            }
        };
        // next() 对非终态必有值
        let next = expected
            .next()
            .ok_or_else(|| EvalSystemError::conflict("评估已结束"))?;
        self.conditional_submit(id, column, section, expected, next)
            .await
    }

    /// 单次条件更新：仅当记录仍处于期望状态时写入环节并推进整体状态。
    /// rows_affected == 0 时区分 NotFound 与 Conflict，均不产生部分写入。
    async fn conditional_submit(
        &self,
        id: i64,
        section_column: Column,
        section: ObservationSection,
        expected: EvaluationStatus,
        next: EvaluationStatus,
    ) -> Result<EvaluationRecord> {
        let now = chrono::Utc::now().timestamp();
        let section_json = serde_json::to_string(&section)
            .map_err(|e| EvalSystemError::serialization(format!("环节序列化失败: {e}")))?;

        let result = Evaluations::update_many()
            .col_expr(section_column, Expr::value(section_json))
            .col_expr(Column::Status, Expr::value(next.to_string()))
            .col_expr(Column::UpdatedAt, Expr::value(now))
            .filter(Column::Id.eq(id))
            .filter(Column::Status.eq(expected.to_string()))
            .exec(&self.db)
            .await
            .map_err(|e| EvalSystemError::database_operation(format!("提交评估环节失败: {e}")))?;

        if result.rows_affected == 0 {
            return match self.get_evaluation_by_id_impl(id).await? {
                Some(record) => Err(EvalSystemError::conflict(format!(
                    "评估记录当前状态为 {}，不允许该提交（要求 {}）",
                    record.status, expected
                ))),
                None => Err(EvalSystemError::not_found(format!("评估记录 {id} 不存在"))),
            };
        }

        self.get_evaluation_by_id_impl(id)
            .await?
            .ok_or_else(|| EvalSystemError::not_found(format!("评估记录 {id} 不存在")))
    }

    /// 更新排期元数据（管理属性，不检查生命周期状态）
    pub async fn update_schedule_impl(
        &self,
        id: i64,
        update: UpdateScheduleRequest,
    ) -> Result<Option<EvaluationRecord>> {
        let existing = self.get_evaluation_by_id_impl(id).await?;
        if existing.is_none() {
            return Ok(None);
        }

        let now = chrono::Utc::now().timestamp();

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(now),
            ..Default::default()
        };

        if let Some(scheduled_date) = update.scheduled_date {
            model.scheduled_date = Set(Some(scheduled_date));
        }

        if let Some(scheduled_time) = update.scheduled_time {
            model.scheduled_time = Set(Some(scheduled_time));
        }

        if let Some(observer_name) = update.observer_name {
            model.observer_name = Set(Some(observer_name));
        }

        if let Some(notes) = update.notes {
            model.notes = Set(Some(notes));
        }

        model
            .update(&self.db)
            .await
            .map_err(|e| EvalSystemError::database_operation(format!("更新排期失败: {e}")))?;

        self.get_evaluation_by_id_impl(id).await
    }

    /// 写入 AI 评语缓存字段
    pub async fn set_ai_comment_impl(&self, id: i64, comment: &str) -> Result<bool> {
        let now = chrono::Utc::now().timestamp();

        let result = Evaluations::update_many()
            .col_expr(Column::AiComment, Expr::value(comment))
            .col_expr(Column::UpdatedAt, Expr::value(now))
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| EvalSystemError::database_operation(format!("写入 AI 评语失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 分页列出评估记录
    pub async fn list_evaluations_with_pagination_impl(
        &self,
        query: EvaluationListQuery,
    ) -> Result<PaginatedResponse<EvaluationListItem>> {
        let page = query.page.unwrap_or(1).max(1) as u64;
        let size = query.size.unwrap_or(10).clamp(1, 100) as u64;

        let mut select = Evaluations::find();

        if let Some(teacher_id) = query.teacher_id {
            select = select.filter(Column::TeacherId.eq(teacher_id));
        }

        if let Some(ref period) = query.period {
            select = select.filter(Column::Period.eq(period.as_str()));
        }

        if let Some(status) = query.status {
            select = select.filter(Column::Status.eq(status.to_string()));
        }

        select = select.order_by_desc(Column::UpdatedAt);

        let paginator = select.paginate(&self.db, size);
        let total = paginator.num_items().await.map_err(|e| {
            EvalSystemError::database_operation(format!("查询评估记录总数失败: {e}"))
        })?;

        let pages = paginator.num_pages().await.map_err(|e| {
            EvalSystemError::database_operation(format!("查询评估记录页数失败: {e}"))
        })?;

        let rows = paginator.fetch_page(page - 1).await.map_err(|e| {
            EvalSystemError::database_operation(format!("查询评估记录列表失败: {e}"))
        })?;

        // 列表行不解析 JSON 子文档，直接取标量列
        let items = rows
            .into_iter()
            .map(|m| EvaluationListItem {
                id: m.id,
                teacher_id: m.teacher_id,
                subject: m.subject,
                class_name: m.class_name,
                period: m.period,
                status: m
                    .status
                    .parse()
                    .unwrap_or(EvaluationStatus::PendingSelfEvaluation),
                scheduled_date: m.scheduled_date,
                scheduled_time: m.scheduled_time,
                observer_name: m.observer_name,
                updated_at: chrono::DateTime::<chrono::Utc>::from_timestamp(m.updated_at, 0)
                    .unwrap_or_default(),
            })
            .collect();

        Ok(PaginatedResponse {
            items,
            pagination: PaginationInfo {
                page: page as i64,
                page_size: size as i64,
                total: total as i64,
                total_pages: pages as i64,
            },
        })
    }

    /// 列出教师在某学段的全部评估记录
    pub async fn list_evaluations_for_teacher_period_impl(
        &self,
        teacher_id: i64,
        period: &str,
    ) -> Result<Vec<EvaluationRecord>> {
        let rows = Evaluations::find()
            .filter(Column::TeacherId.eq(teacher_id))
            .filter(Column::Period.eq(period))
            .all(&self.db)
            .await
            .map_err(|e| EvalSystemError::database_operation(format!("查询评估记录失败: {e}")))?;

        rows.into_iter()
            .map(|m| {
                m.into_record().map_err(|e| {
                    EvalSystemError::serialization(format!("评估记录 JSON 损坏: {e}"))
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::evaluations::entities::{
        ObservationMark, QuestionSnapshot, SectionStatus, SelfEvaluationAnswer,
    };
    use crate::models::rubrics::requests::CreateRubricTemplateRequest;
    use crate::models::users::{entities::UserRole, requests::CreateUserRequest};
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{ConnectOptions, Database};
    use std::collections::HashMap;

    async fn storage() -> SeaOrmStorage {
        // 单连接池，保证所有语句落在同一个内存库上
        let mut opt = ConnectOptions::new("sqlite::memory:");
        opt.max_connections(1);
        let db = Database::connect(opt).await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        SeaOrmStorage { db }
    }

    /// 评估记录带外键，先落一个教师和一个模板
    async fn seed_refs(storage: &SeaOrmStorage) -> (i64, i64) {
        let teacher = storage
            .create_user_impl(CreateUserRequest {
                username: "cikgu_aminah".to_string(),
                email: "aminah@sekolah.edu.my".to_string(),
                password: "hashed".to_string(),
                role: UserRole::Teacher,
                display_name: None,
            })
            .await
            .unwrap();

        let template = storage
            .create_rubric_template_impl(CreateRubricTemplateRequest {
                name: "Standard 4 PdP (fixture)".to_string(),
                version: 1,
                categories: vec![],
                weights: HashMap::new(),
            })
            .await
            .unwrap();

        (teacher.id, template.id)
    }

    fn new_evaluation(teacher_id: i64, template_id: i64, period: &str) -> NewEvaluation {
        NewEvaluation {
            teacher_id,
            subject: "Bahasa Melayu".to_string(),
            class_name: "4 Bestari".to_string(),
            period: period.to_string(),
            template_id,
            questions_snapshot: vec![QuestionSnapshot {
                question_id: "4.1.1".to_string(),
                text: "Guru merancang pelaksanaan PdP".to_string(),
                max_score: 4,
                category_code: Some("S4".to_string()),
                sub_category_code: Some("4.1".to_string()),
                score_descriptions: vec![],
            }],
        }
    }

    fn submitted_self(answer: &str) -> ObservationSection {
        ObservationSection {
            status: SectionStatus::Submitted,
            submitted_at: Some(chrono::Utc::now()),
            administrator_id: None,
            answers: vec![SelfEvaluationAnswer {
                question_id: "4.1.1".to_string(),
                answer: answer.to_string(),
            }],
            marks: Vec::new(),
        }
    }

    fn submitted_marks() -> ObservationSection {
        ObservationSection {
            status: SectionStatus::Submitted,
            submitted_at: Some(chrono::Utc::now()),
            administrator_id: Some(99),
            answers: Vec::new(),
            marks: vec![ObservationMark {
                question_id: "4.1.1".to_string(),
                mark: 3,
                comment: None,
            }],
        }
    }

    #[tokio::test]
    async fn test_duplicate_creation_is_conflict() {
        let storage = storage().await;
        let (teacher_id, template_id) = seed_refs(&storage).await;

        storage
            .create_evaluation_impl(new_evaluation(teacher_id, template_id, "2025-S1"))
            .await
            .unwrap();

        let err = storage
            .create_evaluation_impl(new_evaluation(teacher_id, template_id, "2025-S1"))
            .await
            .unwrap_err();
        assert!(matches!(err, EvalSystemError::Conflict(_)));

        // 换学段则不冲突
        storage
            .create_evaluation_impl(new_evaluation(teacher_id, template_id, "2025-S2"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_out_of_order_observation_leaves_record_unchanged() {
        let storage = storage().await;
        let (teacher_id, template_id) = seed_refs(&storage).await;

        let record = storage
            .create_evaluation_impl(new_evaluation(teacher_id, template_id, "2025-S1"))
            .await
            .unwrap();

        storage
            .submit_self_evaluation_impl(record.id, submitted_self("Rancangan lengkap"))
            .await
            .unwrap();

        // 第一轮未完成时提交第二轮
        let err = storage
            .submit_observation_impl(record.id, ObservationRound::Second, submitted_marks())
            .await
            .unwrap_err();
        assert!(matches!(err, EvalSystemError::Conflict(_)));

        let after = storage
            .get_evaluation_by_id_impl(record.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(after.status, EvaluationStatus::PendingObservation1);
        assert_eq!(after.observation_2.status, SectionStatus::Pending);
        assert!(after.observation_2.marks.is_empty());
    }

    #[tokio::test]
    async fn test_resubmitted_self_evaluation_is_rejected() {
        let storage = storage().await;
        let (teacher_id, template_id) = seed_refs(&storage).await;

        let record = storage
            .create_evaluation_impl(new_evaluation(teacher_id, template_id, "2025-S1"))
            .await
            .unwrap();

        let first = storage
            .submit_self_evaluation_impl(record.id, submitted_self("Jawapan pertama"))
            .await
            .unwrap();
        assert_eq!(first.status, EvaluationStatus::PendingObservation1);

        let err = storage
            .submit_self_evaluation_impl(record.id, submitted_self("Jawapan kedua"))
            .await
            .unwrap_err();
        assert!(matches!(err, EvalSystemError::Conflict(_)));

        // 首次提交的内容原样保留
        let after = storage
            .get_evaluation_by_id_impl(record.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(after.status, EvaluationStatus::PendingObservation1);
        assert_eq!(after.self_evaluation.answers.len(), 1);
        assert_eq!(after.self_evaluation.answers[0].answer, "Jawapan pertama");
        assert_eq!(
            after.self_evaluation.submitted_at,
            first.self_evaluation.submitted_at
        );
    }

    #[tokio::test]
    async fn test_submit_on_missing_record_is_not_found() {
        let storage = storage().await;

        let err = storage
            .submit_self_evaluation_impl(12345, submitted_self("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, EvalSystemError::NotFound(_)));
    }
}
