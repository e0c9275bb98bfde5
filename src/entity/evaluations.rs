//! 评估记录实体
//!
//! 聚合根按文档方式落库：问题快照与三个观察环节各占一个 Text 列，
//! 存 JSON 子文档，不做关系化拆表。status 列是反规范化的读优化，
//! 真值由三个环节的状态推导。

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "evaluations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub teacher_id: i64,
    pub subject: String,
    pub class_name: String,
    pub period: String,
    pub template_id: i64,
    #[sea_orm(column_type = "Text")]
    pub questions_snapshot: String,
    #[sea_orm(column_type = "Text")]
    pub self_evaluation: String,
    #[sea_orm(column_type = "Text")]
    pub observation_1: String,
    #[sea_orm(column_type = "Text")]
    pub observation_2: String,
    pub status: String,
    pub scheduled_date: Option<String>,
    pub scheduled_time: Option<String>,
    pub observer_name: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub ai_comment: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::TeacherId",
        to = "super::users::Column::Id"
    )]
    Teacher,
    #[sea_orm(
        belongs_to = "super::rubric_templates::Entity",
        from = "Column::TemplateId",
        to = "super::rubric_templates::Column::Id"
    )]
    Template,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Teacher.def()
    }
}

impl Related<super::rubric_templates::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Template.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// 反序列化为业务聚合；JSON 列损坏视为数据错误上抛
    pub fn into_record(
        self,
    ) -> Result<crate::models::evaluations::entities::EvaluationRecord, serde_json::Error> {
        use crate::models::evaluations::entities::{EvaluationRecord, EvaluationStatus};
        use chrono::{DateTime, Utc};

        let questions_snapshot = serde_json::from_str(&self.questions_snapshot)?;
        let self_evaluation = serde_json::from_str(&self.self_evaluation)?;
        let observation_1 = serde_json::from_str(&self.observation_1)?;
        let observation_2 = serde_json::from_str(&self.observation_2)?;
        let status = self
            .status
            .parse::<EvaluationStatus>()
            .unwrap_or(EvaluationStatus::PendingSelfEvaluation);

        Ok(EvaluationRecord {
            id: self.id,
            teacher_id: self.teacher_id,
            subject: self.subject,
            class_name: self.class_name,
            period: self.period,
            template_id: self.template_id,
            questions_snapshot,
            self_evaluation,
            observation_1,
            observation_2,
            status,
            scheduled_date: self.scheduled_date,
            scheduled_time: self.scheduled_time,
            observer_name: self.observer_name,
            notes: self.notes,
            ai_comment: self.ai_comment,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
            updated_at: DateTime::<Utc>::from_timestamp(self.updated_at, 0).unwrap_or_default(),
        })
    }
}
