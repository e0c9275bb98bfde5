use serde::Deserialize;
use ts_rs::TS;

use crate::models::common::pagination::PaginationQuery;
use crate::models::evaluations::entities::{
    EvaluationStatus, ObservationMark, SelfEvaluationAnswer,
};

/// 创建评估记录请求（教师发起，AssignmentGate 授权）
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct CreateEvaluationRequest {
    pub template_id: i64,
    pub subject: String,
    pub class_name: String,
    pub period: String,
}

/// 提交自评请求
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct SubmitSelfEvaluationRequest {
    pub answers: Vec<SelfEvaluationAnswer>,
}

/// 提交观察评分请求（第一轮 / 第二轮通用）
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct SubmitObservationRequest {
    pub marks: Vec<ObservationMark>,
}

/// 更新排期元数据请求（管理属性，不参与生命周期约束）
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct UpdateScheduleRequest {
    pub scheduled_date: Option<String>, // "YYYY-MM-DD"
    pub scheduled_time: Option<String>, // "HH:MM"
    pub observer_name: Option<String>,
    pub notes: Option<String>,
}

/// 评估记录列表查询参数（HTTP 请求）
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct EvaluationListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub teacher_id: Option<i64>,
    pub period: Option<String>,
    pub status: Option<EvaluationStatus>,
}

// 用于存储层的内部查询参数
#[derive(Debug, Clone)]
pub struct EvaluationListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub teacher_id: Option<i64>,
    pub period: Option<String>,
    pub status: Option<EvaluationStatus>,
}

/// 可发起评估组合查询参数
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct AvailableAssignmentsParams {
    pub period: String,
}
