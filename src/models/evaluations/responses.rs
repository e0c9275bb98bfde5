use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::evaluations::entities::EvaluationStatus;

/// 评估记录列表行（不携带快照与答卷正文）
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct EvaluationListItem {
    pub id: i64,
    pub teacher_id: i64,
    pub subject: String,
    pub class_name: String,
    pub period: String,
    pub status: EvaluationStatus,
    pub scheduled_date: Option<String>,
    pub scheduled_time: Option<String>,
    pub observer_name: Option<String>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
