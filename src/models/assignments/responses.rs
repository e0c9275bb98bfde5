use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::assignments::entities::AvailableAssignment;

/// 可发起评估组合列表响应
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct AvailableAssignmentsResponse {
    pub teacher_id: i64,
    pub period: String,
    pub items: Vec<AvailableAssignment>,
}
