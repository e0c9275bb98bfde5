use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 教学任务（外部协作数据，只读）
///
/// 一条记录表示某教师在某学段教授某科目某班级。
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct TeachingAssignment {
    pub id: i64,
    pub teacher_id: i64,
    pub subject: String,
    pub class_name: String,
    pub period: String,
    pub active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// 可发起评估的 科目+班级 组合（AssignmentGate 的输出）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct AvailableAssignment {
    pub subject: String,
    pub class_name: String,
}
