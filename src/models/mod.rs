//! 业务数据模型
//!
//! 按领域划分：common（响应封装/分页）、users、rubrics（评估量表）、
//! assignments（教学任务）、evaluations（评估记录与评分引擎）。

pub mod assignments;
pub mod common;
pub mod evaluations;
pub mod rubrics;
pub mod users;

pub use common::pagination::{PaginatedResponse, PaginationInfo, PaginationQuery};
pub use common::response::ApiResponse;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 业务错误码（HTTP 响应 code 字段）
///
/// 约定：0 表示成功；4xxyy 对应客户端错误；5xxyy 对应服务端错误。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/api.ts")]
pub enum ErrorCode {
    Success = 0,

    BadRequest = 40000,
    InvalidQueryParameter = 40001,
    InvalidJsonBody = 40002,
    ValidationFailed = 40003,

    Unauthorized = 40100,

    Forbidden = 40300,
    NotEvaluationOwner = 40301,

    NotFound = 40400,
    EvaluationNotFound = 40401,
    TemplateNotFound = 40402,

    Conflict = 40900,
    EvaluationAlreadyExists = 40901,
    InvalidLifecycleState = 40902,
    SectionAlreadySubmitted = 40903,

    RateLimitExceeded = 42900,

    InternalServerError = 50000,
}

/// 程序启动时间（用于运行时长统计）
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}
