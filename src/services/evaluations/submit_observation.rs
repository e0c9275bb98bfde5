use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::EvaluationService;
use crate::middlewares::RequireJWT;
use crate::models::evaluations::entities::{
    ObservationRound, ObservationSection, SectionStatus, validate_marks,
};
use crate::models::evaluations::requests::SubmitObservationRequest;
use crate::models::{ApiResponse, ErrorCode};

/// 提交观察评分（第一轮 / 第二轮）
/// POST /evaluations/{id}/observations/{round}
///
/// 路由层已限定管理员角色。第一轮要求已安排观察日期；
/// 第二轮在第一轮提交前永远被拒绝，由条件写对整体状态的过滤保证。
pub async fn submit_observation(
    service: &EvaluationService,
    request: &HttpRequest,
    evaluation_id: i64,
    round: u8,
    req: SubmitObservationRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let current_user = match RequireJWT::extract_user(request) {
        Some(user) => user,
        None => {
            return Ok(HttpResponse::Unauthorized()
                .json(ApiResponse::error_empty(ErrorCode::Unauthorized, "未登录")));
        }
    };

    let round = match ObservationRound::from_number(round) {
        Some(round) => round,
        None => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::BadRequest,
                "观察轮次只能是 1 或 2",
            )));
        }
    };

    let record = match storage.get_evaluation_by_id(evaluation_id).await {
        Ok(Some(record)) => record,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::EvaluationNotFound,
                "评估记录不存在",
            )));
        }
        Err(e) => return Ok(super::storage_error_response(&e)),
    };

    if round == ObservationRound::First && record.scheduled_date.is_none() {
        return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::InvalidLifecycleState,
            "第一轮观察须先安排观察日期",
        )));
    }

    if let Err(msg) = validate_marks(&record.questions_snapshot, &req.marks) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::ValidationFailed, msg)));
    }

    let section = ObservationSection {
        status: SectionStatus::Submitted,
        submitted_at: Some(chrono::Utc::now()),
        administrator_id: Some(current_user.id),
        answers: Vec::new(),
        marks: req.marks,
    };

    match storage
        .submit_observation(evaluation_id, round, section)
        .await
    {
        Ok(record) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            record,
            format!("第 {round} 轮观察评分已提交"),
        ))),
        Err(crate::errors::EvalSystemError::Conflict(msg)) => Ok(HttpResponse::Conflict().json(
            ApiResponse::error_empty(ErrorCode::InvalidLifecycleState, msg),
        )),
        Err(e) => Ok(super::storage_error_response(&e)),
    }
}
