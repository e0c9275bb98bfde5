use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::EvaluationService;
use crate::middlewares::RequireJWT;
use crate::models::evaluations::entities::{
    ObservationSection, SectionStatus, validate_self_answers,
};
use crate::models::evaluations::requests::SubmitSelfEvaluationRequest;
use crate::models::{ApiResponse, ErrorCode};

/// 提交自评
/// POST /evaluations/{id}/self-evaluation
///
/// 只有记录所属教师可提交。答案先整体校验（全部条目必答、无未知
/// 条目、分值落在该条目的评分等级内），校验通过后由存储层做单次
/// 条件写，状态不符时整个提交被拒绝，记录保持原样。
pub async fn submit_self_evaluation(
    service: &EvaluationService,
    request: &HttpRequest,
    evaluation_id: i64,
    req: SubmitSelfEvaluationRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let current_user = match RequireJWT::extract_user(request) {
        Some(user) => user,
        None => {
            return Ok(HttpResponse::Unauthorized()
                .json(ApiResponse::error_empty(ErrorCode::Unauthorized, "未登录")));
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

    if record.teacher_id != current_user.id {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::NotEvaluationOwner,
            "只有记录所属教师可以提交自评",
        )));
    }

    if let Err(msg) = validate_self_answers(&record.questions_snapshot, &req.answers) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::ValidationFailed, msg)));
    }

    let section = ObservationSection {
        status: SectionStatus::Submitted,
        submitted_at: Some(chrono::Utc::now()),
        administrator_id: None,
        answers: req.answers,
        marks: Vec::new(),
    };

    match storage.submit_self_evaluation(evaluation_id, section).await {
        Ok(record) => Ok(HttpResponse::Ok().json(ApiResponse::success(record, "自评已提交"))),
        Err(crate::errors::EvalSystemError::Conflict(msg)) => Ok(HttpResponse::Conflict().json(
            ApiResponse::error_empty(ErrorCode::SectionAlreadySubmitted, msg),
        )),
        Err(e) => Ok(super::storage_error_response(&e)),
    }
}
