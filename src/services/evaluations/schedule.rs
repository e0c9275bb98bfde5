use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::EvaluationService;
use crate::models::evaluations::requests::UpdateScheduleRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::utils::validate::{validate_schedule_date, validate_schedule_time};

/// 更新观察排期
/// PUT /evaluations/{id}/schedule
///
/// 路由层已限定管理员角色。排期可在任何状态下修改，
/// 不触发状态转移。
pub async fn update_schedule(
    service: &EvaluationService,
    request: &HttpRequest,
    evaluation_id: i64,
    req: UpdateScheduleRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    if let Some(date) = &req.scheduled_date {
        if let Err(msg) = validate_schedule_date(date) {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::ValidationFailed, msg)));
        }
    }
    if let Some(time) = &req.scheduled_time {
        if let Err(msg) = validate_schedule_time(time) {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::ValidationFailed, msg)));
        }
    }

    match storage.update_schedule(evaluation_id, req).await {
        Ok(Some(record)) => Ok(HttpResponse::Ok().json(ApiResponse::success(record, "排期已更新"))),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::EvaluationNotFound,
            "评估记录不存在",
        ))),
        Err(e) => Ok(super::storage_error_response(&e)),
    }
}
