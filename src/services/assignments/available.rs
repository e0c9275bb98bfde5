use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::collections::HashSet;

use super::AssignmentService;
use crate::middlewares::RequireJWT;
use crate::models::assignments::entities::AvailableAssignment;
use crate::models::assignments::responses::AvailableAssignmentsResponse;
use crate::models::evaluations::requests::AvailableAssignmentsParams;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::evaluations::storage_error_response;
use crate::utils::validate::validate_period;

/// 列出当前教师在某学段还可发起评估的 科目+班级 组合
/// GET /assignments/available
///
/// 活跃教学任务减去该学段已有评估记录的组合。已有记录即占用组合，
/// 与记录处于哪个阶段无关。
pub async fn list_available_assignments(
    service: &AssignmentService,
    request: &HttpRequest,
    params: AvailableAssignmentsParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let current_user = match RequireJWT::extract_user(request) {
        Some(user) => user,
        None => {
            return Ok(HttpResponse::Unauthorized()
                .json(ApiResponse::error_empty(ErrorCode::Unauthorized, "未登录")));
        }
    };

    if let Err(msg) = validate_period(&params.period) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::ValidationFailed, msg)));
    }

    let assignments = match storage
        .list_active_assignments(current_user.id, &params.period)
        .await
    {
        Ok(list) => list,
        Err(e) => return Ok(storage_error_response(&e)),
    };

    let records = match storage
        .list_evaluations_for_teacher_period(current_user.id, &params.period)
        .await
    {
        Ok(list) => list,
        Err(e) => return Ok(storage_error_response(&e)),
    };

    let taken: HashSet<(String, String)> = records
        .into_iter()
        .map(|r| (r.subject, r.class_name))
        .collect();

    let items: Vec<AvailableAssignment> = assignments
        .into_iter()
        .filter(|a| !taken.contains(&(a.subject.clone(), a.class_name.clone())))
        .map(|a| AvailableAssignment {
            subject: a.subject,
            class_name: a.class_name,
        })
        .collect();

    let response = AvailableAssignmentsResponse {
        teacher_id: current_user.id,
        period: params.period,
        items,
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(response, "查询成功")))
}
