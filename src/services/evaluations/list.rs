use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::EvaluationService;
use crate::middlewares::RequireJWT;
use crate::models::evaluations::requests::{EvaluationListParams, EvaluationListQuery};
use crate::models::users::entities::UserRole;
use crate::models::{ApiResponse, ErrorCode};

/// 分页列出评估记录
/// GET /evaluations
///
/// 教师视角强制过滤为本人记录；管理员可按 teacher_id 筛选，
/// 不筛选时看到全部（listPendingForAdmins 即 status 过滤的特例）。
pub async fn list_evaluations(
    service: &EvaluationService,
    request: &HttpRequest,
    params: EvaluationListParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let current_user = match RequireJWT::extract_user(request) {
        Some(user) => user,
        None => {
            return Ok(HttpResponse::Unauthorized()
                .json(ApiResponse::error_empty(ErrorCode::Unauthorized, "未登录")));
        }
    };

    let teacher_id = if current_user.role == UserRole::Admin {
        params.teacher_id
    } else {
        Some(current_user.id)
    };

    let query = EvaluationListQuery {
        page: Some(params.pagination.page),
        size: Some(params.pagination.size),
        teacher_id,
        period: params.period,
        status: params.status,
    };

    match storage.list_evaluations_with_pagination(query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(response, "查询成功"))),
        Err(e) => Ok(super::storage_error_response(&e)),
    }
}
