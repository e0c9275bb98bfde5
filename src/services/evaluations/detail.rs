use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::EvaluationService;
use crate::middlewares::RequireJWT;
use crate::models::users::entities::UserRole;
use crate::models::{ApiResponse, ErrorCode};

/// 获取评估记录详情
/// GET /evaluations/{id}
///
/// 教师只能查看自己的记录，管理员可查看全部。
pub async fn get_evaluation(
    service: &EvaluationService,
    request: &HttpRequest,
    evaluation_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let current_user = match RequireJWT::extract_user(request) {
        Some(user) => user,
        None => {
            return Ok(HttpResponse::Unauthorized()
                .json(ApiResponse::error_empty(ErrorCode::Unauthorized, "未登录")));
        }
    };

    match storage.get_evaluation_by_id(evaluation_id).await {
        Ok(Some(record)) => {
            if current_user.role != UserRole::Admin && record.teacher_id != current_user.id {
                return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
                    ErrorCode::NotEvaluationOwner,
                    "没有查看该评估记录的权限",
                )));
            }
            Ok(HttpResponse::Ok().json(ApiResponse::success(record, "查询成功")))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::EvaluationNotFound,
            "评估记录不存在",
        ))),
        Err(e) => Ok(super::storage_error_response(&e)),
    }
}
