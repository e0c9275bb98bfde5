use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::EvaluationService;
use crate::middlewares::RequireJWT;
use crate::models::evaluations::scoring::summarize;
use crate::models::users::entities::UserRole;
use crate::models::{ApiResponse, ErrorCode};

/// 获取评分汇总
/// GET /evaluations/{id}/summary
///
/// 汇总是记录快照加模板权重的纯函数，任何状态下都可调用，
/// 未提交的部分按 0 计入。
pub async fn get_summary(
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

    if current_user.role != UserRole::Admin && record.teacher_id != current_user.id {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::NotEvaluationOwner,
            "没有查看该评估记录的权限",
        )));
    }

    let template = match storage.get_rubric_template(record.template_id).await {
        Ok(Some(template)) => template,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::TemplateNotFound,
                "量表模板不存在",
            )));
        }
        Err(e) => return Ok(super::storage_error_response(&e)),
    };

    let summary = summarize(&record, &template.weights);
    Ok(HttpResponse::Ok().json(ApiResponse::success(summary, "查询成功")))
}
