use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::EvaluationService;
use crate::middlewares::RequireJWT;
use crate::models::evaluations::entities::QuestionSnapshot;
use crate::models::evaluations::requests::CreateEvaluationRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::NewEvaluation;
use crate::utils::validate::validate_period;

/// 创建评估记录
/// POST /evaluations
///
/// 教师为自己的某个 科目+班级 组合开启评估周期。组合必须在其
/// 活跃教学任务之内，且该学段尚无记录（唯一性由存储层原子保证）。
pub async fn create_evaluation(
    service: &EvaluationService,
    request: &HttpRequest,
    req: CreateEvaluationRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let current_user = match RequireJWT::extract_user(request) {
        Some(user) => user,
        None => {
            return Ok(HttpResponse::Unauthorized()
                .json(ApiResponse::error_empty(ErrorCode::Unauthorized, "未登录")));
        }
    };

    if let Err(msg) = validate_period(&req.period) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::ValidationFailed, msg)));
    }

    // AssignmentGate：组合必须在教师的活跃教学任务内
    let assignments = match storage
        .list_active_assignments(current_user.id, &req.period)
        .await
    {
        Ok(list) => list,
        Err(e) => return Ok(super::storage_error_response(&e)),
    };

    let authorized = assignments
        .iter()
        .any(|a| a.subject == req.subject && a.class_name == req.class_name);
    if !authorized {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::Forbidden,
            "该 科目+班级 组合不在您的活跃教学任务中",
        )));
    }

    // 解析模板并展平为冻结快照
    let template = match storage.get_rubric_template(req.template_id).await {
        Ok(Some(template)) => template,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::TemplateNotFound,
                "量表模板不存在",
            )));
        }
        Err(e) => return Ok(super::storage_error_response(&e)),
    };

    let questions_snapshot = QuestionSnapshot::flatten_template(&template);
    if questions_snapshot.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::ValidationFailed,
            "量表模板没有可评分条目",
        )));
    }

    match storage
        .create_evaluation(NewEvaluation {
            teacher_id: current_user.id,
            subject: req.subject,
            class_name: req.class_name,
            period: req.period,
            template_id: template.id,
            questions_snapshot,
        })
        .await
    {
        Ok(record) => Ok(HttpResponse::Ok().json(ApiResponse::success(record, "评估记录已创建"))),
        Err(crate::errors::EvalSystemError::Conflict(msg)) => Ok(HttpResponse::Conflict().json(
            ApiResponse::error_empty(ErrorCode::EvaluationAlreadyExists, msg),
        )),
        Err(e) => Ok(super::storage_error_response(&e)),
    }
}
