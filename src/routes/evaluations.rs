use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{self, RateLimit};
use crate::models::evaluations::requests::{
    CreateEvaluationRequest, EvaluationListParams, SubmitObservationRequest,
    SubmitSelfEvaluationRequest, UpdateScheduleRequest,
};
use crate::models::users::entities::UserRole;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::EvaluationService;
use crate::utils::SafeIDI64;

// 懒加载的全局 EvaluationService 实例
static EVALUATION_SERVICE: Lazy<EvaluationService> = Lazy::new(EvaluationService::new_lazy);

// 创建评估记录
pub async fn create_evaluation(
    req: HttpRequest,
    body: web::Json<CreateEvaluationRequest>,
) -> ActixResult<HttpResponse> {
    EVALUATION_SERVICE
        .create_evaluation(&req, body.into_inner())
        .await
}

// 列出评估记录
pub async fn list_evaluations(
    req: HttpRequest,
    query: web::Query<EvaluationListParams>,
) -> ActixResult<HttpResponse> {
    EVALUATION_SERVICE
        .list_evaluations(&req, query.into_inner())
        .await
}

// 获取评估记录详情
pub async fn get_evaluation(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    EVALUATION_SERVICE.get_evaluation(&req, path.0).await
}

// 提交自评
pub async fn submit_self_evaluation(
    req: HttpRequest,
    path: SafeIDI64,
    body: web::Json<SubmitSelfEvaluationRequest>,
) -> ActixResult<HttpResponse> {
    EVALUATION_SERVICE
        .submit_self_evaluation(&req, path.0, body.into_inner())
        .await
}

// 提交观察评分
pub async fn submit_observation(
    req: HttpRequest,
    path: SafeIDI64,
    body: web::Json<SubmitObservationRequest>,
) -> ActixResult<HttpResponse> {
    let round = match req
        .match_info()
        .get("round")
        .and_then(|raw| raw.parse::<u8>().ok())
    {
        Some(round) => round,
        None => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::BadRequest,
                "Invalid path parameter: round",
            )));
        }
    };

    EVALUATION_SERVICE
        .submit_observation(&req, path.0, round, body.into_inner())
        .await
}

// 获取评分汇总
pub async fn get_summary(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    EVALUATION_SERVICE.get_summary(&req, path.0).await
}

// 更新观察排期
pub async fn update_schedule(
    req: HttpRequest,
    path: SafeIDI64,
    body: web::Json<UpdateScheduleRequest>,
) -> ActixResult<HttpResponse> {
    EVALUATION_SERVICE
        .update_schedule(&req, path.0, body.into_inner())
        .await
}

// 重新生成 AI 评语
pub async fn regenerate_ai_comment(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    EVALUATION_SERVICE.regenerate_ai_comment(&req, path.0).await
}

// 配置路由
pub fn configure_evaluations_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/evaluations")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    // 列出评估记录 - 所有登录用户可访问（业务层按角色过滤）
                    .route(web::get().to(list_evaluations))
                    // 创建评估记录 - 仅教师本人（业务层校验教学任务）
                    .route(web::post().to(create_evaluation).wrap(RateLimit::creation())),
            )
            .service(
                web::resource("/{id}")
                    // 获取详情 - 本人或管理员（业务层校验归属）
                    .route(web::get().to(get_evaluation)),
            )
            .service(
                web::resource("/{id}/self-evaluation")
                    // 提交自评 - 仅记录所属教师（业务层校验归属）
                    .route(
                        web::post()
                            .to(submit_self_evaluation)
                            .wrap(RateLimit::submission()),
                    ),
            )
            .service(
                web::resource("/{id}/observations/{round}")
                    // 提交观察评分 - 仅管理员
                    .route(
                        web::post()
                            .to(submit_observation)
                            .wrap(RateLimit::submission())
                            .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
                    ),
            )
            .service(
                web::resource("/{id}/summary")
                    // 评分汇总 - 本人或管理员（业务层校验归属）
                    .route(web::get().to(get_summary)),
            )
            .service(
                web::resource("/{id}/schedule")
                    // 更新排期 - 仅管理员
                    .route(
                        web::put()
                            .to(update_schedule)
                            .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
                    ),
            )
            .service(
                web::resource("/{id}/ai-comment")
                    // 重新生成评语 - 仅管理员
                    .route(
                        web::post()
                            .to(regenerate_ai_comment)
                            .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles())),
                    ),
            ),
    );
}
