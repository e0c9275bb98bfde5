use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::evaluations::requests::AvailableAssignmentsParams;
use crate::services::AssignmentService;

// 懒加载的全局 AssignmentService 实例
static ASSIGNMENT_SERVICE: Lazy<AssignmentService> = Lazy::new(AssignmentService::new_lazy);

// 列出当前教师可发起评估的组合
pub async fn list_available_assignments(
    req: HttpRequest,
    query: web::Query<AvailableAssignmentsParams>,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE
        .list_available_assignments(&req, query.into_inner())
        .await
}

// 配置路由
pub fn configure_assignments_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/assignments")
            .wrap(middlewares::RequireJWT)
            .service(web::resource("/available").route(web::get().to(list_available_assignments))),
    );
}
