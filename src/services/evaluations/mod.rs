pub mod ai_comment;
pub mod create;
pub mod detail;
pub mod list;
pub mod schedule;
pub mod submit_observation;
pub mod submit_self;
pub mod summary;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::errors::EvalSystemError;
use crate::models::evaluations::requests::{
    CreateEvaluationRequest, EvaluationListParams, SubmitObservationRequest,
    SubmitSelfEvaluationRequest, UpdateScheduleRequest,
};
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;

pub use ai_comment::CommentGenerator;

pub struct EvaluationService {
    storage: Option<Arc<dyn Storage>>,
}

impl EvaluationService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    pub async fn create_evaluation(
        &self,
        request: &HttpRequest,
        req: CreateEvaluationRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_evaluation(self, request, req).await
    }

    pub async fn get_evaluation(
        &self,
        request: &HttpRequest,
        evaluation_id: i64,
    ) -> ActixResult<HttpResponse> {
        detail::get_evaluation(self, request, evaluation_id).await
    }

    pub async fn list_evaluations(
        &self,
        request: &HttpRequest,
        params: EvaluationListParams,
    ) -> ActixResult<HttpResponse> {
        list::list_evaluations(self, request, params).await
    }

    pub async fn submit_self_evaluation(
        &self,
        request: &HttpRequest,
        evaluation_id: i64,
        req: SubmitSelfEvaluationRequest,
    ) -> ActixResult<HttpResponse> {
        submit_self::submit_self_evaluation(self, request, evaluation_id, req).await
    }

    pub async fn submit_observation(
        &self,
        request: &HttpRequest,
        evaluation_id: i64,
        round: u8,
        req: SubmitObservationRequest,
    ) -> ActixResult<HttpResponse> {
        submit_observation::submit_observation(self, request, evaluation_id, round, req).await
    }

    pub async fn get_summary(
        &self,
        request: &HttpRequest,
        evaluation_id: i64,
    ) -> ActixResult<HttpResponse> {
        summary::get_summary(self, request, evaluation_id).await
    }

    pub async fn update_schedule(
        &self,
        request: &HttpRequest,
        evaluation_id: i64,
        req: UpdateScheduleRequest,
    ) -> ActixResult<HttpResponse> {
        schedule::update_schedule(self, request, evaluation_id, req).await
    }

    pub async fn regenerate_ai_comment(
        &self,
        request: &HttpRequest,
        evaluation_id: i64,
    ) -> ActixResult<HttpResponse> {
        ai_comment::regenerate_ai_comment(self, request, evaluation_id).await
    }
}

// 存储层错误到 HTTP 响应的统一映射
pub(crate) fn storage_error_response(e: &EvalSystemError) -> HttpResponse {
    match e {
        EvalSystemError::NotFound(_) => HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::EvaluationNotFound,
            e.message(),
        )),
        EvalSystemError::Conflict(_) => HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::InvalidLifecycleState,
            e.message(),
        )),
        EvalSystemError::Validation(_) => HttpResponse::BadRequest().json(
            ApiResponse::error_empty(ErrorCode::ValidationFailed, e.message()),
        ),
        _ => HttpResponse::InternalServerError().json(ApiResponse::error_empty(
            ErrorCode::InternalServerError,
            e.message(),
        )),
    }
}
