use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use async_trait::async_trait;
use std::sync::Arc;

use super::EvaluationService;
use crate::errors::Result;
use crate::models::evaluations::entities::EvaluationRecord;
use crate::models::evaluations::scoring::{ScoringSummary, summarize};
use crate::models::{ApiResponse, ErrorCode};

/// 评语生成器，按当前汇总生成整体评语。
/// 生成失败只影响评语字段本身，不会阻断任何状态转移。
#[async_trait]
pub trait CommentGenerator: Send + Sync {
    async fn generate(&self, record: &EvaluationRecord, summary: &ScoringSummary)
    -> Result<String>;
}

/// 默认实现：由汇总数据生成确定性的模板评语，无外部调用。
pub struct TemplateCommentGenerator;

#[async_trait]
impl CommentGenerator for TemplateCommentGenerator {
    async fn generate(
        &self,
        record: &EvaluationRecord,
        summary: &ScoringSummary,
    ) -> Result<String> {
        let mut comment = format!(
            "Prestasi keseluruhan bagi {} ({}) ialah {:.2} mata, tahap {}.",
            record.subject,
            record.class_name,
            summary.overall,
            summary.band.label(),
        );

        // 指出最强与最弱的子类别，给出改进方向
        let strongest = summary.subcategories.iter().max_by(|a, b| {
            a.observation_2
                .weighted
                .total_cmp(&b.observation_2.weighted)
        });
        let weakest = summary.subcategories.iter().min_by(|a, b| {
            a.observation_2
                .weighted
                .total_cmp(&b.observation_2.weighted)
        });
        if let (Some(strongest), Some(weakest)) = (strongest, weakest) {
            if strongest.code != weakest.code {
                comment.push_str(&format!(
                    " Aspek paling kukuh ialah {} manakala aspek {} perlu diberi perhatian.",
                    strongest.code, weakest.code,
                ));
            }
        }

        Ok(comment)
    }
}

/// 重新生成 AI 评语
/// POST /evaluations/{id}/ai-comment
///
/// 路由层已限定管理员角色。评语基于当前汇总重算并缓存到记录上，
/// 可在任何状态下触发。
pub async fn regenerate_ai_comment(
    service: &EvaluationService,
    request: &HttpRequest,
    evaluation_id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

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

    let generator = request
        .app_data::<web::Data<Arc<dyn CommentGenerator>>>()
        .map(|data| data.get_ref().clone());
    let generator: Arc<dyn CommentGenerator> = match generator {
        Some(generator) => generator,
        None => Arc::new(TemplateCommentGenerator),
    };

    let comment = match generator.generate(&record, &summary).await {
        Ok(comment) => comment,
        Err(e) => {
            tracing::warn!("AI comment generation failed for evaluation {evaluation_id}: {e}");
            return Ok(HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                "评语生成失败",
            )));
        }
    };

    if let Err(e) = storage.set_ai_comment(evaluation_id, &comment).await {
        return Ok(super::storage_error_response(&e));
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(comment, "评语已重新生成")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::evaluations::entities::{
        EvaluationStatus, ObservationSection, QuestionSnapshot,
    };
    use std::collections::HashMap;

    fn sample_record() -> EvaluationRecord {
        let now = chrono::Utc::now();
        EvaluationRecord {
            id: 1,
            teacher_id: 10,
            subject: "Matematik".to_string(),
            class_name: "4 Amanah".to_string(),
            period: "2026-S1".to_string(),
            template_id: 1,
            questions_snapshot: vec![QuestionSnapshot {
                question_id: "q1".to_string(),
                text: "Guru merancang PdP".to_string(),
                max_score: 4,
                category_code: Some("4".to_string()),
                sub_category_code: Some("4.1".to_string()),
                score_descriptions: vec![],
            }],
            self_evaluation: ObservationSection::pending(),
            observation_1: ObservationSection::pending(),
            observation_2: ObservationSection::pending(),
            status: EvaluationStatus::PendingSelfEvaluation,
            scheduled_date: None,
            scheduled_time: None,
            observer_name: None,
            notes: None,
            ai_comment: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn template_generator_is_deterministic() {
        let record = sample_record();
        let weights = HashMap::from([("4.1".to_string(), 100.0)]);
        let summary = summarize(&record, &weights);

        let generator = TemplateCommentGenerator;
        let first = generator.generate(&record, &summary).await.unwrap();
        let second = generator.generate(&record, &summary).await.unwrap();
        assert_eq!(first, second);
        assert!(first.contains("Matematik"));
        assert!(first.contains("4 Amanah"));
    }
}
