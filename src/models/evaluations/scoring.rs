//! 加权评分引擎
//!
//! 纯函数：输入评估记录（冻结快照 + 三个环节）与子类别权重表，
//! 输出评分摘要。不做持久化，不回查在库模板，同一记录状态下
//! 重复计算结果逐字节一致。
//!
//! 公式：子类别加权得分 = weight * raw_sum / max_sum；
//! 单轮总分 = 各子类别加权得分之和，夹取到 [0,100]；
//! 总评 = 三轮总分的算术平均（tri-average）。所有百分比保留两位小数。

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::evaluations::entities::{EvaluationRecord, ObservationSection, QuestionSnapshot};

/// 总评四级评语档位，阈值全局唯一定义
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/scoring.ts")]
pub enum PerformanceBand {
    Cemerlang,
    Baik,
    Sederhana,
    TidakMemuaskan,
}

impl PerformanceBand {
    /// 档位边界：[90,100] Cemerlang，[75,90) Baik，[50,75) Sederhana，其余 Tidak Memuaskan
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            PerformanceBand::Cemerlang
        } else if score >= 75.0 {
            PerformanceBand::Baik
        } else if score >= 50.0 {
            PerformanceBand::Sederhana
        } else {
            PerformanceBand::TidakMemuaskan
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PerformanceBand::Cemerlang => "Cemerlang",
            PerformanceBand::Baik => "Baik",
            PerformanceBand::Sederhana => "Sederhana",
            PerformanceBand::TidakMemuaskan => "Tidak Memuaskan",
        }
    }
}

impl std::fmt::Display for PerformanceBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// 某子类别在单轮中的得分
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/scoring.ts")]
pub struct RoundScore {
    /// 该轮原始分之和；环节未提交时为 0
    pub raw_sum: i32,
    /// 该子类别满分之和（来自快照的 max_score）
    pub max_sum: i32,
    /// 原始百分比 raw_sum / max_sum * 100，两位小数
    pub percentage: f64,
    /// 加权得分 weight * raw_sum / max_sum，两位小数
    pub weighted: f64,
}

/// 单个子类别的三轮得分
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/scoring.ts")]
pub struct SubcategoryScore {
    pub code: String,
    pub weight: f64,
    pub self_evaluation: RoundScore,
    pub observation_1: RoundScore,
    pub observation_2: RoundScore,
}

/// 三轮的加权总分（各自夹取到 [0,100]）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/scoring.ts")]
pub struct RoundTotals {
    pub self_evaluation: f64,
    pub observation_1: f64,
    pub observation_2: f64,
}

/// 评分摘要值对象，供报表等下游消费
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/scoring.ts")]
pub struct ScoringSummary {
    pub evaluation_id: i64,
    pub subcategories: Vec<SubcategoryScore>,
    pub totals: RoundTotals,
    /// 三轮总分的算术平均
    pub overall: f64,
    pub band: PerformanceBand,
}

fn round_2dp(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn clamp_0_100(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

/// 从已提交环节中取出某问题的分值；环节未提交时记 0
fn score_for_question(section: &ObservationSection, question_id: &str) -> i32 {
    if !section.is_submitted() {
        return 0;
    }
    if let Some(mark) = section.marks.iter().find(|m| m.question_id == question_id) {
        return mark.mark;
    }
    section
        .answers
        .iter()
        .find(|a| a.question_id == question_id)
        .and_then(|a| a.answer.parse().ok())
        .unwrap_or(0)
}

fn round_score(
    section: &ObservationSection,
    questions: &[&QuestionSnapshot],
    weight: f64,
) -> RoundScore {
    let max_sum: i32 = questions.iter().map(|q| q.max_score).sum();
    let raw_sum: i32 = questions
        .iter()
        .map(|q| score_for_question(section, &q.question_id))
        .sum();

    // 空子类别不报错，按 0 计
    let (percentage, weighted) = if max_sum > 0 {
        let ratio = f64::from(raw_sum) / f64::from(max_sum);
        (round_2dp(ratio * 100.0), round_2dp(ratio * weight))
    } else {
        (0.0, 0.0)
    };

    RoundScore {
        raw_sum,
        max_sum,
        percentage,
        weighted,
    }
}

/// 计算整份评分摘要
///
/// `weights` 为子类别代码到权重的映射（全量表内权重之和为 100），
/// 快照中出现但权重表缺失的子类别按权重 0 计入。
pub fn summarize(record: &EvaluationRecord, weights: &HashMap<String, f64>) -> ScoringSummary {
    // 按快照首次出现顺序收集子类别，保证输出有序且可复现
    let mut codes: Vec<String> = Vec::new();
    for question in &record.questions_snapshot {
        let code = question
            .sub_category_code
            .clone()
            .unwrap_or_else(|| "_".to_string());
        if !codes.contains(&code) {
            codes.push(code);
        }
    }

    let mut subcategories = Vec::with_capacity(codes.len());
    for code in codes {
        let questions: Vec<&QuestionSnapshot> = record
            .questions_snapshot
            .iter()
            .filter(|q| q.sub_category_code.as_deref().unwrap_or("_") == code)
            .collect();
        let weight = weights.get(&code).copied().unwrap_or(0.0);

        subcategories.push(SubcategoryScore {
            self_evaluation: round_score(&record.self_evaluation, &questions, weight),
            observation_1: round_score(&record.observation_1, &questions, weight),
            observation_2: round_score(&record.observation_2, &questions, weight),
            code,
            weight,
        });
    }

    let total = |pick: fn(&SubcategoryScore) -> f64| {
        round_2dp(clamp_0_100(subcategories.iter().map(pick).sum()))
    };
    let totals = RoundTotals {
        self_evaluation: total(|s| s.self_evaluation.weighted),
        observation_1: total(|s| s.observation_1.weighted),
        observation_2: total(|s| s.observation_2.weighted),
    };

    let overall = round_2dp(
        (totals.self_evaluation + totals.observation_1 + totals.observation_2) / 3.0,
    );

    ScoringSummary {
        evaluation_id: record.id,
        subcategories,
        totals,
        band: PerformanceBand::from_score(overall),
        overall,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::evaluations::entities::{
        EvaluationStatus, ObservationMark, SectionStatus, SelfEvaluationAnswer,
    };

    fn question(id: &str, sub: &str, max_score: i32) -> QuestionSnapshot {
        QuestionSnapshot {
            question_id: id.to_string(),
            text: format!("Item {id}"),
            max_score,
            category_code: Some("S4".to_string()),
            sub_category_code: Some(sub.to_string()),
            score_descriptions: vec![],
        }
    }

    fn submitted_answers(pairs: &[(&str, i32)]) -> ObservationSection {
        ObservationSection {
            status: SectionStatus::Submitted,
            submitted_at: Some(chrono::Utc::now()),
            administrator_id: None,
            answers: pairs
                .iter()
                .map(|(id, score)| SelfEvaluationAnswer {
                    question_id: id.to_string(),
                    answer: score.to_string(),
                })
                .collect(),
            marks: Vec::new(),
        }
    }

    fn submitted_marks(pairs: &[(&str, i32)]) -> ObservationSection {
        ObservationSection {
            status: SectionStatus::Submitted,
            submitted_at: Some(chrono::Utc::now()),
            administrator_id: Some(99),
            answers: Vec::new(),
            marks: pairs
                .iter()
                .map(|(id, mark)| ObservationMark {
                    question_id: id.to_string(),
                    mark: *mark,
                    comment: None,
                })
                .collect(),
        }
    }

    /// 2 个子类别各权重 50，各含 2 个满分 4 的条目
    fn scenario_record(
        self_eval: ObservationSection,
        obs1: ObservationSection,
        obs2: ObservationSection,
    ) -> (EvaluationRecord, HashMap<String, f64>) {
        let status = EvaluationStatus::derive(self_eval.status, obs1.status, obs2.status);
        let record = EvaluationRecord {
            id: 7,
            teacher_id: 10,
            subject: "Matematik".to_string(),
            class_name: "5 Amanah".to_string(),
            period: "2025-S1".to_string(),
            template_id: 1,
            questions_snapshot: vec![
                question("q1", "4.1", 4),
                question("q2", "4.1", 4),
                question("q3", "4.2", 4),
                question("q4", "4.2", 4),
            ],
            self_evaluation: self_eval,
            observation_1: obs1,
            observation_2: obs2,
            status,
            scheduled_date: None,
            scheduled_time: None,
            observer_name: None,
            notes: None,
            ai_comment: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        let weights = [("4.1".to_string(), 50.0), ("4.2".to_string(), 50.0)]
            .into_iter()
            .collect();
        (record, weights)
    }

    #[test]
    fn test_full_cycle_tri_average() {
        let (record, weights) = scenario_record(
            submitted_answers(&[("q1", 4), ("q2", 4), ("q3", 4), ("q4", 4)]),
            submitted_marks(&[("q1", 2), ("q2", 2), ("q3", 2), ("q4", 2)]),
            submitted_marks(&[("q1", 3), ("q2", 3), ("q3", 3), ("q4", 3)]),
        );
        let summary = summarize(&record, &weights);

        assert_eq!(summary.totals.self_evaluation, 100.00);
        assert_eq!(summary.totals.observation_1, 50.00);
        assert_eq!(summary.totals.observation_2, 75.00);
        assert_eq!(summary.overall, 75.00);
        assert_eq!(summary.band, PerformanceBand::Baik);

        // 满分自评下每个子类别的原始百分比都是 100
        for sub in &summary.subcategories {
            assert_eq!(sub.self_evaluation.percentage, 100.00);
        }
    }

    #[test]
    fn test_pending_sections_contribute_zero() {
        let (record, weights) = scenario_record(
            submitted_answers(&[("q1", 4), ("q2", 4), ("q3", 4), ("q4", 4)]),
            ObservationSection::pending(),
            ObservationSection::pending(),
        );
        let summary = summarize(&record, &weights);

        assert_eq!(summary.totals.self_evaluation, 100.00);
        assert_eq!(summary.totals.observation_1, 0.00);
        assert_eq!(summary.totals.observation_2, 0.00);
        assert_eq!(summary.overall, round_2dp(100.0 / 3.0));
    }

    #[test]
    fn test_determinism() {
        let (record, weights) = scenario_record(
            submitted_answers(&[("q1", 3), ("q2", 2), ("q3", 4), ("q4", 1)]),
            submitted_marks(&[("q1", 2), ("q2", 2), ("q3", 3), ("q4", 4)]),
            ObservationSection::pending(),
        );
        let first = summarize(&record, &weights);
        let second = summarize(&record, &weights);
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_missing_weight_counts_as_zero() {
        let (record, _) = scenario_record(
            submitted_answers(&[("q1", 4), ("q2", 4), ("q3", 4), ("q4", 4)]),
            ObservationSection::pending(),
            ObservationSection::pending(),
        );
        let weights = [("4.1".to_string(), 50.0)].into_iter().collect();
        let summary = summarize(&record, &weights);

        assert_eq!(summary.totals.self_evaluation, 50.00);
        let missing = summary.subcategories.iter().find(|s| s.code == "4.2").unwrap();
        assert_eq!(missing.weight, 0.0);
        assert_eq!(missing.self_evaluation.weighted, 0.0);
        // 原始百分比不受权重影响
        assert_eq!(missing.self_evaluation.percentage, 100.00);
    }

    #[test]
    fn test_band_boundaries() {
        assert_eq!(PerformanceBand::from_score(100.0), PerformanceBand::Cemerlang);
        assert_eq!(PerformanceBand::from_score(90.0), PerformanceBand::Cemerlang);
        assert_eq!(PerformanceBand::from_score(89.99), PerformanceBand::Baik);
        assert_eq!(PerformanceBand::from_score(75.0), PerformanceBand::Baik);
        assert_eq!(PerformanceBand::from_score(74.99), PerformanceBand::Sederhana);
        assert_eq!(PerformanceBand::from_score(50.0), PerformanceBand::Sederhana);
        assert_eq!(
            PerformanceBand::from_score(49.99),
            PerformanceBand::TidakMemuaskan
        );
        assert_eq!(PerformanceBand::from_score(0.0), PerformanceBand::TidakMemuaskan);
    }

    #[test]
    fn test_rounding_two_decimals() {
        // 3 个条目满分 3，得 [1,1,1]：3/9 = 33.333…，权重 100 → 33.33
        let record = EvaluationRecord {
            id: 1,
            teacher_id: 1,
            subject: "Sains".to_string(),
            class_name: "4 Bestari".to_string(),
            period: "2025-S1".to_string(),
            template_id: 1,
            questions_snapshot: vec![
                question("a", "4.1", 3),
                question("b", "4.1", 3),
                question("c", "4.1", 3),
            ],
            self_evaluation: submitted_answers(&[("a", 1), ("b", 1), ("c", 1)]),
            observation_1: ObservationSection::pending(),
            observation_2: ObservationSection::pending(),
            status: EvaluationStatus::PendingObservation1,
            scheduled_date: None,
            scheduled_time: None,
            observer_name: None,
            notes: None,
            ai_comment: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        let weights = [("4.1".to_string(), 100.0)].into_iter().collect();
        let summary = summarize(&record, &weights);
        // 3/9 = 33.333… → 33.33
        assert_eq!(summary.totals.self_evaluation, 33.33);
        assert_eq!(summary.subcategories[0].self_evaluation.percentage, 33.33);
    }
}
