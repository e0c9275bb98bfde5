//! 评估记录聚合与生命周期状态机
//!
//! 一条 EvaluationRecord 对应一个 教师+科目+班级+学段 的完整评估周期
//! （Cerapan）：自评 + 两轮管理员观察。记录创建时将量表模板展平为
//! 问题快照，此后模板的修改不影响已有记录的评分标准。
//!
//! 整体状态不单独维护状态来源：它是三个环节状态的纯函数
//! （`EvaluationStatus::derive`），落库的 status 列只是反规范化的
//! 读优化，每次状态迁移都重新推导并比对。

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::rubrics::entities::{RubricTemplate, ScoreDescription};

/// 整体生命周期状态，单向推进
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub enum EvaluationStatus {
    PendingSelfEvaluation,
    PendingObservation1,
    PendingObservation2,
    Marked,
}

impl EvaluationStatus {
    pub const PENDING_SELF_EVALUATION: &'static str = "pending_self_evaluation";
    pub const PENDING_OBSERVATION_1: &'static str = "pending_observation_1";
    pub const PENDING_OBSERVATION_2: &'static str = "pending_observation_2";
    pub const MARKED: &'static str = "marked";

    /// 从三个环节的状态推导整体状态（唯一事实来源）
    pub fn derive(
        self_evaluation: SectionStatus,
        observation_1: SectionStatus,
        observation_2: SectionStatus,
    ) -> Self {
        match (self_evaluation, observation_1, observation_2) {
            (SectionStatus::Pending, _, _) => EvaluationStatus::PendingSelfEvaluation,
            (SectionStatus::Submitted, SectionStatus::Pending, _) => {
                EvaluationStatus::PendingObservation1
            }
            (SectionStatus::Submitted, SectionStatus::Submitted, SectionStatus::Pending) => {
                EvaluationStatus::PendingObservation2
            }
            (SectionStatus::Submitted, SectionStatus::Submitted, SectionStatus::Submitted) => {
                EvaluationStatus::Marked
            }
        }
    }

    /// 成功提交后进入的下一个状态
    pub fn next(self) -> Option<Self> {
        match self {
            EvaluationStatus::PendingSelfEvaluation => Some(EvaluationStatus::PendingObservation1),
            EvaluationStatus::PendingObservation1 => Some(EvaluationStatus::PendingObservation2),
            EvaluationStatus::PendingObservation2 => Some(EvaluationStatus::Marked),
            EvaluationStatus::Marked => None,
        }
    }
}

impl std::fmt::Display for EvaluationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EvaluationStatus::PendingSelfEvaluation => Self::PENDING_SELF_EVALUATION,
            EvaluationStatus::PendingObservation1 => Self::PENDING_OBSERVATION_1,
            EvaluationStatus::PendingObservation2 => Self::PENDING_OBSERVATION_2,
            EvaluationStatus::Marked => Self::MARKED,
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for EvaluationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            Self::PENDING_SELF_EVALUATION => Ok(EvaluationStatus::PendingSelfEvaluation),
            Self::PENDING_OBSERVATION_1 => Ok(EvaluationStatus::PendingObservation1),
            Self::PENDING_OBSERVATION_2 => Ok(EvaluationStatus::PendingObservation2),
            Self::MARKED => Ok(EvaluationStatus::Marked),
            _ => Err(format!("Invalid evaluation status: {s}")),
        }
    }
}

/// 单个环节的状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub enum SectionStatus {
    Pending,
    Submitted,
}

/// 观察轮次（第一轮 / 第二轮）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObservationRound {
    First,
    Second,
}

impl ObservationRound {
    pub fn from_number(round: u8) -> Option<Self> {
        match round {
            1 => Some(ObservationRound::First),
            2 => Some(ObservationRound::Second),
            _ => None,
        }
    }

    /// 该轮次允许提交时记录必须处于的整体状态
    pub fn required_status(self) -> EvaluationStatus {
        match self {
            ObservationRound::First => EvaluationStatus::PendingObservation1,
            ObservationRound::Second => EvaluationStatus::PendingObservation2,
        }
    }
}

impl std::fmt::Display for ObservationRound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObservationRound::First => write!(f, "1"),
            ObservationRound::Second => write!(f, "2"),
        }
    }
}

/// 冻结的问题快照条目
///
/// 创建记录时从模板深拷贝而来，score_descriptions 为副本而非引用。
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct QuestionSnapshot {
    pub question_id: String,
    pub text: String,
    pub max_score: i32,
    pub category_code: Option<String>,
    pub sub_category_code: Option<String>,
    pub score_descriptions: Vec<ScoreDescription>,
}

impl QuestionSnapshot {
    /// 将模板的 类别→子类别→条目 树展平为有序快照，
    /// 每个叶子条目一条，类别/子类别代码取自其祖先
    pub fn flatten_template(template: &RubricTemplate) -> Vec<QuestionSnapshot> {
        let mut snapshot = Vec::new();
        for category in &template.categories {
            for sub in &category.sub_categories {
                for item in &sub.items {
                    snapshot.push(QuestionSnapshot {
                        question_id: item.id.clone(),
                        text: item.text.clone(),
                        max_score: item.max_score,
                        category_code: Some(category.code.clone()),
                        sub_category_code: Some(sub.code.clone()),
                        score_descriptions: item.score_descriptions.clone(),
                    });
                }
            }
        }
        snapshot
    }
}

/// 自评答案：教师为每个问题选择一个评分等级（字符串编码的分值）
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct SelfEvaluationAnswer {
    pub question_id: String,
    pub answer: String,
}

/// 观察评分：管理员为每个问题打分（0..=max_score），可附评语
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct ObservationMark {
    pub question_id: String,
    pub mark: i32,
    pub comment: Option<String>,
}

/// 嵌入评估记录的观察环节子文档
///
/// 自评环节填 answers，观察环节填 marks 与 administrator_id。
/// 一经提交（status = Submitted）即不可变，重复提交被拒绝而非覆盖。
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct ObservationSection {
    pub status: SectionStatus,
    pub submitted_at: Option<chrono::DateTime<chrono::Utc>>,
    pub administrator_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub answers: Vec<SelfEvaluationAnswer>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub marks: Vec<ObservationMark>,
}

impl ObservationSection {
    pub fn pending() -> Self {
        Self {
            status: SectionStatus::Pending,
            submitted_at: None,
            administrator_id: None,
            answers: Vec::new(),
            marks: Vec::new(),
        }
    }

    pub fn is_submitted(&self) -> bool {
        self.status == SectionStatus::Submitted
    }
}

/// 评估记录聚合根
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct EvaluationRecord {
    pub id: i64,
    pub teacher_id: i64,
    pub subject: String,
    pub class_name: String,
    pub period: String,
    pub template_id: i64,
    pub questions_snapshot: Vec<QuestionSnapshot>,
    pub self_evaluation: ObservationSection,
    pub observation_1: ObservationSection,
    pub observation_2: ObservationSection,
    pub status: EvaluationStatus,
    pub scheduled_date: Option<String>,
    pub scheduled_time: Option<String>,
    pub observer_name: Option<String>,
    pub notes: Option<String>,
    pub ai_comment: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl EvaluationRecord {
    /// 从环节状态重新推导整体状态
    pub fn derived_status(&self) -> EvaluationStatus {
        EvaluationStatus::derive(
            self.self_evaluation.status,
            self.observation_1.status,
            self.observation_2.status,
        )
    }

    /// 落库的反规范化 status 与推导值是否一致（测试与迁移断言用）
    pub fn status_is_consistent(&self) -> bool {
        self.status == self.derived_status()
    }

    /// 第一轮观察是否可开始：已排期且第一轮尚未提交
    pub fn can_start_observation_1(&self) -> bool {
        self.scheduled_date.is_some() && !self.observation_1.is_submitted()
    }

    /// 第二轮观察是否可开始：第一轮已提交且第二轮尚未提交
    pub fn can_start_observation_2(&self) -> bool {
        self.observation_1.is_submitted() && !self.observation_2.is_submitted()
    }

    pub fn section_for_round(&self, round: ObservationRound) -> &ObservationSection {
        match round {
            ObservationRound::First => &self.observation_1,
            ObservationRound::Second => &self.observation_2,
        }
    }
}

/// 校验自评答案集合：每个快照问题恰好一个答案、无未知问题、
/// 答案为该问题评分等级中的合法分值
pub fn validate_self_answers(
    snapshot: &[QuestionSnapshot],
    answers: &[SelfEvaluationAnswer],
) -> Result<(), String> {
    let mut seen = std::collections::HashSet::new();
    for answer in answers {
        let question = snapshot
            .iter()
            .find(|q| q.question_id == answer.question_id)
            .ok_or_else(|| format!("未知的问题: {}", answer.question_id))?;

        if !seen.insert(answer.question_id.as_str()) {
            return Err(format!("问题 {} 被重复作答", answer.question_id));
        }

        let score: i32 = answer
            .answer
            .parse()
            .map_err(|_| format!("问题 {} 的答案不是合法分值: {}", question.question_id, answer.answer))?;

        if score < 0 || score > question.max_score {
            return Err(format!(
                "问题 {} 的分值 {} 超出范围 0..={}",
                question.question_id, score, question.max_score
            ));
        }

        // 快照携带评分等级描述时，答案必须命中其中一级
        if !question.score_descriptions.is_empty()
            && !question.score_descriptions.iter().any(|d| d.score == score)
        {
            return Err(format!(
                "问题 {} 的分值 {} 不在评分等级中",
                question.question_id, score
            ));
        }
    }

    // 全部条目必答
    for question in snapshot {
        if !seen.contains(question.question_id.as_str()) {
            return Err(format!("问题 {} 缺少答案", question.question_id));
        }
    }

    Ok(())
}

/// 校验观察评分集合：每个快照问题恰好一个评分、无未知问题、
/// 评分落在该条目自身的 0..=max_score 内（上界来自条目，不是固定常量）
pub fn validate_marks(
    snapshot: &[QuestionSnapshot],
    marks: &[ObservationMark],
) -> Result<(), String> {
    let mut seen = std::collections::HashSet::new();
    for mark in marks {
        let question = snapshot
            .iter()
            .find(|q| q.question_id == mark.question_id)
            .ok_or_else(|| format!("未知的问题: {}", mark.question_id))?;

        if !seen.insert(mark.question_id.as_str()) {
            return Err(format!("问题 {} 被重复评分", mark.question_id));
        }

        if mark.mark < 0 || mark.mark > question.max_score {
            return Err(format!(
                "问题 {} 的评分 {} 超出范围 0..={}",
                question.question_id, mark.mark, question.max_score
            ));
        }
    }

    for question in snapshot {
        if !seen.contains(question.question_id.as_str()) {
            return Err(format!("问题 {} 缺少评分", question.question_id));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::rubrics::entities::{RubricCategory, RubricItem, RubricSubCategory};

    fn snapshot_question(id: &str, max_score: i32) -> QuestionSnapshot {
        QuestionSnapshot {
            question_id: id.to_string(),
            text: format!("Question {id}"),
            max_score,
            category_code: Some("S4".to_string()),
            sub_category_code: Some("4.1".to_string()),
            score_descriptions: vec![],
        }
    }

    fn record_with_sections(
        self_eval: SectionStatus,
        obs1: SectionStatus,
        obs2: SectionStatus,
    ) -> EvaluationRecord {
        let section = |status: SectionStatus| ObservationSection {
            status,
            submitted_at: None,
            administrator_id: None,
            answers: Vec::new(),
            marks: Vec::new(),
        };
        EvaluationRecord {
            id: 1,
            teacher_id: 10,
            subject: "Matematik".to_string(),
            class_name: "5 Amanah".to_string(),
            period: "2025-S1".to_string(),
            template_id: 1,
            questions_snapshot: vec![snapshot_question("q1", 4)],
            self_evaluation: section(self_eval),
            observation_1: section(obs1),
            observation_2: section(obs2),
            status: EvaluationStatus::derive(self_eval, obs1, obs2),
            scheduled_date: None,
            scheduled_time: None,
            observer_name: None,
            notes: None,
            ai_comment: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_derive_status_follows_section_order() {
        use SectionStatus::*;
        assert_eq!(
            EvaluationStatus::derive(Pending, Pending, Pending),
            EvaluationStatus::PendingSelfEvaluation
        );
        assert_eq!(
            EvaluationStatus::derive(Submitted, Pending, Pending),
            EvaluationStatus::PendingObservation1
        );
        assert_eq!(
            EvaluationStatus::derive(Submitted, Submitted, Pending),
            EvaluationStatus::PendingObservation2
        );
        assert_eq!(
            EvaluationStatus::derive(Submitted, Submitted, Submitted),
            EvaluationStatus::Marked
        );
    }

    #[test]
    fn test_status_next_is_one_directional() {
        assert_eq!(
            EvaluationStatus::PendingSelfEvaluation.next(),
            Some(EvaluationStatus::PendingObservation1)
        );
        assert_eq!(
            EvaluationStatus::PendingObservation2.next(),
            Some(EvaluationStatus::Marked)
        );
        assert_eq!(EvaluationStatus::Marked.next(), None);
    }

    #[test]
    fn test_status_string_round_trip() {
        for status in [
            EvaluationStatus::PendingSelfEvaluation,
            EvaluationStatus::PendingObservation1,
            EvaluationStatus::PendingObservation2,
            EvaluationStatus::Marked,
        ] {
            assert_eq!(status.to_string().parse::<EvaluationStatus>(), Ok(status));
        }
        assert!("bogus".parse::<EvaluationStatus>().is_err());
    }

    #[test]
    fn test_round_required_status() {
        assert_eq!(
            ObservationRound::First.required_status(),
            EvaluationStatus::PendingObservation1
        );
        assert_eq!(
            ObservationRound::Second.required_status(),
            EvaluationStatus::PendingObservation2
        );
        assert_eq!(ObservationRound::from_number(3), None);
    }

    #[test]
    fn test_flatten_template_carries_ancestry_and_copies() {
        let mut template = RubricTemplate {
            id: 1,
            name: "Standard 4 PdP".to_string(),
            version: 1,
            categories: vec![RubricCategory {
                code: "S4".to_string(),
                name: "PdP".to_string(),
                sub_categories: vec![RubricSubCategory {
                    code: "4.1".to_string(),
                    name: "Perancang".to_string(),
                    items: vec![RubricItem {
                        id: "q1".to_string(),
                        text: "Menyediakan RPH".to_string(),
                        max_score: 4,
                        score_descriptions: vec![ScoreDescription {
                            score: 4,
                            label: "Cemerlang".to_string(),
                            description: "Lengkap".to_string(),
                        }],
                    }],
                }],
            }],
            weights: [("4.1".to_string(), 100.0)].into_iter().collect(),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };

        let snapshot = QuestionSnapshot::flatten_template(&template);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].category_code.as_deref(), Some("S4"));
        assert_eq!(snapshot[0].sub_category_code.as_deref(), Some("4.1"));

        // 快照是深拷贝：修改模板不影响已展平的快照
        template.categories[0].sub_categories[0].items[0].score_descriptions.clear();
        assert_eq!(snapshot[0].score_descriptions.len(), 1);
    }

    #[test]
    fn test_validate_self_answers_all_mandatory() {
        let snapshot = vec![snapshot_question("q1", 4), snapshot_question("q2", 4)];
        let partial = vec![SelfEvaluationAnswer {
            question_id: "q1".to_string(),
            answer: "4".to_string(),
        }];
        let err = validate_self_answers(&snapshot, &partial).unwrap_err();
        assert!(err.contains("q2"));
    }

    #[test]
    fn test_validate_self_answers_unknown_question() {
        let snapshot = vec![snapshot_question("q1", 4)];
        let answers = vec![
            SelfEvaluationAnswer {
                question_id: "q1".to_string(),
                answer: "3".to_string(),
            },
            SelfEvaluationAnswer {
                question_id: "zzz".to_string(),
                answer: "3".to_string(),
            },
        ];
        assert!(validate_self_answers(&snapshot, &answers).is_err());
    }

    #[test]
    fn test_validate_self_answers_score_level_must_exist() {
        let mut question = snapshot_question("q1", 4);
        question.score_descriptions = vec![ScoreDescription {
            score: 4,
            label: "Cemerlang".to_string(),
            description: String::new(),
        }];
        let answers = vec![SelfEvaluationAnswer {
            question_id: "q1".to_string(),
            answer: "3".to_string(),
        }];
        assert!(validate_self_answers(&[question], &answers).is_err());
    }

    #[test]
    fn test_validate_marks_bound_is_per_item_max_score() {
        // 条目上界是 max_score=3，评 4 分必须被拒绝（不存在全局的 5 分上限）
        let snapshot = vec![snapshot_question("q1", 3)];
        let too_high = vec![ObservationMark {
            question_id: "q1".to_string(),
            mark: 4,
            comment: None,
        }];
        assert!(validate_marks(&snapshot, &too_high).is_err());

        let ok = vec![ObservationMark {
            question_id: "q1".to_string(),
            mark: 3,
            comment: Some("Baik".to_string()),
        }];
        assert!(validate_marks(&snapshot, &ok).is_ok());
    }

    #[test]
    fn test_validate_marks_rejects_negative() {
        let snapshot = vec![snapshot_question("q1", 4)];
        let marks = vec![ObservationMark {
            question_id: "q1".to_string(),
            mark: -1,
            comment: None,
        }];
        assert!(validate_marks(&snapshot, &marks).is_err());
    }

    #[test]
    fn test_startability_predicates() {
        use SectionStatus::*;

        let mut record = record_with_sections(Submitted, Pending, Pending);
        assert!(!record.can_start_observation_1()); // 未排期
        record.scheduled_date = Some("2025-08-10".to_string());
        assert!(record.can_start_observation_1());
        assert!(!record.can_start_observation_2()); // 第一轮未提交

        let mut record = record_with_sections(Submitted, Submitted, Pending);
        record.scheduled_date = Some("2025-08-10".to_string());
        assert!(!record.can_start_observation_1()); // 第一轮已提交
        assert!(record.can_start_observation_2());

        let record = record_with_sections(Submitted, Submitted, Submitted);
        assert!(!record.can_start_observation_2()); // 已结束
    }

    #[test]
    fn test_status_consistency_check() {
        use SectionStatus::*;
        let mut record = record_with_sections(Submitted, Pending, Pending);
        assert!(record.status_is_consistent());
        record.status = EvaluationStatus::Marked;
        assert!(!record.status_is_consistent());
    }
}
