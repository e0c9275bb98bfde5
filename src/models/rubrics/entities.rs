//! 评估量表（Rubric）模板实体
//!
//! 模板是 类别 → 子类别 → 评分条目 的树形结构，由评估引擎只读消费。
//! 评估记录创建时将树展平为问题快照（见 evaluations::entities），
//! 之后模板的任何修改都不影响已创建的记录。

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 评分等级描述（如 0-4 分每级的行为描述）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/rubric.ts")]
pub struct ScoreDescription {
    pub score: i32,
    pub label: String,
    pub description: String,
}

/// 评分条目（树的叶子）
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/rubric.ts")]
pub struct RubricItem {
    pub id: String,
    pub text: String,
    pub max_score: i32,
    pub score_descriptions: Vec<ScoreDescription>,
}

/// 子类别（如 SKPMg2 标准4 的 4.1、4.2 ...）
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/rubric.ts")]
pub struct RubricSubCategory {
    pub code: String,
    pub name: String,
    pub items: Vec<RubricItem>,
}

/// 类别
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/rubric.ts")]
pub struct RubricCategory {
    pub code: String,
    pub name: String,
    pub sub_categories: Vec<RubricSubCategory>,
}

/// 量表模板（业务实体，structure/weights 以 JSON 存库）
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/rubric.ts")]
pub struct RubricTemplate {
    pub id: i64,
    pub name: String,
    pub version: i32,
    pub categories: Vec<RubricCategory>,
    /// 子类别代码 → 权重，全表权重之和应为 100
    pub weights: HashMap<String, f64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl RubricTemplate {
    /// 校验权重配置：权重之和须为 100（允许浮点误差），
    /// 且每个子类别都有对应权重。
    pub fn validate_weights(&self) -> Result<(), String> {
        let mut sum = 0.0;
        for category in &self.categories {
            for sub in &category.sub_categories {
                match self.weights.get(&sub.code) {
                    Some(w) if *w >= 0.0 => sum += w,
                    Some(w) => return Err(format!("子类别 {} 权重为负: {w}", sub.code)),
                    None => return Err(format!("子类别 {} 缺少权重配置", sub.code)),
                }
            }
        }
        if (sum - 100.0).abs() > 1e-6 {
            return Err(format!("子类别权重之和应为 100，实际为 {sum}"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str) -> RubricItem {
        RubricItem {
            id: id.to_string(),
            text: format!("Item {id}"),
            max_score: 4,
            score_descriptions: vec![],
        }
    }

    fn template(weights: &[(&str, f64)]) -> RubricTemplate {
        RubricTemplate {
            id: 1,
            name: "Standard 4 PdP".to_string(),
            version: 1,
            categories: vec![RubricCategory {
                code: "S4".to_string(),
                name: "Pembelajaran dan Pemudahcaraan".to_string(),
                sub_categories: vec![
                    RubricSubCategory {
                        code: "4.1".to_string(),
                        name: "Guru Sebagai Perancang".to_string(),
                        items: vec![item("q1")],
                    },
                    RubricSubCategory {
                        code: "4.2".to_string(),
                        name: "Guru Sebagai Pengawal".to_string(),
                        items: vec![item("q2")],
                    },
                ],
            }],
            weights: weights
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect(),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_weights_sum_to_100() {
        let tpl = template(&[("4.1", 50.0), ("4.2", 50.0)]);
        assert!(tpl.validate_weights().is_ok());
    }

    #[test]
    fn test_weights_wrong_sum_rejected() {
        let tpl = template(&[("4.1", 50.0), ("4.2", 40.0)]);
        assert!(tpl.validate_weights().is_err());
    }

    #[test]
    fn test_missing_weight_rejected() {
        let tpl = template(&[("4.1", 100.0)]);
        let err = tpl.validate_weights().unwrap_err();
        assert!(err.contains("4.2"));
    }
}
