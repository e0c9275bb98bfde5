use std::collections::HashMap;

use serde::Deserialize;
use ts_rs::TS;

use crate::models::rubrics::entities::RubricCategory;

/// 创建量表模板请求（目前仅启动种子与测试使用，模板编辑器是外部系统）
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/rubric.ts")]
pub struct CreateRubricTemplateRequest {
    pub name: String,
    pub version: i32,
    pub categories: Vec<RubricCategory>,
    pub weights: HashMap<String, f64>,
}
