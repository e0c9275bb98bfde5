use super::SeaOrmStorage;
use crate::entity::rubric_templates::{ActiveModel, Column, Entity as RubricTemplates};
use crate::errors::{EvalSystemError, Result};
use crate::models::rubrics::{entities::RubricTemplate, requests::CreateRubricTemplateRequest};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};

impl SeaOrmStorage {
    /// 通过 ID 获取量表模板
    pub async fn get_rubric_template_impl(&self, id: i64) -> Result<Option<RubricTemplate>> {
        let result = RubricTemplates::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| EvalSystemError::database_operation(format!("查询量表模板失败: {e}")))?;

        result
            .map(|m| m.into_template())
            .transpose()
            .map_err(|e| EvalSystemError::serialization(format!("量表模板 JSON 损坏: {e}")))
    }

    /// 通过名称获取量表模板
    pub async fn get_rubric_template_by_name_impl(
        &self,
        name: &str,
    ) -> Result<Option<RubricTemplate>> {
        let result = RubricTemplates::find()
            .filter(Column::Name.eq(name))
            .one(&self.db)
            .await
            .map_err(|e| EvalSystemError::database_operation(format!("查询量表模板失败: {e}")))?;

        result
            .map(|m| m.into_template())
            .transpose()
            .map_err(|e| EvalSystemError::serialization(format!("量表模板 JSON 损坏: {e}")))
    }

    /// 创建量表模板（启动种子与测试用）
    pub async fn create_rubric_template_impl(
        &self,
        req: CreateRubricTemplateRequest,
    ) -> Result<RubricTemplate> {
        let now = chrono::Utc::now().timestamp();

        let structure = serde_json::to_string(&req.categories)
            .map_err(|e| EvalSystemError::serialization(format!("模板结构序列化失败: {e}")))?;
        let weights = serde_json::to_string(&req.weights)
            .map_err(|e| EvalSystemError::serialization(format!("模板权重序列化失败: {e}")))?;

        let model = ActiveModel {
            name: Set(req.name),
            version: Set(req.version),
            structure: Set(structure),
            weights: Set(weights),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| EvalSystemError::database_operation(format!("创建量表模板失败: {e}")))?;

        result
            .into_template()
            .map_err(|e| EvalSystemError::serialization(format!("量表模板 JSON 损坏: {e}")))
    }
}
