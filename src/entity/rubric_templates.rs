//! 评估量表模板实体
//!
//! structure 列存放 类别→子类别→条目 树的 JSON，weights 列存放
//! 子类别权重映射的 JSON。模板对评估引擎只读。

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "rubric_templates")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub version: i32,
    #[sea_orm(column_type = "Text")]
    pub structure: String,
    #[sea_orm(column_type = "Text")]
    pub weights: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::evaluations::Entity")]
    Evaluations,
}

impl Related<super::evaluations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Evaluations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// 反序列化为业务模型；JSON 列损坏视为数据错误上抛
    pub fn into_template(
        self,
    ) -> Result<crate::models::rubrics::entities::RubricTemplate, serde_json::Error> {
        use chrono::{DateTime, Utc};

        let categories = serde_json::from_str(&self.structure)?;
        let weights = serde_json::from_str(&self.weights)?;
        Ok(crate::models::rubrics::entities::RubricTemplate {
            id: self.id,
            name: self.name,
            version: self.version,
            categories,
            weights,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
            updated_at: DateTime::<Utc>::from_timestamp(self.updated_at, 0).unwrap_or_default(),
        })
    }
}
