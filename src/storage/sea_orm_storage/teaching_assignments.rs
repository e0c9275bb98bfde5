use super::SeaOrmStorage;
use crate::entity::teaching_assignments::{Column, Entity as TeachingAssignments};
use crate::errors::{EvalSystemError, Result};
use crate::models::assignments::entities::TeachingAssignment;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};

impl SeaOrmStorage {
    /// 列出教师在某学段的活跃教学任务
    pub async fn list_active_assignments_impl(
        &self,
        teacher_id: i64,
        period: &str,
    ) -> Result<Vec<TeachingAssignment>> {
        let rows = TeachingAssignments::find()
            .filter(Column::TeacherId.eq(teacher_id))
            .filter(Column::Period.eq(period))
            .filter(Column::Active.eq(true))
            .order_by_asc(Column::Subject)
            .order_by_asc(Column::ClassName)
            .all(&self.db)
            .await
            .map_err(|e| EvalSystemError::database_operation(format!("查询教学任务失败: {e}")))?;

        Ok(rows.into_iter().map(|m| m.into_assignment()).collect())
    }
}
