use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建用户表
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::Role).string().not_null())
                    .col(ColumnDef::new(Users::Status).string().not_null())
                    .col(ColumnDef::new(Users::DisplayName).string().null())
                    .col(ColumnDef::new(Users::LastLogin).big_integer().null())
                    .col(ColumnDef::new(Users::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Users::UpdatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // 创建评估量表模板表（只读目录，评估创建时快照）
        manager
            .create_table(
                Table::create()
                    .table(RubricTemplates::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RubricTemplates::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(RubricTemplates::Name).string().not_null())
                    .col(
                        ColumnDef::new(RubricTemplates::Version)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RubricTemplates::Structure)
                            .text()
                            .not_null(),
                    )
                    .col(ColumnDef::new(RubricTemplates::Weights).text().not_null())
                    .col(
                        ColumnDef::new(RubricTemplates::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RubricTemplates::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建教学任务表（外部协作数据，AssignmentGate 的数据来源）
        manager
            .create_table(
                Table::create()
                    .table(TeachingAssignments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TeachingAssignments::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TeachingAssignments::TeacherId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TeachingAssignments::Subject)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TeachingAssignments::ClassName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TeachingAssignments::Period)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TeachingAssignments::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(TeachingAssignments::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TeachingAssignments::Table, TeachingAssignments::TeacherId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建评估记录表（聚合根：快照 + 三个观察环节内嵌为 JSON 子文档）
        manager
            .create_table(
                Table::create()
                    .table(Evaluations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Evaluations::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Evaluations::TeacherId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Evaluations::Subject).string().not_null())
                    .col(ColumnDef::new(Evaluations::ClassName).string().not_null())
                    .col(ColumnDef::new(Evaluations::Period).string().not_null())
                    .col(
                        ColumnDef::new(Evaluations::TemplateId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Evaluations::QuestionsSnapshot)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Evaluations::SelfEvaluation)
                            .text()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Evaluations::Observation1).text().not_null())
                    .col(ColumnDef::new(Evaluations::Observation2).text().not_null())
                    .col(ColumnDef::new(Evaluations::Status).string().not_null())
                    .col(ColumnDef::new(Evaluations::ScheduledDate).string().null())
                    .col(ColumnDef::new(Evaluations::ScheduledTime).string().null())
                    .col(ColumnDef::new(Evaluations::ObserverName).string().null())
                    .col(ColumnDef::new(Evaluations::Notes).text().null())
                    .col(ColumnDef::new(Evaluations::AiComment).text().null())
                    .col(
                        ColumnDef::new(Evaluations::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Evaluations::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Evaluations::Table, Evaluations::TeacherId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Evaluations::Table, Evaluations::TemplateId)
                            .to(RubricTemplates::Table, RubricTemplates::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // 同一 教师+科目+班级+学段 只允许一条评估记录，由数据库唯一索引原子保证
        manager
            .create_index(
                Index::create()
                    .name("idx_evaluations_teacher_subject_class_period")
                    .table(Evaluations::Table)
                    .col(Evaluations::TeacherId)
                    .col(Evaluations::Subject)
                    .col(Evaluations::ClassName)
                    .col(Evaluations::Period)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 查询加速：按状态列出待处理评估
        manager
            .create_index(
                Index::create()
                    .name("idx_evaluations_status")
                    .table(Evaluations::Table)
                    .col(Evaluations::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_teaching_assignments_teacher_period")
                    .table(TeachingAssignments::Table)
                    .col(TeachingAssignments::TeacherId)
                    .col(TeachingAssignments::Period)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Evaluations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TeachingAssignments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RubricTemplates::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    Email,
    PasswordHash,
    Role,
    Status,
    DisplayName,
    LastLogin,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum RubricTemplates {
    Table,
    Id,
    Name,
    Version,
    Structure,
    Weights,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum TeachingAssignments {
    Table,
    Id,
    TeacherId,
    Subject,
    ClassName,
    Period,
    Active,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Evaluations {
    Table,
    Id,
    TeacherId,
    Subject,
    ClassName,
    Period,
    TemplateId,
    QuestionsSnapshot,
    SelfEvaluation,
    #[sea_orm(iden = "observation_1")]
    Observation1,
    #[sea_orm(iden = "observation_2")]
    Observation2,
    Status,
    ScheduledDate,
    ScheduledTime,
    ObserverName,
    Notes,
    AiComment,
    CreatedAt,
    UpdatedAt,
}
