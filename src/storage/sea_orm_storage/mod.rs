//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。
//! 评估记录的所有状态迁移都实现为单次条件写（update 带状态过滤），
//! 并发提交时最多一个成功。

mod evaluations;
mod rubric_templates;
mod teaching_assignments;
mod users;

use crate::config::AppConfig;
use crate::errors::{EvalSystemError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 创建新的 SeaORM 存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        let db_url = Self::build_database_url(&config.database.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite://") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        // 运行迁移
        Migrator::up(&db, None)
            .await
            .map_err(|e| EvalSystemError::database_operation(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self { db })
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| EvalSystemError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory")
            .pragma("mmap_size", "536870912")
            .pragma("wal_autocheckpoint", "1000");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.database.pool_size)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| EvalSystemError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.database.pool_size)
            .min_connections(5)
            .connect_timeout(Duration::from_secs(config.database.timeout))
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| EvalSystemError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite://") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") || url == ":memory:" {
            Ok(format!("sqlite://{}?mode=rwc", url))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(EvalSystemError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

// Storage trait 实现
use crate::models::{
    PaginatedResponse,
    assignments::entities::TeachingAssignment,
    evaluations::{
        entities::{EvaluationRecord, ObservationRound, ObservationSection},
        requests::{EvaluationListQuery, UpdateScheduleRequest},
        responses::EvaluationListItem,
    },
    rubrics::{entities::RubricTemplate, requests::CreateRubricTemplateRequest},
    users::{entities::User, requests::CreateUserRequest},
};
use crate::storage::{NewEvaluation, Storage};
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 用户模块
    async fn create_user(&self, user: CreateUserRequest) -> Result<User> {
        self.create_user_impl(user).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.get_user_by_username_impl(username).await
    }

    async fn count_users(&self) -> Result<u64> {
        self.count_users_impl().await
    }

    // 量表目录模块
    async fn get_rubric_template(&self, id: i64) -> Result<Option<RubricTemplate>> {
        self.get_rubric_template_impl(id).await
    }

    async fn get_rubric_template_by_name(&self, name: &str) -> Result<Option<RubricTemplate>> {
        self.get_rubric_template_by_name_impl(name).await
    }

    async fn create_rubric_template(
        &self,
        template: CreateRubricTemplateRequest,
    ) -> Result<RubricTemplate> {
        self.create_rubric_template_impl(template).await
    }

    // 教学任务模块
    async fn list_active_assignments(
        &self,
        teacher_id: i64,
        period: &str,
    ) -> Result<Vec<TeachingAssignment>> {
        self.list_active_assignments_impl(teacher_id, period).await
    }

    // 评估记录模块
    async fn create_evaluation(&self, new: NewEvaluation) -> Result<EvaluationRecord> {
        self.create_evaluation_impl(new).await
    }

    async fn get_evaluation_by_id(&self, id: i64) -> Result<Option<EvaluationRecord>> {
        self.get_evaluation_by_id_impl(id).await
    }

    async fn submit_self_evaluation(
        &self,
        id: i64,
        section: ObservationSection,
    ) -> Result<EvaluationRecord> {
        self.submit_self_evaluation_impl(id, section).await
    }

    async fn submit_observation(
        &self,
        id: i64,
        round: ObservationRound,
        section: ObservationSection,
    ) -> Result<EvaluationRecord> {
        self.submit_observation_impl(id, round, section).await
    }

    async fn update_schedule(
        &self,
        id: i64,
        update: UpdateScheduleRequest,
    ) -> Result<Option<EvaluationRecord>> {
        self.update_schedule_impl(id, update).await
    }

    async fn set_ai_comment(&self, id: i64, comment: &str) -> Result<bool> {
        self.set_ai_comment_impl(id, comment).await
    }

    async fn list_evaluations_with_pagination(
        &self,
        query: EvaluationListQuery,
    ) -> Result<PaginatedResponse<EvaluationListItem>> {
        self.list_evaluations_with_pagination_impl(query).await
    }

    async fn list_evaluations_for_teacher_period(
        &self,
        teacher_id: i64,
        period: &str,
    ) -> Result<Vec<EvaluationRecord>> {
        self.list_evaluations_for_teacher_period_impl(teacher_id, period)
            .await
    }
}
