use serde::Deserialize;
use ts_rs::TS;

use crate::models::users::entities::UserRole;

/// 创建用户请求（启动时管理员种子账号使用）
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    /// 已经过 argon2 哈希的密码
    pub password: String,
    pub role: UserRole,
    pub display_name: Option<String>,
}
