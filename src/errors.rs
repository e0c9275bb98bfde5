//! 统一错误处理模块
//!
//! 使用宏自动生成错误类型，支持错误代码和类型名称。

use std::fmt;

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() 方法 - 返回错误代码
/// - error_type() 方法 - 返回错误类型名称
/// - message() 方法 - 返回错误详情
/// - 便捷构造函数
macro_rules! define_evalsystem_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone)]
        pub enum EvalSystemError {
            $($variant(String),)*
        }

        impl EvalSystemError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(EvalSystemError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(EvalSystemError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(EvalSystemError::$variant(msg) => msg,)*
                }
            }
        }

        // 生成便捷构造函数
        paste::paste! {
            impl EvalSystemError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        EvalSystemError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_evalsystem_errors! {
    CacheConnection("E001", "Cache Connection Error"),
    CachePluginNotFound("E002", "Cache Plugin Not Found"),
    DatabaseConfig("E003", "Database Configuration Error"),
    DatabaseConnection("E004", "Database Connection Error"),
    DatabaseOperation("E005", "Database Operation Error"),
    Validation("E006", "Validation Error"),
    NotFound("E007", "Resource Not Found"),
    Conflict("E008", "Conflict Error"),
    Serialization("E009", "Serialization Error"),
    StoragePluginNotFound("E010", "Storage Plugin Not Found"),
    DateParse("E011", "Date Parse Error"),
    Authentication("E012", "Authentication Error"),
    Authorization("E013", "Authorization Error"),
}

impl EvalSystemError {
    /// 格式化为彩色输出（用于开发环境）
    #[cfg(debug_assertions)]
    pub fn format_colored(&self) -> String {
        format!(
            "\x1b[1;31m[ERROR]\x1b[0m \x1b[33m{}\x1b[0m \x1b[31m{}\x1b[0m\n  {}",
            self.code(),
            self.error_type(),
            self.message()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for EvalSystemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for EvalSystemError {}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for EvalSystemError {
    fn from(err: sea_orm::DbErr) -> Self {
        EvalSystemError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for EvalSystemError {
    fn from(err: std::io::Error) -> Self {
        EvalSystemError::DatabaseOperation(err.to_string())
    }
}

impl From<serde_json::Error> for EvalSystemError {
    fn from(err: serde_json::Error) -> Self {
        EvalSystemError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for EvalSystemError {
    fn from(err: chrono::ParseError) -> Self {
        EvalSystemError::DateParse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EvalSystemError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(EvalSystemError::cache_connection("test").code(), "E001");
        assert_eq!(EvalSystemError::database_config("test").code(), "E003");
        assert_eq!(EvalSystemError::validation("test").code(), "E006");
        assert_eq!(EvalSystemError::conflict("test").code(), "E008");
        assert_eq!(EvalSystemError::authentication("test").code(), "E012");
    }

    #[test]
    fn test_error_types() {
        assert_eq!(
            EvalSystemError::conflict("test").error_type(),
            "Conflict Error"
        );
        assert_eq!(
            EvalSystemError::validation("test").error_type(),
            "Validation Error"
        );
    }

    #[test]
    fn test_error_message() {
        let err = EvalSystemError::validation("Invalid input");
        assert_eq!(err.message(), "Invalid input");
    }

    #[test]
    fn test_format_simple() {
        let err = EvalSystemError::not_found("Evaluation 42");
        let formatted = err.format_simple();
        assert!(formatted.contains("Resource Not Found"));
        assert!(formatted.contains("Evaluation 42"));
    }
}
