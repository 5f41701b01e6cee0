// ==========================================
// 咖啡拼配分析系统 - 配置层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 配置层错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("缺少必填配置 (key: {0})")]
    MissingKey(String),

    #[error("配置值格式错误 (key: {key}, value: {value}): {message}")]
    InvalidValue {
        key: String,
        value: String,
        message: String,
    },

    #[error("配置不一致: {0}")]
    Inconsistent(String),

    #[error("配置文件读取失败: {0}")]
    FileReadError(String),

    #[error("配置 JSON 解析失败: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("配置锁获取失败: {0}")]
    LockPoisoned(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::FileReadError(err.to_string())
    }
}

/// Result 类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
