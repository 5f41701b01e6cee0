// ==========================================
// 咖啡拼配分析系统 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 注: 目标无解不是错误（TargetStatus::Unmet），不在此列
// ==========================================

use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// 对空批次序列求加权平均（调用方契约违反）
    #[error("加权聚合输入为空")]
    EmptyInput,

    /// 外部协作方（如实时报价）不可用，且无手工兜底
    #[error("上游数据不可用: {0}")]
    UpstreamUnavailable(String),

    #[error("参数非法: {0}")]
    InvalidConfig(String),

    /// 独占台账中批次已被消耗
    #[error("批次已被消耗: {lot_id}")]
    LotAlreadyConsumed { lot_id: String },

    #[error("批次不在目录中: {lot_id}")]
    UnknownLot { lot_id: String },
}

impl From<crate::config::ConfigError> for EngineError {
    fn from(err: crate::config::ConfigError) -> Self {
        EngineError::InvalidConfig(err.to_string())
    }
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
