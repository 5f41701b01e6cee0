// ==========================================
// 咖啡拼配分析系统 - 配置层
// ==========================================
// 职责: 系统配置管理,支持文件 / 环境变量 / 显式覆写
// 存储: 内存 key-value（不落库）
// ==========================================

pub mod analysis_config;
pub mod config_manager;
pub mod error;

// 重导出核心配置管理器
pub use analysis_config::{
    defaults, AnalysisSettings, BudgetConfig, ConstraintConfig, SearchConfig, StockPolicy,
};
pub use config_manager::{config_keys, default_config_path, ConfigManager};
pub use error::{ConfigError, ConfigResult};
