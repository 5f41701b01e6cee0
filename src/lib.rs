// ==========================================
// 咖啡拼配分析系统 - 核心库
// ==========================================
// 系统定位: 决策支持系统（拼配建议，人工最终决定）
// 技术栈: Rust + rayon（并行搜索）+ tokio（导入 / 报价）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 配置层 - 分析参数
pub mod config;

// 导入层 - 库存文件
pub mod importer;

// 引擎层 - 聚合 / 判定 / 搜索 / 台账
pub mod engine;

// 报告层 - JSON / CSV 输出
pub mod report;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    CostHealth, LotOrdering, MarketPosition, ProfitGoalStatus, SearchMode, SearchTermination,
    StockLevel, TargetStatus,
};

// 领域实体
pub use domain::{AggregateMetrics, Blend, Lot, LotCatalog, ResidualSet, VolumeTarget};

// 配置
pub use config::{AnalysisSettings, ConfigManager, ConstraintConfig, SearchConfig};

// 引擎
pub use engine::{
    BlendAnalysisOrchestrator, BlendLedger, BlendSearch, CancelToken, ConstraintEvaluator,
    SearchBudget, SearchOutcome, WeightedAggregator,
};

// 导入
pub use importer::{CatalogBuilder, InventoryImporter, InventoryImporterImpl};

// 报告
pub use report::AnalysisReport;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "咖啡拼配分析系统";
