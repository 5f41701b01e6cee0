// ==========================================
// 咖啡拼配分析系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含导入逻辑,不含引擎逻辑
// ==========================================

pub mod blend;
pub mod catalog;
pub mod import_report;
pub mod lot;
pub mod types;

// 重导出核心类型
pub use blend::{AggregateMetrics, Blend, ResidualSet, VolumeTarget};
pub use catalog::LotCatalog;
pub use import_report::{CatalogBuildReport, DqLevel, DqViolation, DropReason};
pub use lot::{Lot, RawLotRecord};
pub use types::{
    CostHealth, LotOrdering, MarketPosition, ProfitGoalStatus, SearchMode, SearchTermination,
    StockLevel, TargetStatus,
};
