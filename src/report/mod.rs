// ==========================================
// 咖啡拼配分析系统 - 报告层
// ==========================================
// 职责: 分析报告组装、JSON / CSV 输出
// 红线: 不含搜索逻辑
// ==========================================

pub mod analysis_report;
pub mod csv_export;

pub use analysis_report::{AnalysisReport, CatalogSummary};
pub use csv_export::{
    export_blends, export_residual, write_blends_csv, write_residual_csv, ExportError,
    ExportResult,
};
