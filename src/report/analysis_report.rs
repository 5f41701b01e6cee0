// ==========================================
// 咖啡拼配分析系统 - 分析报告
// ==========================================
// 职责: 单次分析的完整输出（可序列化为 JSON）
// 内容: 目录汇总 / 拼配 / 目标报告 / 剩余库存 / 建议信号 / 终止原因
// ==========================================

use crate::domain::blend::{Blend, ResidualSet};
use crate::domain::import_report::DropReason;
use crate::domain::types::{ProfitGoalStatus, SearchMode, SearchTermination};
use crate::engine::advisory::{
    CostHealthReport, MarketPositionReport, PairwiseBlend, StockLevelReport,
};
use crate::engine::blend_search::TargetReport;
use crate::engine::quote::PriceOrigin;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;

// ==========================================
// CatalogSummary - 目录汇总
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogSummary {
    pub lots: usize,
    pub total_volume: f64,
    pub weighted_quality: Option<f64>,
    pub weighted_cost: Option<f64>,
    /// 导入行数（直接传入目录时为 None）
    pub total_rows: Option<usize>,
    pub dropped_rows: usize,
    pub drop_reasons: BTreeMap<DropReason, usize>,
    pub warnings: usize,
}

// ==========================================
// AnalysisReport - 分析报告
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub run_id: String,
    pub generated_at: DateTime<Utc>,
    pub mode: SearchMode,
    pub market_price: f64,
    pub price_origin: Option<PriceOrigin>,

    pub catalog: CatalogSummary,

    // 搜索结果
    pub blends: Vec<Blend>,
    pub target_reports: Vec<TargetReport>,
    pub residual: ResidualSet,
    pub mean_profit_per_unit: Option<f64>,
    pub profit_goal: ProfitGoalStatus,

    // 建议信号
    pub inventory_cost_health: Option<CostHealthReport>,
    pub residual_cost_health: Option<CostHealthReport>,
    pub stock_level: StockLevelReport,
    pub market_position: Option<MarketPositionReport>,
    pub pairwise_overview: Vec<PairwiseBlend>,

    // 运行信息
    pub termination: SearchTermination,
    pub candidates_evaluated: u64,
    pub estimated_candidates: u64,
    pub elapsed_ms: u64,
}

impl AnalysisReport {
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// 终端摘要
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "运行 ID: {}", self.run_id);
        let _ = writeln!(
            out,
            "模式: {}  市场价: R${:.2}{}",
            self.mode,
            self.market_price,
            self.price_origin
                .map(|o| format!(" ({})", o))
                .unwrap_or_default()
        );
        let _ = writeln!(
            out,
            "库存: {} 个批次, {:.0} 袋, 丢弃 {} 行",
            self.catalog.lots, self.catalog.total_volume, self.catalog.dropped_rows
        );

        for report in &self.target_reports {
            let _ = writeln!(
                out,
                "  目标 {:.0} 袋: {} (拼配 {} 个)",
                report.target.volume, report.status, report.blend_count
            );
        }

        let _ = writeln!(out, "拼配数: {}", self.blends.len());
        for blend in self.blends.iter().take(20) {
            let _ = writeln!(
                out,
                "  [{}] {:.0} 袋, 品质 {:.2}%, 成本 R${:.2}, 利润 R${:.2}/袋",
                blend.lot_ids.join(", "),
                blend.total_volume,
                blend.weighted_quality,
                blend.weighted_cost,
                blend.profit_per_unit
            );
        }
        if self.blends.len() > 20 {
            let _ = writeln!(out, "  ... 其余 {} 个拼配见导出文件", self.blends.len() - 20);
        }

        if let Some(mean) = self.mean_profit_per_unit {
            let _ = writeln!(out, "平均利润: R${:.2}/袋 ({})", mean, self.profit_goal);
        }
        let _ = writeln!(
            out,
            "剩余库存: {} 个批次, {:.0} 袋",
            self.residual.lots.len(),
            self.residual.total_volume
        );
        let _ = writeln!(
            out,
            "库存水位: {} ({:.0} 袋)",
            self.stock_level.status, self.stock_level.total_volume
        );
        if let Some(health) = &self.inventory_cost_health {
            let _ = writeln!(
                out,
                "成本健康度: {} (平均 R${:.2}, 上限 R${:.2})",
                health.status, health.average_cost, health.ceiling
            );
        }
        if let Some(position) = &self.market_position {
            let _ = writeln!(
                out,
                "市场位置: {} (利润 R${:.2}, 目标售价 R${:.2})",
                position.status, position.margin, position.sale_target
            );
        }
        let _ = writeln!(
            out,
            "终止: {}  已评估组合: {} / 估算 {}  耗时 {} ms",
            self.termination, self.candidates_evaluated, self.estimated_candidates, self.elapsed_ms
        );
        out
    }
}
