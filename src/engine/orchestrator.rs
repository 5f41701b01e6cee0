// ==========================================
// 咖啡拼配分析系统 - 分析编排器
// ==========================================
// 用途: 协调搜索引擎与建议信号，组装分析报告
// 流程: 参数校验 → 拼配搜索 → 剩余库存 → 成本 / 水位 / 市场位置 → 报告
// ==========================================

use crate::config::AnalysisSettings;
use crate::domain::catalog::LotCatalog;
use crate::domain::import_report::CatalogBuildReport;
use crate::engine::advisory;
use crate::engine::aggregator::WeightedAggregator;
use crate::engine::blend_search::BlendSearch;
use crate::engine::budget::SearchBudget;
use crate::engine::error::EngineResult;
use crate::engine::quote::PriceOrigin;
use crate::report::{AnalysisReport, CatalogSummary};
use chrono::Utc;
use std::time::Instant;
use tracing::{debug, info, instrument};
use uuid::Uuid;

// ==========================================
// BlendAnalysisOrchestrator - 分析编排器
// ==========================================
pub struct BlendAnalysisOrchestrator {
    settings: AnalysisSettings,
    search: BlendSearch,
    price_origin: Option<PriceOrigin>,
}

impl BlendAnalysisOrchestrator {
    /// 创建编排器
    ///
    /// # 返回
    /// - Err(InvalidConfig): 参数校验失败
    pub fn new(settings: AnalysisSettings) -> EngineResult<Self> {
        settings.validate()?;
        Ok(Self {
            search: BlendSearch::new(settings.search.clone()),
            settings,
            price_origin: None,
        })
    }

    /// 记录市场价来源（写入报告）
    pub fn with_price_origin(mut self, origin: PriceOrigin) -> Self {
        self.price_origin = Some(origin);
        self
    }

    pub fn settings(&self) -> &AnalysisSettings {
        &self.settings
    }

    /// 执行完整分析
    ///
    /// # 参数
    /// - catalog: 批次目录（只读）
    /// - build_report: 导入构建报告（直接构造目录时为 None）
    /// - budget: 搜索预算 / 取消令牌
    #[instrument(skip_all, fields(mode = %self.settings.search.mode, lots = catalog.len()))]
    pub fn analyze(
        &self,
        catalog: &LotCatalog,
        build_report: Option<&CatalogBuildReport>,
        budget: &SearchBudget,
    ) -> EngineResult<AnalysisReport> {
        let start_time = Instant::now();
        let run_id = Uuid::new_v4().to_string();
        info!(run_id = %run_id, "开始拼配分析");

        // ==========================================
        // 步骤1: 拼配搜索
        // ==========================================
        debug!("步骤1: 拼配搜索");
        let outcome = self
            .search
            .run(catalog, &self.settings.constraints, budget)?;

        // ==========================================
        // 步骤2: 剩余库存
        // ==========================================
        debug!("步骤2: 剩余库存推导");
        let residual = outcome.ledger.residual(catalog);

        // ==========================================
        // 步骤3: 建议信号
        // ==========================================
        debug!("步骤3: 建议信号");
        let constraints = &self.settings.constraints;
        let inventory = WeightedAggregator::aggregate_or_none(catalog.lots());
        let inventory_cost_health = advisory::cost_health(catalog.lots(), constraints.ideal_cost_ceiling);
        let residual_cost_health = advisory::cost_health(&residual.lots, constraints.ideal_cost_ceiling);
        let stock_level = advisory::stock_level(catalog.total_volume(), &self.settings.stock);
        let market_position = inventory.map(|m| {
            advisory::market_position(
                constraints.market_price,
                m.weighted_cost,
                self.settings.stock.desired_margin,
            )
        });
        let pairwise_overview = advisory::pairwise_overview(catalog.lots());

        let catalog_summary = CatalogSummary {
            lots: catalog.len(),
            total_volume: catalog.total_volume(),
            weighted_quality: inventory.map(|m| m.weighted_quality),
            weighted_cost: inventory.map(|m| m.weighted_cost),
            total_rows: build_report.map(|r| r.total_rows),
            dropped_rows: build_report.map(|r| r.dropped).unwrap_or(0),
            drop_reasons: build_report
                .map(|r| r.drop_reasons.clone())
                .unwrap_or_default(),
            warnings: build_report.map(|r| r.warnings.len()).unwrap_or(0),
        };

        let elapsed_ms = start_time.elapsed().as_millis() as u64;
        info!(
            run_id = %run_id,
            blends = outcome.ledger.len(),
            residual_lots = residual.lots.len(),
            termination = %outcome.termination,
            elapsed_ms,
            "拼配分析完成"
        );

        Ok(AnalysisReport {
            run_id,
            generated_at: Utc::now(),
            mode: outcome.mode,
            market_price: constraints.market_price,
            price_origin: self.price_origin,
            catalog: catalog_summary,
            target_reports: outcome.target_reports,
            residual,
            mean_profit_per_unit: outcome.mean_profit_per_unit,
            profit_goal: outcome.profit_goal,
            inventory_cost_health,
            residual_cost_health,
            stock_level,
            market_position,
            pairwise_overview,
            termination: outcome.termination,
            candidates_evaluated: outcome.candidates_evaluated,
            estimated_candidates: outcome.estimated_candidates,
            elapsed_ms,
            blends: outcome.ledger.into_blends(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::lot::Lot;
    use crate::domain::types::{
        CostHealth, LotOrdering, MarketPosition, SearchMode, SearchTermination, StockLevel,
    };

    fn catalog() -> LotCatalog {
        LotCatalog::new(
            vec![
                Lot::new("A", 250.0, 30.0, 1900.0).unwrap(),
                Lot::new("B", 250.0, 30.0, 1900.0).unwrap(),
                Lot::new("C", 300.0, 30.0, 2300.0).unwrap(),
            ],
            LotOrdering::LotIdAsc,
        )
    }

    #[test]
    fn test_analyze_allocation_report() {
        let mut settings = AnalysisSettings::with_market_price(2200.0);
        settings.search.target_volumes = vec![500.0];
        let orchestrator = BlendAnalysisOrchestrator::new(settings)
            .unwrap()
            .with_price_origin(PriceOrigin::Manual);

        let report = orchestrator
            .analyze(&catalog(), None, &SearchBudget::unlimited())
            .unwrap();

        assert_eq!(report.mode, SearchMode::Allocation);
        assert_eq!(report.blends.len(), 1);
        assert_eq!(report.residual.lot_ids(), vec!["C"]);
        assert_eq!(report.termination, SearchTermination::Completed);
        assert_eq!(report.catalog.lots, 3);
        assert_eq!(report.catalog.total_rows, None);
        assert_eq!(report.stock_level.status, StockLevel::WithinIdeal);
        assert_eq!(
            report.residual_cost_health.map(|h| h.status),
            Some(CostHealth::AboveCeiling)
        );
        assert_eq!(
            report.market_position.map(|p| p.status),
            Some(MarketPosition::TargetReached)
        );
        assert_eq!(report.pairwise_overview.len(), 3);
        assert_eq!(report.price_origin, Some(PriceOrigin::Manual));
        assert!(report.summary().contains("目标 500 袋"));
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let mut settings = AnalysisSettings::with_market_price(2200.0);
        settings.constraints.quality_min = 80.0;
        settings.constraints.quality_max = 20.0;
        assert!(BlendAnalysisOrchestrator::new(settings).is_err());
    }

    #[test]
    fn test_report_serializes_to_json() {
        let orchestrator =
            BlendAnalysisOrchestrator::new(AnalysisSettings::with_market_price(2200.0)).unwrap();
        let report = orchestrator
            .analyze(&LotCatalog::empty(), None, &SearchBudget::unlimited())
            .unwrap();
        let json = report.to_json_pretty().unwrap();
        assert!(json.contains("\"profit_goal\": \"NOT_EVALUATED\""));
        assert!(report.market_position.is_none());
    }
}
