// ==========================================
// 端到端测试: 导入 → 分析 → 导出
// ==========================================
// 测试目标: 验证完整业务流程（库存 CSV → 分析报告 → 结果 CSV）
// ==========================================

use coffee_blend_engine::config::{config_keys, ConfigManager};
use coffee_blend_engine::domain::{
    CostHealth, ProfitGoalStatus, SearchMode, SearchTermination, StockLevel, TargetStatus,
};
use coffee_blend_engine::engine::{
    resolve_market_price, BlendAnalysisOrchestrator, CancelToken, FixedQuote, PriceOrigin,
    SearchBudget,
};
use coffee_blend_engine::importer::{InventoryImporter, InventoryImporterImpl};
use coffee_blend_engine::logging;
use coffee_blend_engine::report::{export_blends, export_residual};
use std::io::Write;
use tempfile::{Builder, TempDir};

const INVENTORY_CSV: &str = "\
Lote,Volume,Catacao,Custo
L01,300,30,1900
L02,200,20,2000
L03,250,28,2150
L04,500,26,1850
L05,150,35,2300
L06,200,22,1950
L07,abc,22,1950
";

async fn import_inventory() -> coffee_blend_engine::importer::InventoryImport {
    let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
    file.write_all(INVENTORY_CSV.as_bytes()).unwrap();
    file.flush().unwrap();

    InventoryImporterImpl::default()
        .import_from_file(file.path().to_path_buf())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_allocation_flow_end_to_end() {
    logging::init_test();
    println!("\n=== 测试：分配模式完整流程 ===");

    // 1. 导入
    let import = import_inventory().await;
    assert_eq!(import.catalog.len(), 6);
    assert_eq!(import.report.dropped, 1);

    // 2. 配置 + 市场价
    let config = ConfigManager::new();
    config.set(config_keys::TARGET_VOLUMES, "500,250").unwrap();
    let resolved = resolve_market_price(None, Some(2200.0)).await.unwrap();
    assert_eq!(resolved.origin, PriceOrigin::Manual);
    let settings = config.load_analysis_settings(Some(resolved.price)).unwrap();

    // 3. 分析
    let orchestrator = BlendAnalysisOrchestrator::new(settings)
        .unwrap()
        .with_price_origin(resolved.origin);
    let report = orchestrator
        .analyze(&import.catalog, Some(&import.report), &SearchBudget::unlimited())
        .unwrap();
    println!("{}", report.summary());

    // 500: L01 + L02 为字典序第一个合格组合；250: 剩余批次无合格组合
    assert_eq!(report.mode, SearchMode::Allocation);
    assert_eq!(report.blends.len(), 1);
    assert_eq!(report.blends[0].lot_ids, vec!["L01", "L02"]);
    assert_eq!(report.blends[0].weighted_quality, 26.0);
    assert_eq!(report.blends[0].weighted_cost, 1940.0);
    assert_eq!(report.blends[0].profit_per_unit, 260.0);
    assert_eq!(report.target_reports[0].status, TargetStatus::Met);
    assert_eq!(report.target_reports[1].status, TargetStatus::Unmet);
    assert_eq!(report.profit_goal, ProfitGoalStatus::Met);
    assert_eq!(report.termination, SearchTermination::Completed);

    assert_eq!(report.residual.lot_ids(), vec!["L03", "L04", "L05", "L06"]);
    assert_eq!(report.residual.total_volume, 1100.0);

    assert_eq!(report.catalog.total_rows, Some(7));
    assert_eq!(report.catalog.dropped_rows, 1);
    assert_eq!(report.stock_level.status, StockLevel::AboveIdeal);
    assert_eq!(report.stock_level.suggested_sale, Some(600.0));
    assert_eq!(
        report.inventory_cost_health.as_ref().map(|h| h.status),
        Some(CostHealth::WithinCeiling)
    );
    assert_eq!(report.pairwise_overview.len(), 15);

    // 4. 导出 + 剩余库存可重新导入
    let dir = TempDir::new().unwrap();
    let blends_path = dir.path().join("blends.csv");
    let residual_path = dir.path().join("residual.csv");
    export_blends(&blends_path, &report.blends).unwrap();
    export_residual(&residual_path, &report.residual).unwrap();

    let mut reader = csv::Reader::from_path(&blends_path).unwrap();
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 1);
    assert_eq!(&rows[0][0], "L01, L02");

    let reimported = InventoryImporterImpl::default()
        .import_from_file(residual_path)
        .await
        .unwrap();
    assert_eq!(reimported.catalog.len(), 4);
    assert_eq!(reimported.catalog.total_volume(), 1100.0);
}

#[tokio::test]
async fn test_discovery_flow_with_live_quote() {
    println!("\n=== 测试：发现模式 + 实时报价 ===");

    let import = import_inventory().await;
    let config = ConfigManager::new();
    config.set(config_keys::SEARCH_MODE, "discovery").unwrap();

    let quote = FixedQuote::new(2250.0);
    let resolved = resolve_market_price(Some(&quote), Some(2200.0)).await.unwrap();
    assert_eq!(resolved.origin, PriceOrigin::Live);

    let settings = config.load_analysis_settings(Some(resolved.price)).unwrap();
    let report = BlendAnalysisOrchestrator::new(settings)
        .unwrap()
        .with_price_origin(resolved.origin)
        .analyze(&import.catalog, Some(&import.report), &SearchBudget::unlimited())
        .unwrap();

    assert_eq!(report.mode, SearchMode::Discovery);
    assert!(!report.blends.is_empty());
    assert!(report.blends.iter().all(|b| b.target.is_none()));
    assert!(report.blends.iter().all(|b| b.profit_per_unit >= 60.0));
    assert_eq!(report.profit_goal, ProfitGoalStatus::NotEvaluated);
    // 发现模式不消耗库存
    assert_eq!(report.residual.lots.len(), 6);

    let json = report.to_json_pretty().unwrap();
    assert!(json.contains("\"price_origin\": \"LIVE\""));
}

#[tokio::test]
async fn test_budget_exhaustion_keeps_partial_report() {
    println!("\n=== 测试：预算耗尽保留部分结果 ===");

    let import = import_inventory().await;
    let config = ConfigManager::new();
    config.set(config_keys::SEARCH_MODE, "DISCOVERY").unwrap();
    config.set(config_keys::MAX_CANDIDATES, "3").unwrap();
    let settings = config.load_analysis_settings(Some(2200.0)).unwrap();

    let budget = SearchBudget::from_config(&settings.budget, CancelToken::new());
    let report = BlendAnalysisOrchestrator::new(settings)
        .unwrap()
        .analyze(&import.catalog, None, &budget)
        .unwrap();

    assert_eq!(report.termination, SearchTermination::BudgetExhausted);
    assert_eq!(report.catalog.total_rows, None);
    assert!(report.blends.len() <= 3);
}

#[tokio::test]
async fn test_cancelled_before_start() {
    let import = import_inventory().await;
    let token = CancelToken::new();
    token.cancel();
    let budget = SearchBudget::new(token, None, None);

    let settings = ConfigManager::new().load_analysis_settings(Some(2200.0)).unwrap();
    let report = BlendAnalysisOrchestrator::new(settings)
        .unwrap()
        .analyze(&import.catalog, Some(&import.report), &budget)
        .unwrap();

    assert_eq!(report.termination, SearchTermination::Cancelled);
    assert!(report.blends.is_empty());
    assert!(report
        .target_reports
        .iter()
        .all(|r| r.status == TargetStatus::Aborted));
}
