// ==========================================
// 咖啡拼配分析系统 - 命令行入口
// ==========================================
// 流程: 配置加载 → 库存导入 → 市场价解析 → 拼配分析 → 导出
// 红线: 结果仅为建议，不改写库存文件
// ==========================================

use anyhow::{bail, Context, Result};
use clap::Parser;
use coffee_blend_engine::config::{config_keys, default_config_path, ConfigManager};
use coffee_blend_engine::engine::{resolve_market_price, BlendAnalysisOrchestrator, CancelToken, SearchBudget};
use coffee_blend_engine::importer::{InventoryImporter, InventoryImporterImpl};
use coffee_blend_engine::report::{export_blends, export_residual};
use coffee_blend_engine::{logging, APP_NAME, VERSION};
use std::path::PathBuf;
use tracing::{info, warn};

/// 咖啡拼配分析
#[derive(Parser, Debug)]
#[command(name = "coffee-blend", version, about = "咖啡库存拼配组合搜索与分配")]
struct Args {
    /// 库存文件（.csv / .xlsx / .xls）
    #[arg(long, value_name = "FILE")]
    inventory: PathBuf,

    /// JSON 配置文件（缺省读取系统配置目录）
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// 搜索模式: discovery / allocation
    #[arg(long)]
    mode: Option<String>,

    /// 市场价（每袋）
    #[arg(long, env = "COFFEE_BLEND_MARKET_PRICE")]
    market_price: Option<f64>,

    /// 目标袋数，逗号分隔（按优先级）
    #[arg(long, value_delimiter = ',')]
    targets: Vec<f64>,

    /// 最多评估候选组合数
    #[arg(long)]
    max_candidates: Option<u64>,

    /// 时间预算（毫秒）
    #[arg(long)]
    time_budget_ms: Option<u64>,

    /// 拼配结果导出 CSV
    #[arg(long, value_name = "FILE")]
    export_blends: Option<PathBuf>,

    /// 剩余库存导出 CSV
    #[arg(long, value_name = "FILE")]
    export_residual: Option<PathBuf>,

    /// 完整报告输出 JSON
    #[arg(long, value_name = "FILE")]
    report_json: Option<PathBuf>,

    /// 默认日志级别（RUST_LOG 优先）
    #[arg(long, default_value = "info")]
    log_level: String,

    /// 以 JSON 格式输出日志
    #[arg(long)]
    json_logs: bool,
}

/// 配置加载: 显式文件 > 默认路径 > 空配置，然后叠加环境变量与命令行覆写
fn load_config(args: &Args) -> Result<ConfigManager> {
    let manager = match &args.config {
        Some(path) => ConfigManager::from_json_file(path)
            .with_context(|| format!("读取配置文件失败: {}", path.display()))?,
        None => match default_config_path().filter(|p| p.exists()) {
            Some(path) => {
                info!(path = %path.display(), "使用默认配置文件");
                ConfigManager::from_json_file(&path)
                    .with_context(|| format!("读取配置文件失败: {}", path.display()))?
            }
            None => ConfigManager::new(),
        },
    };
    let manager = manager.with_env_overrides()?;

    if let Some(mode) = &args.mode {
        manager.set(config_keys::SEARCH_MODE, mode)?;
    }
    if !args.targets.is_empty() {
        let joined = args
            .targets
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",");
        manager.set(config_keys::TARGET_VOLUMES, &joined)?;
    }
    if let Some(n) = args.max_candidates {
        manager.set(config_keys::MAX_CANDIDATES, &n.to_string())?;
    }
    if let Some(ms) = args.time_budget_ms {
        manager.set(config_keys::TIME_BUDGET_MS, &ms.to_string())?;
    }
    Ok(manager)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    if args.json_logs {
        logging::init_json(&args.log_level);
    } else {
        logging::init_with_level(&args.log_level);
    }
    info!("{} v{}", APP_NAME, VERSION);

    let config = load_config(&args)?;

    // === 市场价 ===
    let manual_price = match args.market_price {
        Some(price) => Some(price),
        None => config.get_market_price()?,
    };
    let resolved = resolve_market_price(None, manual_price)
        .await
        .context("无法确定市场价，请通过 --market-price 或配置 market_price 提供")?;
    let settings = config.load_analysis_settings(Some(resolved.price))?;

    // === 库存导入 ===
    let importer = InventoryImporterImpl::new(settings.search.lot_ordering);
    let import = importer.import_from_file(args.inventory.clone()).await?;
    if import.report.dropped > 0 {
        warn!(
            dropped = import.report.dropped,
            reasons = ?import.report.drop_reasons,
            "部分库存行被丢弃"
        );
    }
    if import.catalog.is_empty() {
        bail!("库存文件中没有有效批次: {}", args.inventory.display());
    }

    // === 拼配分析（CPU 密集，放到 blocking 线程；Ctrl-C 取消） ===
    let token = CancelToken::new();
    let budget = SearchBudget::from_config(&settings.budget, token.clone());
    let orchestrator = BlendAnalysisOrchestrator::new(settings)?.with_price_origin(resolved.origin);

    let ctrl_c_token = token.clone();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("收到中断信号，停止搜索");
            ctrl_c_token.cancel();
        }
    });

    let catalog = import.catalog;
    let build_report = import.report;
    let report = tokio::task::spawn_blocking(move || {
        orchestrator.analyze(&catalog, Some(&build_report), &budget)
    })
    .await
    .context("分析任务失败")??;
    ctrl_c.abort();

    // === 导出 ===
    if let Some(path) = &args.export_blends {
        export_blends(path, &report.blends)?;
        info!(path = %path.display(), blends = report.blends.len(), "拼配结果已导出");
    }
    if let Some(path) = &args.export_residual {
        export_residual(path, &report.residual)?;
        info!(path = %path.display(), lots = report.residual.lots.len(), "剩余库存已导出");
    }
    if let Some(path) = &args.report_json {
        std::fs::write(path, report.to_json_pretty()?)
            .with_context(|| format!("写入报告失败: {}", path.display()))?;
        info!(path = %path.display(), "分析报告已写出");
    }

    println!("{}", report.summary());
    Ok(())
}
