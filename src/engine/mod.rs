// ==========================================
// 咖啡拼配分析系统 - 引擎层
// ==========================================
// 职责: 加权聚合、约束判定、组合搜索、台账、建议信号
// 红线: 引擎只读批次目录，不做 IO；搜索为 CPU 密集型
// ==========================================

pub mod advisory;
pub mod aggregator;
pub mod blend_search;
pub mod budget;
pub mod combination;
pub mod constraint;
pub mod error;
pub mod ledger;
pub mod orchestrator;
pub mod quote;

// 重导出核心引擎
pub use aggregator::WeightedAggregator;
pub use blend_search::{BlendSearch, SearchOutcome, TargetReport};
pub use budget::{CancelToken, Interrupt, SearchBudget};
pub use combination::{estimate_combinations, CombinationWalker, WalkOutcome};
pub use constraint::{ConstraintEvaluator, Rejection};
pub use error::{EngineError, EngineResult};
pub use ledger::{BlendLedger, LedgerMode, LotPool};
pub use orchestrator::BlendAnalysisOrchestrator;
pub use quote::{
    resolve_market_price, FixedQuote, PriceOrigin, QuoteError, QuoteSource, ResolvedPrice,
};
