// ==========================================
// 咖啡拼配分析系统 - 拼配搜索引擎
// ==========================================
// 红线: 同一目录顺序 + 同一目标列表 + 同一参数 → 结果逐位一致
// 红线: 分配模式为首个命中（first-fit），不寻优
// ==========================================
// 职责: 发现模式（列举全部合格拼配）/ 分配模式（按优先级独占分配）
// 输入: 批次目录 + 约束参数 + 搜索参数 + 预算
// 输出: SearchOutcome（台账 + 目标报告 + 终止原因）
// ==========================================

mod allocation;
mod discovery;


use crate::config::{ConstraintConfig, SearchConfig};
use crate::domain::blend::VolumeTarget;
use crate::domain::catalog::LotCatalog;
use crate::domain::types::{ProfitGoalStatus, SearchMode, SearchTermination, TargetStatus};
use crate::engine::budget::SearchBudget;
use crate::engine::combination::estimate_combinations;
use crate::engine::error::EngineResult;
use crate::engine::ledger::BlendLedger;
use serde::Serialize;
use tracing::{info, instrument, warn};

// ==========================================
// TargetReport - 单个目标的处理结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetReport {
    pub target: VolumeTarget,
    pub status: TargetStatus,
    /// 该目标下接受的拼配数（分配模式 0 或 1）
    pub blend_count: usize,
    /// 分配模式命中组合的批次数
    pub subset_size: Option<usize>,
}

// ==========================================
// SearchOutcome - 搜索结果
// ==========================================
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub mode: SearchMode,
    pub ledger: BlendLedger,
    pub target_reports: Vec<TargetReport>,
    pub termination: SearchTermination,
    pub candidates_evaluated: u64,
    pub estimated_candidates: u64,
    pub mean_profit_per_unit: Option<f64>,
    pub profit_goal: ProfitGoalStatus,
}

impl SearchOutcome {
    pub fn is_complete(&self) -> bool {
        self.termination == SearchTermination::Completed
    }

    pub fn met_targets(&self) -> usize {
        self.target_reports
            .iter()
            .filter(|r| r.status == TargetStatus::Met)
            .count()
    }
}

// ==========================================
// BlendSearch - 拼配搜索引擎
// ==========================================
pub struct BlendSearch {
    config: SearchConfig,
}

impl BlendSearch {
    pub fn new(config: SearchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// 执行搜索
    ///
    /// # 返回
    /// - Ok(SearchOutcome): 完成或被中断（中断时保留已接受的拼配）
    /// - Err(InvalidConfig): 参数非法
    #[instrument(skip_all, fields(mode = %self.config.mode, lots = catalog.len()))]
    pub fn run(
        &self,
        catalog: &LotCatalog,
        constraints: &ConstraintConfig,
        budget: &SearchBudget,
    ) -> EngineResult<SearchOutcome> {
        self.config.validate()?;
        constraints.validate()?;

        let n = catalog.len();
        let estimated_candidates = estimate_combinations(
            n,
            self.config.min_blend_lots,
            self.config.max_lots_for(n),
        );
        if estimated_candidates > self.config.combination_warning_threshold {
            warn!(
                estimated_candidates,
                threshold = self.config.combination_warning_threshold,
                "组合数过大，建议设置预算或减少批次"
            );
        }

        let (ledger, target_reports, interrupt) = match self.config.mode {
            SearchMode::Discovery => discovery::run(&self.config, catalog, constraints, budget)?,
            SearchMode::Allocation => allocation::run(&self.config, catalog, constraints, budget)?,
        };

        let mean_profit_per_unit = ledger.mean_profit_per_unit();
        let profit_goal = match (self.config.mode, mean_profit_per_unit) {
            (SearchMode::Allocation, Some(mean)) if mean >= constraints.profit_target_average => {
                ProfitGoalStatus::Met
            }
            (SearchMode::Allocation, Some(_)) => ProfitGoalStatus::Missed,
            _ => ProfitGoalStatus::NotEvaluated,
        };

        let termination = interrupt
            .map(|i| i.termination())
            .unwrap_or(SearchTermination::Completed);

        info!(
            blends = ledger.len(),
            termination = %termination,
            candidates_evaluated = budget.candidates_evaluated(),
            profit_goal = %profit_goal,
            "拼配搜索结束"
        );

        Ok(SearchOutcome {
            mode: self.config.mode,
            ledger,
            target_reports,
            termination,
            candidates_evaluated: budget.candidates_evaluated(),
            estimated_candidates,
            mean_profit_per_unit,
            profit_goal,
        })
    }
}

/// 目标 → 可接受袋数窗口
fn volume_window(target: &VolumeTarget, constraints: &ConstraintConfig) -> (f64, f64) {
    (
        target.volume - constraints.volume_tolerance,
        target.volume + constraints.volume_tolerance,
    )
}
