// ==========================================
// 分配模式: 按目标优先级独占分配
// ==========================================
// 每个目标: r 从小到大，组合字典序，首个合格组合即接受并消耗批次
// 并行: 同一 r 内按首元素切分，find_map_first 取最靠前分区的命中
//       已命中分区下标记入 best，更靠后的分区在下一个候选前放弃
// 中断: 已接受拼配保留，未处理目标标记 ABORTED
// ==========================================

use super::{volume_window, TargetReport};
use crate::config::{ConstraintConfig, SearchConfig};
use crate::domain::blend::{AggregateMetrics, Blend, VolumeTarget};
use crate::domain::catalog::LotCatalog;
use crate::domain::lot::Lot;
use crate::domain::types::{SearchMode, TargetStatus};
use crate::engine::aggregator::WeightedAggregator;
use crate::engine::budget::{Interrupt, SearchBudget};
use crate::engine::combination::{CombinationWalker, WalkOutcome};
use crate::engine::constraint::ConstraintEvaluator;
use crate::engine::error::EngineResult;
use crate::engine::ledger::{BlendLedger, LotPool};
use rayon::prelude::*;
use std::ops::ControlFlow;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info};

/// 单个目标的搜索结论
#[derive(Debug)]
pub(super) enum FirstFit {
    Found {
        indices: Vec<usize>,
        metrics: AggregateMetrics,
    },
    NotFound,
    Interrupted(Interrupt),
}

pub(super) fn run(
    config: &SearchConfig,
    catalog: &LotCatalog,
    constraints: &ConstraintConfig,
    budget: &SearchBudget,
) -> EngineResult<(BlendLedger, Vec<TargetReport>, Option<Interrupt>)> {
    let mut pool = LotPool::new(catalog);
    let mut ledger = BlendLedger::exclusive().bound_to(catalog);
    let mut reports = Vec::new();
    let mut interrupt: Option<Interrupt> = None;

    for target in config.targets() {
        if interrupt.is_some() {
            reports.push(report(target, TargetStatus::Aborted, None));
            continue;
        }

        match first_fit(&pool, &target, config, constraints, budget) {
            FirstFit::Found { indices, metrics } => {
                let taken = pool.take(&indices);
                let lot_ids: Vec<String> = taken.into_iter().map(|lot| lot.id).collect();
                let profit = ConstraintEvaluator::profit_per_unit(&metrics, constraints);
                let subset_size = lot_ids.len();

                info!(
                    target_volume = target.volume,
                    lots = ?lot_ids,
                    total_volume = metrics.total_volume,
                    "目标已分配"
                );
                ledger.record(Blend::new(lot_ids, metrics, profit, Some(target), target.volume))?;
                reports.push(report(target, TargetStatus::Met, Some(subset_size)));
            }
            FirstFit::NotFound => {
                debug!(target_volume = target.volume, remaining = pool.len(), "目标无合格组合");
                reports.push(report(target, TargetStatus::Unmet, None));
            }
            FirstFit::Interrupted(i) => {
                interrupt = Some(i);
                reports.push(report(target, TargetStatus::Aborted, None));
            }
        }
    }

    Ok((ledger, reports, interrupt))
}

fn report(target: VolumeTarget, status: TargetStatus, subset_size: Option<usize>) -> TargetReport {
    TargetReport {
        target,
        status,
        blend_count: usize::from(status == TargetStatus::Met),
        subset_size,
    }
}

/// 在剩余批次中寻找字典序第一个合格组合（r 升序）
fn first_fit(
    pool: &LotPool,
    target: &VolumeTarget,
    config: &SearchConfig,
    constraints: &ConstraintConfig,
    budget: &SearchBudget,
) -> FirstFit {
    let lots = pool.available();
    let volumes = pool.volumes();
    let window = vec![volume_window(target, constraints)];

    for r in config.min_blend_lots..=config.max_lots_for(lots.len()) {
        let walker = CombinationWalker::new(&volumes, r, window.clone());
        let best = AtomicUsize::new(usize::MAX);
        let scan = |first: usize| -> Option<FirstFit> {
            scan_partition(&walker, first, &best, lots, target, constraints, budget)
        };

        // 分区内命中或中断 → Some；最靠前的 Some 即结论
        let hit = if config.parallel {
            walker.first_indices().into_par_iter().find_map_first(scan)
        } else {
            walker.first_indices().find_map(scan)
        };

        if let Some(fit) = hit {
            return fit;
        }
    }

    FirstFit::NotFound
}

/// 扫描首元素为 first 的分区
///
/// best 为当前已知命中（或中断）的最小分区下标；first 大于它时放弃本分区
pub(super) fn scan_partition(
    walker: &CombinationWalker<'_>,
    first: usize,
    best: &AtomicUsize,
    lots: &[Lot],
    target: &VolumeTarget,
    constraints: &ConstraintConfig,
    budget: &SearchBudget,
) -> Option<FirstFit> {
    let preempt = || first > best.load(Ordering::Acquire);
    let outcome = walker.walk_from_until(first, budget, &preempt, |indices, total_volume| {
        if !ConstraintEvaluator::volume_fits(total_volume, target, constraints) {
            return ControlFlow::Continue(());
        }
        match WeightedAggregator::aggregate(indices.iter().map(|&i| &lots[i])) {
            Ok(metrics)
                if ConstraintEvaluator::admit(&metrics, target, constraints, SearchMode::Allocation) =>
            {
                ControlFlow::Break((indices.to_vec(), metrics))
            }
            _ => ControlFlow::Continue(()),
        }
    });

    let fit = match outcome {
        WalkOutcome::Stopped((indices, metrics)) => FirstFit::Found { indices, metrics },
        WalkOutcome::Interrupted(i) => FirstFit::Interrupted(i),
        WalkOutcome::Exhausted | WalkOutcome::Preempted => return None,
    };
    best.fetch_min(first, Ordering::AcqRel);
    Some(fit)
}
