// ==========================================
// 发现模式: 列举全部 (组合, 目标) 合格对
// ==========================================
// 顺序: 组合大小 r 升序 → 组合字典序 → 目标优先级
// 并行: 按组合首元素切分，分区结果按分区顺序拼接
// ==========================================

use super::{volume_window, TargetReport};
use crate::config::{ConstraintConfig, SearchConfig};
use crate::domain::blend::Blend;
use crate::domain::catalog::LotCatalog;
use crate::domain::lot::Lot;
use crate::domain::types::{SearchMode, TargetStatus};
use crate::engine::aggregator::WeightedAggregator;
use crate::engine::budget::{Interrupt, SearchBudget};
use crate::engine::combination::{CombinationWalker, WalkOutcome};
use crate::engine::constraint::ConstraintEvaluator;
use crate::engine::error::EngineResult;
use crate::engine::ledger::BlendLedger;
use rayon::prelude::*;
use std::ops::ControlFlow;
use tracing::debug;

/// 单分区结果: (目标优先级, 拼配) 列表 + 中断原因
type Partition = (Vec<(usize, Blend)>, Option<Interrupt>);

pub(super) fn run(
    config: &SearchConfig,
    catalog: &LotCatalog,
    constraints: &ConstraintConfig,
    budget: &SearchBudget,
) -> EngineResult<(BlendLedger, Vec<TargetReport>, Option<Interrupt>)> {
    let lots = catalog.lots();
    let volumes: Vec<f64> = lots.iter().map(|lot| lot.volume).collect();
    let targets = config.targets();
    let windows: Vec<(f64, f64)> = targets
        .iter()
        .map(|t| volume_window(t, constraints))
        .collect();

    let mut ledger = BlendLedger::shared().bound_to(catalog);
    let mut counts = vec![0usize; targets.len()];
    let mut interrupt = None;

    if !targets.is_empty() {
        for r in config.min_blend_lots..=config.max_lots_for(lots.len()) {
            let walker = CombinationWalker::new(&volumes, r, windows.clone());
            let scan = |first: usize| -> Partition {
                scan_partition(&walker, first, lots, config, constraints, budget)
            };

            let partitions: Vec<Partition> = if config.parallel {
                walker.first_indices().into_par_iter().map(scan).collect()
            } else {
                walker.first_indices().map(scan).collect()
            };

            let mut found = 0usize;
            for (blends, partition_interrupt) in partitions {
                for (priority, blend) in blends {
                    counts[priority] += 1;
                    found += 1;
                    ledger.record(blend)?;
                }
                if interrupt.is_none() {
                    interrupt = partition_interrupt;
                }
            }
            debug!(r, found, "组合大小枚举完成");

            if interrupt.is_some() {
                break;
            }
        }
    }

    let reports = targets
        .iter()
        .zip(counts)
        .map(|(target, blend_count)| TargetReport {
            target: *target,
            status: match (blend_count, interrupt) {
                (0, Some(_)) => TargetStatus::Aborted,
                (0, None) => TargetStatus::Unmet,
                _ => TargetStatus::Met,
            },
            blend_count,
            subset_size: None,
        })
        .collect();

    Ok((ledger, reports, interrupt))
}

fn scan_partition(
    walker: &CombinationWalker<'_>,
    first: usize,
    lots: &[Lot],
    config: &SearchConfig,
    constraints: &ConstraintConfig,
    budget: &SearchBudget,
) -> Partition {
    let targets = config.targets();
    let mut blends = Vec::new();

    let outcome: WalkOutcome<()> = walker.walk_from(first, budget, |indices, total_volume| {
        let mut aggregate = None;
        for target in &targets {
            // 袋数不符时不计算加权值
            if !ConstraintEvaluator::volume_fits(total_volume, target, constraints) {
                continue;
            }
            let metrics = match aggregate {
                Some(m) => m,
                None => match WeightedAggregator::aggregate(indices.iter().map(|&i| &lots[i])) {
                    Ok(m) => {
                        aggregate = Some(m);
                        m
                    }
                    Err(_) => return ControlFlow::Continue(()),
                },
            };
            if ConstraintEvaluator::admit(&metrics, target, constraints, SearchMode::Discovery) {
                let lot_ids = indices.iter().map(|&i| lots[i].id.clone()).collect();
                let profit = ConstraintEvaluator::profit_per_unit(&metrics, constraints);
                blends.push((
                    target.priority,
                    Blend::new(lot_ids, metrics, profit, None, target.volume),
                ));
            }
        }
        ControlFlow::Continue(())
    });

    match outcome {
        WalkOutcome::Interrupted(i) => (blends, Some(i)),
        WalkOutcome::Exhausted | WalkOutcome::Stopped(()) | WalkOutcome::Preempted => {
            (blends, None)
        }
    }
}
