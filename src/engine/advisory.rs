// ==========================================
// 咖啡拼配分析系统 - 库存建议信号
// ==========================================
// 职责: 成本健康度 / 库存水位 / 市场位置 / 两两拼配概览
// 红线: 纯函数，只用于报告，不参与拼配准入
// ==========================================

use crate::config::StockPolicy;
use crate::domain::lot::Lot;
use crate::domain::types::{CostHealth, MarketPosition, StockLevel};
use crate::engine::aggregator::WeightedAggregator;
use serde::Serialize;

// ==========================================
// 成本健康度
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CostHealthReport {
    pub average_cost: f64,
    pub ceiling: f64,
    pub status: CostHealth,
    /// 平均成本超出上限的部分（未超出为 0）
    pub excess_per_unit: f64,
}

/// 按袋数加权的平均成本 vs 理想成本上限（空库存为 None）
pub fn cost_health(lots: &[Lot], ceiling: f64) -> Option<CostHealthReport> {
    let metrics = WeightedAggregator::aggregate_or_none(lots)?;
    let average_cost = metrics.weighted_cost;
    let status = if average_cost <= ceiling {
        CostHealth::WithinCeiling
    } else {
        CostHealth::AboveCeiling
    };

    Some(CostHealthReport {
        average_cost,
        ceiling,
        status,
        excess_per_unit: (average_cost - ceiling).max(0.0),
    })
}

// ==========================================
// 库存水位
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StockLevelReport {
    pub total_volume: f64,
    pub volume_min: f64,
    pub volume_max: f64,
    pub status: StockLevel,
    /// 低于理想区间时建议采购量
    pub suggested_purchase: Option<f64>,
    /// 高于理想区间时建议出售量
    pub suggested_sale: Option<f64>,
}

pub fn stock_level(total_volume: f64, policy: &StockPolicy) -> StockLevelReport {
    let (status, suggested_purchase, suggested_sale) = if total_volume < policy.volume_min {
        (StockLevel::BelowIdeal, Some(policy.volume_min - total_volume), None)
    } else if total_volume > policy.volume_max {
        (StockLevel::AboveIdeal, None, Some(total_volume - policy.volume_max))
    } else {
        (StockLevel::WithinIdeal, None, None)
    };

    StockLevelReport {
        total_volume,
        volume_min: policy.volume_min,
        volume_max: policy.volume_max,
        status,
        suggested_purchase,
        suggested_sale,
    }
}

// ==========================================
// 市场位置
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarketPositionReport {
    pub market_price: f64,
    pub average_cost: f64,
    /// 市价 - 成本
    pub margin: f64,
    /// 成本 + 期望利润
    pub sale_target: f64,
    pub status: MarketPosition,
}

pub fn market_position(market_price: f64, average_cost: f64, desired_margin: f64) -> MarketPositionReport {
    let sale_target = average_cost + desired_margin;
    let margin = market_price - average_cost;
    let status = if market_price >= sale_target {
        MarketPosition::TargetReached
    } else if margin > 0.0 {
        MarketPosition::InProfit
    } else {
        MarketPosition::BelowCost
    };

    MarketPositionReport {
        market_price,
        average_cost,
        margin,
        sale_target,
        status,
    }
}

// ==========================================
// 两两拼配概览（无约束）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairwiseBlend {
    pub lot_a: String,
    pub lot_b: String,
    pub total_volume: f64,
    pub weighted_quality: f64,
    pub weighted_cost: f64,
}

/// 全部两两组合，按加权品质升序（稳定排序）
pub fn pairwise_overview(lots: &[Lot]) -> Vec<PairwiseBlend> {
    let mut pairs = Vec::new();
    for (i, a) in lots.iter().enumerate() {
        for b in &lots[i + 1..] {
            if let Some(metrics) = WeightedAggregator::aggregate_or_none([a, b]) {
                pairs.push(PairwiseBlend {
                    lot_a: a.id.clone(),
                    lot_b: b.id.clone(),
                    total_volume: metrics.total_volume,
                    weighted_quality: metrics.weighted_quality,
                    weighted_cost: metrics.weighted_cost,
                });
            }
        }
    }
    pairs.sort_by(|x, y| x.weighted_quality.total_cmp(&y.weighted_quality));
    pairs
}
