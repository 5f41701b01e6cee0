// ==========================================
// 咖啡拼配分析系统 - 加权聚合器
// ==========================================
// 职责: 批次序列 → 总袋数 / 加权品质 / 加权成本
// 红线: 纯函数，无共享状态；按输入顺序从左到右累加（结果逐位可复现）
// ==========================================

use crate::domain::blend::AggregateMetrics;
use crate::domain::lot::Lot;
use crate::engine::error::{EngineError, EngineResult};

// ==========================================
// WeightedAggregator - 加权聚合器
// ==========================================
pub struct WeightedAggregator;

impl WeightedAggregator {
    /// 加权聚合
    ///
    /// # 返回
    /// - Err(EmptyInput): 输入为空（平均值无定义）
    pub fn aggregate<'a, I>(lots: I) -> EngineResult<AggregateMetrics>
    where
        I: IntoIterator<Item = &'a Lot>,
    {
        Self::aggregate_or_none(lots).ok_or(EngineError::EmptyInput)
    }

    /// 允许空输入的聚合（库存级汇总：剩余库存、库存健康度）
    pub fn aggregate_or_none<'a, I>(lots: I) -> Option<AggregateMetrics>
    where
        I: IntoIterator<Item = &'a Lot>,
    {
        let mut count = 0usize;
        let mut total_volume = 0.0_f64;
        let mut quality_sum = 0.0_f64;
        let mut cost_sum = 0.0_f64;

        for lot in lots {
            count += 1;
            total_volume += lot.volume;
            quality_sum += lot.volume * lot.quality;
            cost_sum += lot.volume * lot.unit_cost;
        }

        if count == 0 {
            return None;
        }

        Some(AggregateMetrics {
            total_volume,
            weighted_quality: quality_sum / total_volume,
            weighted_cost: cost_sum / total_volume,
        })
    }
}
