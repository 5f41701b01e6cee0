// ==========================================
// 咖啡拼配分析系统 - 约束判定引擎
// ==========================================
// 职责: 判定聚合结果是否满足目标袋数 / 品质区间 / 利润下限
// 红线: 判定顺序固定且短路：袋数 → 品质 → 利润
// 红线: 分配模式不做单个拼配的利润下限校验（事后看平均利润）
// ==========================================

use crate::config::ConstraintConfig;
use crate::domain::blend::{AggregateMetrics, VolumeTarget};
use crate::domain::types::SearchMode;
use serde::Serialize;
use std::fmt;

// ==========================================
// Rejection - 拒绝原因
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "rule", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Rejection {
    VolumeOutOfTolerance {
        total_volume: f64,
        target_volume: f64,
        tolerance: f64,
    },
    QualityBelowMin {
        weighted_quality: f64,
        quality_min: f64,
    },
    QualityAboveMax {
        weighted_quality: f64,
        quality_max: f64,
    },
    ProfitBelowFloor {
        profit_per_unit: f64,
        profit_floor: f64,
    },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Rejection::VolumeOutOfTolerance {
                total_volume,
                target_volume,
                tolerance,
            } => write!(
                f,
                "VOLUME_OUT_OF_TOLERANCE: |{} - {}| > {}",
                total_volume, target_volume, tolerance
            ),
            Rejection::QualityBelowMin {
                weighted_quality,
                quality_min,
            } => write!(f, "QUALITY_BELOW_MIN: {} < {}", weighted_quality, quality_min),
            Rejection::QualityAboveMax {
                weighted_quality,
                quality_max,
            } => write!(f, "QUALITY_ABOVE_MAX: {} > {}", weighted_quality, quality_max),
            Rejection::ProfitBelowFloor {
                profit_per_unit,
                profit_floor,
            } => write!(f, "PROFIT_BELOW_FLOOR: {} < {}", profit_per_unit, profit_floor),
        }
    }
}

// ==========================================
// ConstraintEvaluator - 约束判定引擎
// ==========================================
pub struct ConstraintEvaluator;

impl ConstraintEvaluator {
    /// 总袋数是否落在目标窗口内（|total - target| <= tolerance，边界含）
    pub fn volume_fits(total_volume: f64, target: &VolumeTarget, config: &ConstraintConfig) -> bool {
        (total_volume - target.volume).abs() <= config.volume_tolerance
    }

    /// 单袋利润 = 市价 - 加权成本
    pub fn profit_per_unit(aggregate: &AggregateMetrics, config: &ConstraintConfig) -> f64 {
        config.market_price - aggregate.weighted_cost
    }

    /// 逐条判定（短路）
    pub fn check(
        aggregate: &AggregateMetrics,
        target: &VolumeTarget,
        config: &ConstraintConfig,
        mode: SearchMode,
    ) -> Result<(), Rejection> {
        // (a) 袋数
        if !Self::volume_fits(aggregate.total_volume, target, config) {
            return Err(Rejection::VolumeOutOfTolerance {
                total_volume: aggregate.total_volume,
                target_volume: target.volume,
                tolerance: config.volume_tolerance,
            });
        }

        // (b) 品质区间
        if aggregate.weighted_quality < config.quality_min {
            return Err(Rejection::QualityBelowMin {
                weighted_quality: aggregate.weighted_quality,
                quality_min: config.quality_min,
            });
        }
        if aggregate.weighted_quality > config.quality_max {
            return Err(Rejection::QualityAboveMax {
                weighted_quality: aggregate.weighted_quality,
                quality_max: config.quality_max,
            });
        }

        // (c) 利润下限（仅发现模式）
        if mode == SearchMode::Discovery {
            let profit_per_unit = Self::profit_per_unit(aggregate, config);
            if profit_per_unit < config.profit_floor {
                return Err(Rejection::ProfitBelowFloor {
                    profit_per_unit,
                    profit_floor: config.profit_floor,
                });
            }
        }

        Ok(())
    }

    pub fn admit(
        aggregate: &AggregateMetrics,
        target: &VolumeTarget,
        config: &ConstraintConfig,
        mode: SearchMode,
    ) -> bool {
        Self::check(aggregate, target, config, mode).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(total_volume: f64, weighted_quality: f64, weighted_cost: f64) -> AggregateMetrics {
        AggregateMetrics {
            total_volume,
            weighted_quality,
            weighted_cost,
        }
    }

    fn target(volume: f64) -> VolumeTarget {
        VolumeTarget {
            volume,
            priority: 0,
        }
    }

    #[test]
    fn test_tolerance_boundary_is_inclusive() {
        let config = ConstraintConfig::with_market_price(2200.0);
        assert!(ConstraintEvaluator::volume_fits(510.0, &target(500.0), &config));
        assert!(ConstraintEvaluator::volume_fits(490.0, &target(500.0), &config));
        assert!(!ConstraintEvaluator::volume_fits(510.5, &target(500.0), &config));
    }

    #[test]
    fn test_volume_checked_first() {
        let config = ConstraintConfig::with_market_price(2200.0);
        let result = ConstraintEvaluator::check(
            &metrics(300.0, 10.0, 5000.0),
            &target(500.0),
            &config,
            SearchMode::Discovery,
        );
        assert!(matches!(result, Err(Rejection::VolumeOutOfTolerance { .. })));
    }

    #[test]
    fn test_quality_band() {
        let mut config = ConstraintConfig::with_market_price(2200.0);
        config.quality_max = 40.0;

        let low = ConstraintEvaluator::check(
            &metrics(500.0, 20.0, 1800.0),
            &target(500.0),
            &config,
            SearchMode::Allocation,
        );
        assert!(matches!(low, Err(Rejection::QualityBelowMin { .. })));

        let high = ConstraintEvaluator::check(
            &metrics(500.0, 45.0, 1800.0),
            &target(500.0),
            &config,
            SearchMode::Allocation,
        );
        assert!(matches!(high, Err(Rejection::QualityAboveMax { .. })));
    }

    #[test]
    fn test_profit_floor_only_in_discovery() {
        let config = ConstraintConfig::with_market_price(2200.0);
        // 利润 = 2200 - 2180 = 20 < 60
        let aggregate = metrics(500.0, 30.0, 2180.0);

        assert!(!ConstraintEvaluator::admit(
            &aggregate,
            &target(500.0),
            &config,
            SearchMode::Discovery
        ));
        assert!(ConstraintEvaluator::admit(
            &aggregate,
            &target(500.0),
            &config,
            SearchMode::Allocation
        ));
    }

    #[test]
    fn test_profit_per_unit() {
        let config = ConstraintConfig::with_market_price(2200.0);
        assert_eq!(
            ConstraintEvaluator::profit_per_unit(&metrics(500.0, 30.0, 1950.0), &config),
            250.0
        );
    }
}
