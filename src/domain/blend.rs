// ==========================================
// 咖啡拼配分析系统 - 拼配领域模型
// ==========================================
// 职责: 目标袋数、加权聚合结果、拼配结果、剩余库存
// 红线: Blend 创建后不可修改，由 BlendLedger 持有
// ==========================================

use crate::domain::lot::Lot;
use serde::{Deserialize, Serialize};

// ==========================================
// VolumeTarget - 目标袋数
// ==========================================
// priority 为目标列表中的位置（0 = 最高优先级）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeTarget {
    pub volume: f64,
    pub priority: usize,
}

impl VolumeTarget {
    /// 按列表顺序生成带优先级的目标
    pub fn from_volumes(volumes: &[f64]) -> Vec<VolumeTarget> {
        volumes
            .iter()
            .enumerate()
            .map(|(priority, &volume)| VolumeTarget { volume, priority })
            .collect()
    }
}

// ==========================================
// AggregateMetrics - 加权聚合结果
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregateMetrics {
    pub total_volume: f64,     // Σvolume
    pub weighted_quality: f64, // Σ(volume·quality)/Σvolume
    pub weighted_cost: f64,    // Σ(volume·unit_cost)/Σvolume
}

// ==========================================
// Blend - 拼配结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blend {
    /// 组成批次（规范顺序）
    pub lot_ids: Vec<String>,
    pub total_volume: f64,
    pub weighted_quality: f64,
    pub weighted_cost: f64,
    /// 单袋利润 = 市价 - 加权成本
    pub profit_per_unit: f64,
    /// 绑定的目标（仅分配模式；发现模式为 None）
    pub target: Option<VolumeTarget>,
    /// 命中的目标袋数窗口（两种模式都有）
    pub matched_volume: f64,
}

impl Blend {
    pub fn new(
        lot_ids: Vec<String>,
        metrics: AggregateMetrics,
        profit_per_unit: f64,
        target: Option<VolumeTarget>,
        matched_volume: f64,
    ) -> Self {
        Self {
            lot_ids,
            total_volume: metrics.total_volume,
            weighted_quality: metrics.weighted_quality,
            weighted_cost: metrics.weighted_cost,
            profit_per_unit,
            target,
            matched_volume,
        }
    }

    pub fn metrics(&self) -> AggregateMetrics {
        AggregateMetrics {
            total_volume: self.total_volume,
            weighted_quality: self.weighted_quality,
            weighted_cost: self.weighted_cost,
        }
    }

    pub fn lot_count(&self) -> usize {
        self.lot_ids.len()
    }
}

// ==========================================
// ResidualSet - 剩余库存
// ==========================================
// 目录减去所有已消耗批次；空集时加权值为 None
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResidualSet {
    pub lots: Vec<Lot>,
    pub total_volume: f64,
    pub weighted_quality: Option<f64>,
    pub weighted_cost: Option<f64>,
}

impl ResidualSet {
    pub fn is_empty(&self) -> bool {
        self.lots.is_empty()
    }

    pub fn lot_ids(&self) -> Vec<&str> {
        self.lots.iter().map(|lot| lot.id.as_str()).collect()
    }
}
