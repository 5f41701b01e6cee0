// ==========================================
// 咖啡拼配分析系统 - 拼配台账
// ==========================================
// 职责: 记录被接受的拼配；分配模式下维护已消耗批次集合
// 红线: 只追加；独占模式下同一批次最多属于一个拼配
// 红线: 剩余库存每次按目录重新推导，不缓存
// 红线: 绑定目录后，拼配中的批次号必须全部来自该目录
// ==========================================

use crate::domain::blend::{Blend, ResidualSet};
use crate::domain::catalog::LotCatalog;
use crate::domain::lot::Lot;
use crate::engine::aggregator::WeightedAggregator;
use crate::engine::error::{EngineError, EngineResult};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

// ==========================================
// LedgerMode - 台账模式
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerMode {
    Shared,    // 发现模式：批次可出现在多个拼配中，不消耗
    Exclusive, // 分配模式：批次被拼配消耗
}

impl fmt::Display for LedgerMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LedgerMode::Shared => write!(f, "SHARED"),
            LedgerMode::Exclusive => write!(f, "EXCLUSIVE"),
        }
    }
}

// ==========================================
// BlendLedger - 拼配台账
// ==========================================
#[derive(Debug, Clone)]
pub struct BlendLedger {
    mode: LedgerMode,
    blends: Vec<Blend>,
    consumed: BTreeSet<String>,
    /// 绑定目录的批次号集合；None = 不校验
    known: Option<BTreeSet<String>>,
}

impl BlendLedger {
    /// 发现模式台账
    pub fn shared() -> Self {
        Self {
            mode: LedgerMode::Shared,
            blends: Vec::new(),
            consumed: BTreeSet::new(),
            known: None,
        }
    }

    /// 分配模式台账
    pub fn exclusive() -> Self {
        Self {
            mode: LedgerMode::Exclusive,
            ..Self::shared()
        }
    }

    /// 绑定目录：此后 record 拒绝目录之外的批次号
    pub fn bound_to(mut self, catalog: &LotCatalog) -> Self {
        self.known = Some(catalog.lots().iter().map(|lot| lot.id.clone()).collect());
        self
    }

    pub fn mode(&self) -> LedgerMode {
        self.mode
    }

    /// 追加拼配
    ///
    /// # 返回
    /// - Err(UnknownLot): 已绑定目录且含目录外批次（台账不变）
    /// - Err(LotAlreadyConsumed): 独占模式下含已消耗批次（台账不变）
    pub fn record(&mut self, blend: Blend) -> EngineResult<()> {
        if let Some(known) = &self.known {
            if let Some(id) = blend.lot_ids.iter().find(|id| !known.contains(*id)) {
                return Err(EngineError::UnknownLot { lot_id: id.clone() });
            }
        }
        if self.mode == LedgerMode::Exclusive {
            let mut incoming = BTreeSet::new();
            for id in &blend.lot_ids {
                if self.consumed.contains(id) || !incoming.insert(id.as_str()) {
                    return Err(EngineError::LotAlreadyConsumed { lot_id: id.clone() });
                }
            }
            self.consumed.extend(blend.lot_ids.iter().cloned());
        }
        self.blends.push(blend);
        Ok(())
    }

    /// 已接受的拼配（接受顺序）
    pub fn blends(&self) -> &[Blend] {
        &self.blends
    }

    pub fn into_blends(self) -> Vec<Blend> {
        self.blends
    }

    pub fn len(&self) -> usize {
        self.blends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blends.is_empty()
    }

    /// 已消耗批次号（共享模式恒为空）
    pub fn consumed_lot_ids(&self) -> BTreeSet<String> {
        self.consumed.clone()
    }

    /// 剩余库存 = 目录 - 已消耗批次（保持目录顺序）
    pub fn residual(&self, catalog: &LotCatalog) -> ResidualSet {
        let lots: Vec<Lot> = catalog
            .lots()
            .iter()
            .filter(|lot| !self.consumed.contains(&lot.id))
            .cloned()
            .collect();

        let metrics = WeightedAggregator::aggregate_or_none(&lots);
        ResidualSet {
            total_volume: metrics.map(|m| m.total_volume).unwrap_or(0.0),
            weighted_quality: metrics.map(|m| m.weighted_quality),
            weighted_cost: metrics.map(|m| m.weighted_cost),
            lots,
        }
    }

    /// 全部拼配的平均单袋利润（无拼配为 None）
    pub fn mean_profit_per_unit(&self) -> Option<f64> {
        if self.blends.is_empty() {
            return None;
        }
        let sum = self
            .blends
            .iter()
            .fold(0.0_f64, |acc, blend| acc + blend.profit_per_unit);
        Some(sum / self.blends.len() as f64)
    }
}

// ==========================================
// LotPool - 分配模式的可用批次池
// ==========================================
// 顺序 = 目录规范顺序；被拼配取走后剩余批次保持相对顺序
#[derive(Debug, Clone)]
pub struct LotPool {
    lots: Vec<Lot>,
}

impl LotPool {
    pub fn new(catalog: &LotCatalog) -> Self {
        Self {
            lots: catalog.lots().to_vec(),
        }
    }

    pub fn available(&self) -> &[Lot] {
        &self.lots
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.lots.iter().map(|lot| lot.volume).collect()
    }

    pub fn len(&self) -> usize {
        self.lots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lots.is_empty()
    }

    /// 取走指定下标（升序）的批次，返回顺序与下标一致
    ///
    /// 越界下标被忽略
    pub fn take(&mut self, indices: &[usize]) -> Vec<Lot> {
        let mut taken = Vec::with_capacity(indices.len());
        let mut kept = Vec::with_capacity(self.lots.len().saturating_sub(indices.len()));
        for (idx, lot) in std::mem::take(&mut self.lots).into_iter().enumerate() {
            if indices.binary_search(&idx).is_ok() {
                taken.push(lot);
            } else {
                kept.push(lot);
            }
        }
        self.lots = kept;
        taken
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::blend::AggregateMetrics;
    use crate::domain::types::LotOrdering;

    fn lot(id: &str, volume: f64, quality: f64, cost: f64) -> Lot {
        Lot::new(id, volume, quality, cost).unwrap()
    }

    fn blend(ids: &[&str], profit: f64) -> Blend {
        Blend::new(
            ids.iter().map(|s| s.to_string()).collect(),
            AggregateMetrics {
                total_volume: 500.0,
                weighted_quality: 30.0,
                weighted_cost: 2000.0,
            },
            profit,
            None,
            500.0,
        )
    }

    fn catalog() -> LotCatalog {
        LotCatalog::new(
            vec![
                lot("A", 100.0, 20.0, 1800.0),
                lot("B", 300.0, 40.0, 2000.0),
                lot("C", 200.0, 30.0, 1900.0),
            ],
            LotOrdering::LotIdAsc,
        )
    }

    #[test]
    fn test_exclusive_rejects_reuse_without_mutation() {
        let mut ledger = BlendLedger::exclusive();
        ledger.record(blend(&["A", "B"], 100.0)).unwrap();

        let err = ledger.record(blend(&["B", "C"], 100.0)).unwrap_err();
        assert_eq!(err, EngineError::LotAlreadyConsumed { lot_id: "B".to_string() });
        assert_eq!(ledger.len(), 1);
        assert!(!ledger.consumed_lot_ids().contains("C"));
    }

    #[test]
    fn test_bound_ledger_rejects_unknown_lot() {
        let catalog = catalog();
        for mut ledger in [
            BlendLedger::exclusive().bound_to(&catalog),
            BlendLedger::shared().bound_to(&catalog),
        ] {
            let err = ledger.record(blend(&["A", "Z"], 100.0)).unwrap_err();
            assert_eq!(err, EngineError::UnknownLot { lot_id: "Z".to_string() });
            assert!(ledger.is_empty());
            assert!(ledger.consumed_lot_ids().is_empty());

            ledger.record(blend(&["A", "B"], 100.0)).unwrap();
            assert_eq!(ledger.len(), 1);
        }

        // 未绑定目录时不校验
        let mut ledger = BlendLedger::exclusive();
        ledger.record(blend(&["Z"], 100.0)).unwrap();
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_shared_allows_reuse_and_consumes_nothing() {
        let mut ledger = BlendLedger::shared();
        ledger.record(blend(&["A", "B"], 100.0)).unwrap();
        ledger.record(blend(&["B", "C"], 100.0)).unwrap();
        assert_eq!(ledger.len(), 2);
        assert!(ledger.consumed_lot_ids().is_empty());
        assert_eq!(ledger.residual(&catalog()).lots.len(), 3);
    }

    #[test]
    fn test_residual_is_recomputed() {
        let catalog = catalog();
        let mut ledger = BlendLedger::exclusive();
        assert_eq!(ledger.residual(&catalog).total_volume, 600.0);

        ledger.record(blend(&["A", "B"], 100.0)).unwrap();
        let residual = ledger.residual(&catalog);
        assert_eq!(residual.lot_ids(), vec!["C"]);
        assert_eq!(residual.weighted_quality, Some(30.0));
        assert_eq!(residual.weighted_cost, Some(1900.0));

        ledger.record(blend(&["C"], 100.0)).unwrap();
        let residual = ledger.residual(&catalog);
        assert!(residual.is_empty());
        assert_eq!(residual.weighted_quality, None);
        assert_eq!(residual.total_volume, 0.0);
    }

    #[test]
    fn test_mean_profit() {
        let mut ledger = BlendLedger::exclusive();
        assert_eq!(ledger.mean_profit_per_unit(), None);
        ledger.record(blend(&["A"], 50.0)).unwrap();
        ledger.record(blend(&["B"], 90.0)).unwrap();
        assert_eq!(ledger.mean_profit_per_unit(), Some(70.0));
    }

    #[test]
    fn test_pool_take_keeps_relative_order() {
        let mut pool = LotPool::new(&catalog());
        let taken = pool.take(&[0, 2]);
        let taken_ids: Vec<&str> = taken.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(taken_ids, vec!["A", "C"]);
        let left: Vec<&str> = pool.available().iter().map(|l| l.id.as_str()).collect();
        assert_eq!(left, vec!["B"]);
    }
}
