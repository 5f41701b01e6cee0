// ==========================================
// 咖啡拼配分析系统 - 批次目录
// ==========================================
// 职责: 单次分析的有效批次集合（批次号唯一）
// 生命周期: 构造一次，搜索期间只读
// 红线: 枚举顺序 = 目录顺序，必须是确定的规范顺序
// ==========================================

use crate::domain::lot::Lot;
use crate::domain::types::LotOrdering;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

// ==========================================
// LotCatalog - 批次目录
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct LotCatalog {
    lots: Vec<Lot>,
    ordering: LotOrdering,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl LotCatalog {
    /// 构造批次目录
    ///
    /// # 参数
    /// - lots: 已通过校验的批次
    /// - ordering: 规范排序口径
    ///
    /// # 说明
    /// - 批次号重复时保留第一次出现的批次
    /// - LotIdAsc 为稳定排序（字节序），InputOrder 保持原顺序
    pub fn new(lots: Vec<Lot>, ordering: LotOrdering) -> Self {
        let mut seen = HashSet::new();
        let mut unique: Vec<Lot> = lots
            .into_iter()
            .filter(|lot| seen.insert(lot.id.clone()))
            .collect();

        if ordering == LotOrdering::LotIdAsc {
            unique.sort_by(|a, b| a.id.cmp(&b.id));
        }

        let index = unique
            .iter()
            .enumerate()
            .map(|(idx, lot)| (lot.id.clone(), idx))
            .collect();

        Self {
            lots: unique,
            ordering,
            index,
        }
    }

    /// 空目录
    pub fn empty() -> Self {
        Self::new(Vec::new(), LotOrdering::LotIdAsc)
    }

    pub fn is_empty(&self) -> bool {
        self.lots.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lots.len()
    }

    /// 按规范顺序返回全部批次
    pub fn lots(&self) -> &[Lot] {
        &self.lots
    }

    pub fn ordering(&self) -> LotOrdering {
        self.ordering
    }

    pub fn get(&self, lot_id: &str) -> Option<&Lot> {
        self.index.get(lot_id).map(|&idx| &self.lots[idx])
    }

    pub fn contains(&self, lot_id: &str) -> bool {
        self.index.contains_key(lot_id)
    }

    /// 批次号（规范顺序）
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.lots.iter().map(|lot| lot.id.as_str())
    }

    /// 库存总袋数
    pub fn total_volume(&self) -> f64 {
        self.lots.iter().fold(0.0, |acc, lot| acc + lot.volume)
    }
}
