// ==========================================
// 咖啡拼配分析系统 - 批次领域模型
// ==========================================
// 职责: 库存批次实体 + 导入中间结构体
// 红线: 批次一经构造不可修改，volume 必须 > 0
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// Lot - 库存批次
// ==========================================
// 用途: 导入层构造，引擎层只读
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lot {
    pub id: String,     // 批次号（Lote）
    pub volume: f64,    // 数量（袋，sacas）
    pub quality: f64,   // 瑕疵/筛选评分（Catação，0-100%）
    pub unit_cost: f64, // 单位成本（R$/袋）
}

impl Lot {
    /// 构造批次
    ///
    /// # 返回
    /// - Some(Lot): 数值全部有限且 volume > 0
    /// - None: 违反批次不变量
    pub fn new(id: impl Into<String>, volume: f64, quality: f64, unit_cost: f64) -> Option<Self> {
        if !(volume.is_finite() && quality.is_finite() && unit_cost.is_finite()) {
            return None;
        }
        if volume <= 0.0 {
            return None;
        }
        Some(Self {
            id: id.into(),
            volume,
            quality,
            unit_cost,
        })
    }

    /// 批次总成本（volume × unit_cost）
    pub fn total_cost(&self) -> f64 {
        self.volume * self.unit_cost
    }
}

// ==========================================
// RawLotRecord - 导入中间结构体
// ==========================================
// 用途: 文件解析 → 字段映射 → 此结构（尚未数值化）
// 生命周期: 仅在导入流程内
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawLotRecord {
    pub lot_id: Option<String>,
    pub volume: Option<String>,
    pub quality: Option<String>,
    pub unit_cost: Option<String>,

    // 元信息
    pub row_number: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lot_new_valid() {
        let lot = Lot::new("L001", 120.0, 22.5, 1850.0).unwrap();
        assert_eq!(lot.id, "L001");
        assert_eq!(lot.total_cost(), 120.0 * 1850.0);
    }

    #[test]
    fn test_lot_new_rejects_non_positive_volume() {
        assert!(Lot::new("L001", 0.0, 20.0, 1800.0).is_none());
        assert!(Lot::new("L001", -5.0, 20.0, 1800.0).is_none());
    }

    #[test]
    fn test_lot_new_rejects_non_finite() {
        assert!(Lot::new("L001", f64::NAN, 20.0, 1800.0).is_none());
        assert!(Lot::new("L001", 100.0, f64::INFINITY, 1800.0).is_none());
        assert!(Lot::new("L001", 100.0, 20.0, f64::NAN).is_none());
    }
}
