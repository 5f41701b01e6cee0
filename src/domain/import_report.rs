// ==========================================
// 咖啡拼配分析系统 - 导入质量报告
// ==========================================
// 职责: DQ 违规记录、丢弃原因、目录构建汇总
// 红线: 结果只报告计数，不携带被丢弃行本身
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ==========================================
// DqLevel - 数据质量等级
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DqLevel {
    Error,    // 阻断：行被丢弃
    Warning,  // 警告：行保留
    Conflict, // 冲突：主键重复，后出现者丢弃
}

impl fmt::Display for DqLevel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DqLevel::Error => write!(f, "ERROR"),
            DqLevel::Warning => write!(f, "WARNING"),
            DqLevel::Conflict => write!(f, "CONFLICT"),
        }
    }
}

// ==========================================
// DropReason - 行丢弃原因
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DropReason {
    MissingLotId,      // 批次号缺失
    NotNumeric,        // 数值字段缺失或无法解析
    NonPositiveVolume, // 袋数 <= 0
    DuplicateLotId,    // 批次号重复
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DropReason::MissingLotId => write!(f, "MISSING_LOT_ID"),
            DropReason::NotNumeric => write!(f, "NOT_NUMERIC"),
            DropReason::NonPositiveVolume => write!(f, "NON_POSITIVE_VOLUME"),
            DropReason::DuplicateLotId => write!(f, "DUPLICATE_LOT_ID"),
        }
    }
}

// ==========================================
// DqViolation - 单条违规
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DqViolation {
    pub row_number: usize,
    pub lot_id: Option<String>,
    pub level: DqLevel,
    pub field: String,
    pub message: String,
    /// 仅丢弃类违规有值
    pub drop_reason: Option<DropReason>,
}

impl DqViolation {
    pub fn is_blocking(&self) -> bool {
        self.drop_reason.is_some()
    }
}

// ==========================================
// CatalogBuildReport - 目录构建汇总
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogBuildReport {
    pub total_rows: usize,
    pub accepted: usize,
    pub dropped: usize,
    pub drop_reasons: BTreeMap<DropReason, usize>,
    /// 警告类违规（行已保留）
    pub warnings: Vec<DqViolation>,
}

impl CatalogBuildReport {
    pub fn record_drop(&mut self, reason: DropReason) {
        self.dropped += 1;
        *self.drop_reasons.entry(reason).or_insert(0) += 1;
    }

    pub fn dropped_for(&self, reason: DropReason) -> usize {
        self.drop_reasons.get(&reason).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_drop_counts_by_reason() {
        let mut report = CatalogBuildReport::default();
        report.record_drop(DropReason::NotNumeric);
        report.record_drop(DropReason::NotNumeric);
        report.record_drop(DropReason::DuplicateLotId);

        assert_eq!(report.dropped, 3);
        assert_eq!(report.dropped_for(DropReason::NotNumeric), 2);
        assert_eq!(report.dropped_for(DropReason::MissingLotId), 0);
    }

    #[test]
    fn test_drop_reason_serializes_screaming_snake() {
        let json = serde_json::to_string(&DropReason::NonPositiveVolume).unwrap();
        assert_eq!(json, "\"NON_POSITIVE_VOLUME\"");
    }
}
