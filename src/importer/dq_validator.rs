// ==========================================
// 咖啡拼配分析系统 - 数据质量校验器实现
// ==========================================
// 职责: 逐行校验 RawLotRecord，产出 Lot 或丢弃原因
// 阻断: 批次号缺失 / 数值无法解析 / 袋数 <= 0 / 批次号重复
// 警告: 品质超出 0-100 / 单位成本为负（行保留）
// ==========================================

use crate::domain::import_report::{DqLevel, DqViolation, DropReason};
use crate::domain::lot::{Lot, RawLotRecord};
use crate::importer::data_cleaner::DataCleaner;
use std::collections::HashSet;

// ==========================================
// RowVerdict - 单行校验结论
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub enum RowVerdict {
    Accepted {
        lot: Lot,
        warnings: Vec<DqViolation>,
    },
    Dropped(DqViolation),
}

pub struct DqValidator {
    cleaner: DataCleaner,
    seen_ids: HashSet<String>,
}

impl Default for DqValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl DqValidator {
    pub fn new() -> Self {
        Self {
            cleaner: DataCleaner,
            seen_ids: HashSet::new(),
        }
    }

    /// 校验单行（有状态：记录已接受的批次号用于去重）
    pub fn validate(&mut self, record: &RawLotRecord) -> RowVerdict {
        // 主键
        let lot_id = match self.cleaner.normalize_null(record.lot_id.clone()) {
            Some(id) => id,
            None => {
                return RowVerdict::Dropped(blocking(
                    record,
                    None,
                    "lot_id",
                    "批次号缺失".to_string(),
                    DropReason::MissingLotId,
                ));
            }
        };

        // 数值字段
        let fields = [
            ("volume", record.volume.as_deref()),
            ("quality", record.quality.as_deref()),
            ("unit_cost", record.unit_cost.as_deref()),
        ];
        let mut values = [0.0_f64; 3];
        for (slot, (field, raw)) in values.iter_mut().zip(fields) {
            match self.cleaner.coerce_f64(raw) {
                Some(v) => *slot = v,
                None => {
                    return RowVerdict::Dropped(blocking(
                        record,
                        Some(&lot_id),
                        field,
                        format!("无法解析为数值: {}", raw.unwrap_or("<空>")),
                        DropReason::NotNumeric,
                    ));
                }
            }
        }
        let [volume, quality, unit_cost] = values;

        if volume <= 0.0 {
            return RowVerdict::Dropped(blocking(
                record,
                Some(&lot_id),
                "volume",
                format!("袋数 <= 0: {}", volume),
                DropReason::NonPositiveVolume,
            ));
        }

        // 主键重复（保留首次出现）
        if self.seen_ids.contains(&lot_id) {
            return RowVerdict::Dropped(DqViolation {
                row_number: record.row_number,
                lot_id: Some(lot_id),
                level: DqLevel::Conflict,
                field: "lot_id".to_string(),
                message: "重复批次号（保留首次出现）".to_string(),
                drop_reason: Some(DropReason::DuplicateLotId),
            });
        }

        let lot = match Lot::new(lot_id.clone(), volume, quality, unit_cost) {
            Some(lot) => lot,
            None => {
                return RowVerdict::Dropped(blocking(
                    record,
                    Some(&lot_id),
                    "volume",
                    "批次数值非法".to_string(),
                    DropReason::NotNumeric,
                ));
            }
        };

        self.seen_ids.insert(lot_id);
        RowVerdict::Accepted {
            warnings: self.validate_ranges(record, &lot),
            lot,
        }
    }

    /// 范围校验（警告级，行保留）
    fn validate_ranges(&self, record: &RawLotRecord, lot: &Lot) -> Vec<DqViolation> {
        let mut warnings = Vec::new();

        if !(0.0..=100.0).contains(&lot.quality) {
            warnings.push(DqViolation {
                row_number: record.row_number,
                lot_id: Some(lot.id.clone()),
                level: DqLevel::Warning,
                field: "quality".to_string(),
                message: format!("品质超出 0-100: {}", lot.quality),
                drop_reason: None,
            });
        }

        if lot.unit_cost < 0.0 {
            warnings.push(DqViolation {
                row_number: record.row_number,
                lot_id: Some(lot.id.clone()),
                level: DqLevel::Warning,
                field: "unit_cost".to_string(),
                message: format!("单位成本为负数: {}", lot.unit_cost),
                drop_reason: None,
            });
        }

        warnings
    }
}

fn blocking(
    record: &RawLotRecord,
    lot_id: Option<&str>,
    field: &str,
    message: String,
    reason: DropReason,
) -> DqViolation {
    DqViolation {
        row_number: record.row_number,
        lot_id: lot_id.map(str::to_string),
        level: DqLevel::Error,
        field: field.to_string(),
        message,
        drop_reason: Some(reason),
    }
}
