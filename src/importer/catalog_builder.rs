// ==========================================
// 咖啡拼配分析系统 - 批次目录构建器
// ==========================================
// 职责: 原始行记录 → 规范批次目录 + 构建报告
// 流程: 字段映射 → 清洗 → DQ 校验 → 目录（规范顺序）
// 红线: 丢弃的行只计数，不进入目录
// ==========================================

use crate::domain::catalog::LotCatalog;
use crate::domain::import_report::CatalogBuildReport;
use crate::domain::types::LotOrdering;
use crate::importer::dq_validator::{DqValidator, RowVerdict};
use crate::importer::field_mapper::FieldMapper;
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

/// 目录构建结果
#[derive(Debug, Clone)]
pub struct CatalogBuild {
    pub catalog: LotCatalog,
    pub report: CatalogBuildReport,
}

pub struct CatalogBuilder {
    ordering: LotOrdering,
    field_mapper: FieldMapper,
}

impl Default for CatalogBuilder {
    fn default() -> Self {
        Self::new(LotOrdering::LotIdAsc)
    }
}

impl CatalogBuilder {
    pub fn new(ordering: LotOrdering) -> Self {
        Self {
            ordering,
            field_mapper: FieldMapper,
        }
    }

    /// 构建批次目录
    ///
    /// # 参数
    /// - records: 解析后的行记录（首条数据行行号记为 2，表头为 1）
    #[instrument(skip(self, records), fields(rows = records.len()))]
    pub fn build(&self, records: Vec<HashMap<String, String>>) -> CatalogBuild {
        let mut report = CatalogBuildReport {
            total_rows: records.len(),
            ..Default::default()
        };
        let mut validator = DqValidator::new();
        let mut lots = Vec::with_capacity(records.len());

        for (idx, row) in records.iter().enumerate() {
            let raw = self.field_mapper.map_to_raw_lot(row, idx + 2);
            match validator.validate(&raw) {
                RowVerdict::Accepted { lot, warnings } => {
                    for w in &warnings {
                        warn!(row_number = w.row_number, field = %w.field, "{}", w.message);
                    }
                    report.warnings.extend(warnings);
                    lots.push(lot);
                }
                RowVerdict::Dropped(violation) => {
                    debug!(
                        row_number = violation.row_number,
                        level = %violation.level,
                        "丢弃行: {}",
                        violation.message
                    );
                    if let Some(reason) = violation.drop_reason {
                        report.record_drop(reason);
                    }
                }
            }
        }

        report.accepted = lots.len();
        info!(
            total = report.total_rows,
            accepted = report.accepted,
            dropped = report.dropped,
            "批次目录构建完成"
        );

        CatalogBuild {
            catalog: LotCatalog::new(lots, self.ordering),
            report,
        }
    }
}
