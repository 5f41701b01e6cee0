// ==========================================
// 咖啡拼配分析系统 - 字段映射器实现
// ==========================================
// 职责: 源列名（含别名）→ 标准字段
// 标准字段: Lote / Volume / Catacao / Custo
// ==========================================

use crate::domain::lot::RawLotRecord;
use std::collections::HashMap;

/// 标准字段及其可接受的列名别名
const COLUMN_ALIASES: [(&str, &[&str]); 4] = [
    ("Lote", &["Lote", "Lot", "lot_id", "lote"]),
    ("Volume", &["Volume", "Sacas", "volume", "sacas"]),
    ("Catacao", &["Catacao", "Catação", "Quality", "quality", "catacao"]),
    ("Custo", &["Custo", "Cost", "unit_cost", "custo"]),
];

pub struct FieldMapper;

impl FieldMapper {
    /// 将原始行记录映射为 RawLotRecord
    pub fn map_to_raw_lot(&self, row: &HashMap<String, String>, row_number: usize) -> RawLotRecord {
        RawLotRecord {
            lot_id: self.get_string(row, "Lote"),
            volume: self.get_string(row, "Volume"),
            quality: self.get_string(row, "Catacao"),
            unit_cost: self.get_string(row, "Custo"),
            row_number,
        }
    }

    /// 检查必需列（返回缺失的标准列名）
    pub fn missing_required_columns(&self, headers: &[String]) -> Vec<String> {
        COLUMN_ALIASES
            .iter()
            .filter(|(_, aliases)| {
                !headers
                    .iter()
                    .any(|h| aliases.contains(&h.trim()))
            })
            .map(|(canonical, _)| canonical.to_string())
            .collect()
    }

    /// 提取字符串字段（返回 Option），按别名顺序取第一个非空值
    fn get_string(&self, row: &HashMap<String, String>, key: &str) -> Option<String> {
        let aliases: &[&str] = COLUMN_ALIASES
            .iter()
            .find(|(canonical, _)| *canonical == key)
            .map(|(_, aliases)| *aliases)
            .unwrap_or(&[]);

        for alias in aliases {
            if let Some(v) = row.get(*alias) {
                let trimmed = v.trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_map_canonical_columns() {
        let mapper = FieldMapper;
        let record = mapper.map_to_raw_lot(
            &row(&[("Lote", "L01"), ("Volume", "100"), ("Catacao", "22"), ("Custo", "1800")]),
            2,
        );
        assert_eq!(record.lot_id.as_deref(), Some("L01"));
        assert_eq!(record.volume.as_deref(), Some("100"));
        assert_eq!(record.quality.as_deref(), Some("22"));
        assert_eq!(record.unit_cost.as_deref(), Some("1800"));
        assert_eq!(record.row_number, 2);
    }

    #[test]
    fn test_map_aliases() {
        let mapper = FieldMapper;
        let record = mapper.map_to_raw_lot(
            &row(&[("Lot", "A"), ("Sacas", "50"), ("Catação", "30"), ("Cost", "2000")]),
            5,
        );
        assert_eq!(record.lot_id.as_deref(), Some("A"));
        assert_eq!(record.volume.as_deref(), Some("50"));
        assert_eq!(record.quality.as_deref(), Some("30"));
        assert_eq!(record.unit_cost.as_deref(), Some("2000"));
    }

    #[test]
    fn test_blank_value_maps_to_none() {
        let mapper = FieldMapper;
        let record = mapper.map_to_raw_lot(&row(&[("Lote", "  "), ("Volume", "10")]), 3);
        assert_eq!(record.lot_id, None);
        assert_eq!(record.quality, None);
    }

    #[test]
    fn test_missing_required_columns() {
        let mapper = FieldMapper;
        let headers = vec!["Lote".to_string(), "Sacas".to_string()];
        assert_eq!(
            mapper.missing_required_columns(&headers),
            vec!["Catacao".to_string(), "Custo".to_string()]
        );

        let full = vec![
            "lot_id".to_string(),
            "volume".to_string(),
            "quality".to_string(),
            "unit_cost".to_string(),
        ];
        assert!(mapper.missing_required_columns(&full).is_empty());
    }
}
