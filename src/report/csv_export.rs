// ==========================================
// 咖啡拼配分析系统 - CSV 导出
// ==========================================
// 职责: 拼配结果 / 剩余库存 → 分隔文本
// 格式: 表头沿用业务方表格列名；拼配表数值保留 2 位小数，剩余库存原值写出
// ==========================================

use crate::domain::blend::{Blend, ResidualSet};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// 导出错误
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("导出文件写入失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV 写入失败: {0}")]
    Csv(#[from] csv::Error),
}

pub type ExportResult<T> = Result<T, ExportError>;

#[derive(Serialize)]
struct BlendRow {
    #[serde(rename = "Lotes combinados")]
    lots: String,
    #[serde(rename = "Volume Total")]
    total_volume: f64,
    #[serde(rename = "Catação Média (%)")]
    weighted_quality: f64,
    #[serde(rename = "Custo Médio (R$)")]
    weighted_cost: f64,
    #[serde(rename = "Lucro estimado/saca (R$)")]
    profit_per_unit: f64,
    #[serde(rename = "Meta de Volume")]
    target_volume: f64,
}

#[derive(Serialize)]
struct ResidualRow<'a> {
    #[serde(rename = "Lote")]
    lot_id: &'a str,
    #[serde(rename = "Volume")]
    volume: f64,
    #[serde(rename = "Catacao")]
    quality: f64,
    #[serde(rename = "Custo")]
    unit_cost: f64,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// 拼配结果 → CSV（每个拼配一行）
pub fn write_blends_csv<W: Write>(writer: W, blends: &[Blend]) -> ExportResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    if blends.is_empty() {
        wtr.write_record([
            "Lotes combinados",
            "Volume Total",
            "Catação Média (%)",
            "Custo Médio (R$)",
            "Lucro estimado/saca (R$)",
            "Meta de Volume",
        ])?;
    }
    for blend in blends {
        wtr.serialize(BlendRow {
            lots: blend.lot_ids.join(", "),
            total_volume: round2(blend.total_volume),
            weighted_quality: round2(blend.weighted_quality),
            weighted_cost: round2(blend.weighted_cost),
            profit_per_unit: round2(blend.profit_per_unit),
            target_volume: round2(blend.matched_volume),
        })?;
    }
    wtr.flush()?;
    Ok(())
}

/// 剩余库存 → CSV（与导入格式一致，数值不舍入）
pub fn write_residual_csv<W: Write>(writer: W, residual: &ResidualSet) -> ExportResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    if residual.lots.is_empty() {
        wtr.write_record(["Lote", "Volume", "Catacao", "Custo"])?;
    }
    for lot in &residual.lots {
        wtr.serialize(ResidualRow {
            lot_id: &lot.id,
            volume: lot.volume,
            quality: lot.quality,
            unit_cost: lot.unit_cost,
        })?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn export_blends<P: AsRef<Path>>(path: P, blends: &[Blend]) -> ExportResult<()> {
    let file = std::fs::File::create(path)?;
    write_blends_csv(file, blends)
}

pub fn export_residual<P: AsRef<Path>>(path: P, residual: &ResidualSet) -> ExportResult<()> {
    let file = std::fs::File::create(path)?;
    write_residual_csv(file, residual)
}
