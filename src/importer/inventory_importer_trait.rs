// ==========================================
// 咖啡拼配分析系统 - 库存导入 Trait
// ==========================================
// 职责: 定义库存导入接口（不包含实现）
// ==========================================

use crate::importer::error::ImportResult;
use crate::importer::file_parser::RawTable;
use crate::importer::inventory_importer::InventoryImport;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

// ==========================================
// InventoryImporter Trait
// ==========================================
// 用途: 库存导入主接口
// 实现者: InventoryImporterImpl
#[async_trait]
pub trait InventoryImporter: Send + Sync {
    /// 从文件导入库存（.csv / .xlsx / .xls）
    ///
    /// # 返回
    /// - Ok(InventoryImport): 批次目录 + 构建报告
    /// - Err: 文件不存在、格式不支持、缺少必需列
    ///
    /// # 导入流程
    /// 1. 文件读取与解析（阻塞任务）
    /// 2. 必需列检查
    /// 3. 字段映射 / 清洗 / DQ 校验
    /// 4. 规范排序生成目录
    async fn import_from_file(&self, file_path: PathBuf) -> ImportResult<InventoryImport>;

    /// 批量导入多个文件（并发执行）
    ///
    /// # 说明
    /// - 每个文件的导入是独立的，互不影响
    /// - 某个文件导入失败，不影响其他文件
    async fn batch_import(&self, file_paths: Vec<PathBuf>) -> Vec<Result<InventoryImport, String>>;
}

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口
// 实现者: CsvParser, ExcelParser, UniversalFileParser
pub trait FileParser: Send + Sync {
    /// 解析文件为表头 + 行记录
    fn parse_file(&self, file_path: &Path) -> ImportResult<RawTable>;
}
