// ==========================================
// 咖啡拼配分析系统 - 库存导入器实现
// ==========================================
// 职责: 整合导入流程，从文件（或上传字节流）到批次目录
// 流程: 解析 → 必需列检查 → 映射 → 清洗 → 校验 → 目录
// ==========================================

use crate::domain::catalog::LotCatalog;
use crate::domain::import_report::CatalogBuildReport;
use crate::domain::types::LotOrdering;
use crate::importer::catalog_builder::CatalogBuilder;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::FieldMapper;
use crate::importer::file_parser::{CsvParser, RawTable, UniversalFileParser};
use crate::importer::inventory_importer_trait::{FileParser, InventoryImporter};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, instrument};
use uuid::Uuid;

// ==========================================
// InventoryImport - 单次导入结果
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct InventoryImport {
    pub batch_id: String,
    pub source: String,
    pub imported_at: DateTime<Utc>,
    pub catalog: LotCatalog,
    pub report: CatalogBuildReport,
    pub elapsed_ms: u64,
}

// ==========================================
// InventoryImporterImpl - 库存导入器实现
// ==========================================
#[derive(Clone)]
pub struct InventoryImporterImpl {
    ordering: LotOrdering,
    file_parser: Arc<dyn FileParser>,
}

impl Default for InventoryImporterImpl {
    fn default() -> Self {
        Self::new(LotOrdering::LotIdAsc)
    }
}

impl InventoryImporterImpl {
    pub fn new(ordering: LotOrdering) -> Self {
        Self::with_parser(ordering, Arc::new(UniversalFileParser))
    }

    pub fn with_parser(ordering: LotOrdering, file_parser: Arc<dyn FileParser>) -> Self {
        Self {
            ordering,
            file_parser,
        }
    }

    /// 从内存中的 CSV 字节流导入（上传场景）
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub fn import_csv_bytes(&self, bytes: &[u8], source: &str) -> ImportResult<InventoryImport> {
        let start_time = Instant::now();
        let table = CsvParser.parse_reader(bytes)?;
        self.finish(table, source.to_string(), start_time)
    }

    /// 解析结果 → 目录
    fn finish(
        &self,
        table: RawTable,
        source: String,
        start_time: Instant,
    ) -> ImportResult<InventoryImport> {
        let batch_id = Uuid::new_v4().to_string();

        // === 必需列检查 ===
        let missing = FieldMapper.missing_required_columns(&table.headers);
        if !missing.is_empty() {
            error!(batch_id = %batch_id, source = %source, missing = ?missing, "缺少必需列");
            return Err(ImportError::MissingColumns(missing));
        }

        // === 映射 / 清洗 / 校验 / 排序 ===
        let build = CatalogBuilder::new(self.ordering).build(table.rows);

        let elapsed_ms = start_time.elapsed().as_millis() as u64;
        info!(
            batch_id = %batch_id,
            source = %source,
            lots = build.catalog.len(),
            dropped = build.report.dropped,
            elapsed_ms,
            "库存导入完成"
        );

        Ok(InventoryImport {
            batch_id,
            source,
            imported_at: Utc::now(),
            catalog: build.catalog,
            report: build.report,
            elapsed_ms,
        })
    }
}

#[async_trait]
impl InventoryImporter for InventoryImporterImpl {
    #[instrument(skip(self))]
    async fn import_from_file(&self, file_path: PathBuf) -> ImportResult<InventoryImport> {
        let start_time = Instant::now();
        let source = file_path.display().to_string();
        info!(file_path = %source, "开始导入库存数据");

        // 文件解析为阻塞 IO，放到 blocking 线程
        let parser = Arc::clone(&self.file_parser);
        let table = tokio::task::spawn_blocking(move || parser.parse_file(&file_path))
            .await
            .map_err(|e| ImportError::InternalError(format!("解析任务失败: {}", e)))??;

        self.finish(table, source, start_time)
    }

    async fn batch_import(&self, file_paths: Vec<PathBuf>) -> Vec<Result<InventoryImport, String>> {
        let tasks = file_paths.into_iter().map(|path| async move {
            self.import_from_file(path.clone()).await.map_err(|e| {
                error!(file_path = %path.display(), error = %e, "文件导入失败");
                format!("{}: {}", path.display(), e)
            })
        });
        join_all(tasks).await
    }
}
