// ==========================================
// 咖啡拼配分析系统 - 导入层
// ==========================================
// 职责: 库存文件导入,生成规范批次目录
// 支持: Excel, CSV, 内存上传
// ==========================================

// 模块声明
pub mod catalog_builder;
pub mod data_cleaner;
pub mod dq_validator;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod inventory_importer;
pub mod inventory_importer_trait;

// 重导出核心类型
pub use catalog_builder::{CatalogBuild, CatalogBuilder};
pub use data_cleaner::DataCleaner;
pub use dq_validator::{DqValidator, RowVerdict};
pub use error::{ImportError, ImportResult};
pub use field_mapper::FieldMapper;
pub use file_parser::{CsvParser, ExcelParser, RawTable, UniversalFileParser};
pub use inventory_importer::{InventoryImport, InventoryImporterImpl};

// 重导出 Trait 接口
pub use inventory_importer_trait::{FileParser, InventoryImporter};
