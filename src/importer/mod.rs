// ==========================================
// Excel 订单行导入 - 导入层
// ==========================================
// 职责: 表格文件 → 单据行（行处理管道）
// 支持: xlsx / xlsm / xls / ods, CSV, Base64 载荷
// ==========================================

// 模块声明
pub mod column_normalizer;
pub mod data_cleaner;
pub mod error;
pub mod file_parser;
pub mod line_importer_impl;
pub mod line_importer_trait;
pub mod line_materializer;
pub mod product_resolver;
pub mod row_filter;
pub mod row_validator;
pub mod schema_validator;
pub mod variant_profile;

// 重导出核心类型
pub use column_normalizer::{normalize_header, ColumnNormalizer as ColumnNormalizerImpl};
pub use data_cleaner::DataCleaner as DataCleanerImpl;
pub use error::{ImportError, ImportResult, ProductLookup, RangeRule, RowErrorKind};
pub use file_parser::{decode_base64_payload, CsvParser, ExcelParser, UniversalFileParser};
pub use line_importer_impl::LineImporterImpl;
pub use line_materializer::LineMaterializer as LineMaterializerImpl;
pub use product_resolver::ProductResolver as ProductResolverImpl;
pub use row_filter::RowFilter as RowFilterImpl;
pub use row_validator::RowValidator as RowValidatorImpl;
pub use schema_validator::SchemaValidator as SchemaValidatorImpl;
pub use variant_profile::{fields, VariantProfile};

// 重导出 Trait 接口
pub use line_importer_trait::{
    ColumnNormalizer, DataCleaner, FileParser, FilteredRows, LineImporter, LineMaterializer,
    ProductResolver, RowFilter, RowValidator, SchemaValidator,
};
