// ==========================================
// Excel 订单行导入 - 核心库
// ==========================================
// 技术栈: Rust + calamine + SQLite
// 系统定位: 上传表格 → 校验 → 产品匹配 → 单据行落库
// 外部协作方: 宿主框架负责表单/菜单/权限，本库只负责行处理管道
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "es");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 产品目录 / 单据行协作方
pub mod repository;

// 导入层 - 行处理管道
pub mod importer;

// 配置层 - 导入参数
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA/建表）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 宿主调用入口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    CellValue, DocumentKind, DocumentRef, ImportOutcome, ImportPreview, ImportRequest,
    ImportVariant, LineItem, NewProduct, ProductRef, RecordId, ResolutionStrategy, RowIssue,
    TypedValue, ValidatedRow,
};

// 导入管道
pub use importer::{ImportError, ImportResult, LineImporter, LineImporterImpl};

// 仓储端口
pub use repository::{CatalogPort, DocumentLineRepository, RepositoryError};

// API
pub use api::{ApiError, ImportApi, ImportApiRequest, ImportApiResponse};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "Excel 订单行导入";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
