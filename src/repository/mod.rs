// ==========================================
// Excel 订单行导入 - 数据仓储层
// ==========================================
// 职责: 产品目录端口 / 单据行协作方端口及其实现
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod catalog_repo;
pub mod catalog_repo_impl;
pub mod error;
pub mod line_repo;
pub mod line_repo_impl;
pub mod memory;

// 重导出核心仓储
pub use catalog_repo::CatalogPort;
pub use catalog_repo_impl::SqliteCatalogRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use line_repo::DocumentLineRepository;
pub use line_repo_impl::SqliteLineRepository;
pub use memory::{InMemoryCatalog, InMemoryLineRepository};
