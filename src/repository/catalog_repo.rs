// ==========================================
// Excel 订单行导入 - 产品目录端口 Trait
// ==========================================
// 职责: 定义导入管道访问产品目录的唯一接口（不包含实现）
// 红线: 管道核心只依赖本接口，任何存储后端均可实现
// ==========================================

use crate::domain::line::{NewProduct, ProductRef};
use crate::repository::error::RepositoryResult;

// ==========================================
// CatalogPort Trait
// ==========================================
// 用途: 产品查找 / 新建
// 实现者: SqliteCatalogRepository, InMemoryCatalog
pub trait CatalogPort: Send + Sync {
    /// 按产品编码精确查找
    ///
    /// # 返回
    /// - Ok(Some(ProductRef)): 命中（多条命中时取 ID 最小者）
    /// - Ok(None): 未命中
    fn find_by_code(&self, code: &str) -> RepositoryResult<Option<ProductRef>>;

    /// 按产品名称精确查找（区分大小写）
    fn find_by_name(&self, name: &str) -> RepositoryResult<Option<ProductRef>>;

    /// 按产品名称模糊查找（名称包含关键字，不区分大小写）
    fn find_by_name_fuzzy(&self, name: &str) -> RepositoryResult<Option<ProductRef>>;

    /// 新建产品
    ///
    /// # 返回
    /// - Ok(ProductRef): 新建产品引用（此后归目录所有）
    /// - Err: 目录拒绝创建
    fn create(&self, product: NewProduct) -> RepositoryResult<ProductRef>;
}
