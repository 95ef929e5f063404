// ==========================================
// Excel 订单行导入 - 内存版目录 / 单据行协作方
// ==========================================
// 用途: 无数据库环境下驱动导入管道（单元测试、预检、嵌入式宿主）
// 说明: 支持注入失败，用于验证目录/协作方拒绝时的错误路径
// ==========================================

use crate::domain::line::{LineItem, NewProduct, ProductRef};
use crate::domain::types::{DocumentRef, RecordId};
use crate::repository::catalog_repo::CatalogPort;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::line_repo::DocumentLineRepository;
use std::sync::{Mutex, MutexGuard};

fn lock<T>(mutex: &Mutex<T>) -> RepositoryResult<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|e| RepositoryError::LockError(e.to_string()))
}

// ==========================================
// InMemoryCatalog - 内存产品目录
// ==========================================
#[derive(Debug, Default)]
struct CatalogState {
    products: Vec<ProductRef>,
    next_id: RecordId,
    create_calls: usize,
    lookup_calls: usize,
    fail_reads: bool,
    fail_writes: bool,
}

#[derive(Debug)]
pub struct InMemoryCatalog {
    state: Mutex<CatalogState>,
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(CatalogState {
                next_id: 1,
                ..CatalogState::default()
            }),
        }
    }

    /// 以 (编码, 名称) 列表预置产品，ID 从 1 递增
    pub fn with_products<I, S>(products: I) -> Self
    where
        I: IntoIterator<Item = (Option<S>, S)>,
        S: Into<String>,
    {
        let catalog = Self::new();
        if let Ok(mut state) = catalog.state.lock() {
            for (code, name) in products {
                let id = state.next_id;
                state.next_id += 1;
                state.products.push(ProductRef {
                    id,
                    code: code.map(Into::into),
                    name: name.into(),
                });
            }
        }
        catalog
    }

    /// 之后的查询全部失败
    pub fn fail_reads(self) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.fail_reads = true;
        }
        self
    }

    /// 之后的新建全部失败
    pub fn fail_writes(self) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.fail_writes = true;
        }
        self
    }

    /// 目录中全部产品（按 ID 升序）
    pub fn products(&self) -> Vec<ProductRef> {
        self.state
            .lock()
            .map(|s| s.products.clone())
            .unwrap_or_default()
    }

    /// 累计 create 调用次数（含失败调用）
    pub fn create_calls(&self) -> usize {
        self.state.lock().map(|s| s.create_calls).unwrap_or(0)
    }

    /// 累计查询调用次数
    pub fn lookup_calls(&self) -> usize {
        self.state.lock().map(|s| s.lookup_calls).unwrap_or(0)
    }

    fn find_first<F>(&self, predicate: F) -> RepositoryResult<Option<ProductRef>>
    where
        F: Fn(&ProductRef) -> bool,
    {
        let mut state = lock(&self.state)?;
        state.lookup_calls += 1;
        if state.fail_reads {
            return Err(RepositoryError::DatabaseQueryError(
                "catalog unavailable".to_string(),
            ));
        }
        Ok(state.products.iter().find(|&p| predicate(p)).cloned())
    }
}

impl CatalogPort for InMemoryCatalog {
    fn find_by_code(&self, code: &str) -> RepositoryResult<Option<ProductRef>> {
        self.find_first(|p| p.code.as_deref() == Some(code))
    }

    fn find_by_name(&self, name: &str) -> RepositoryResult<Option<ProductRef>> {
        self.find_first(|p| p.name == name)
    }

    fn find_by_name_fuzzy(&self, name: &str) -> RepositoryResult<Option<ProductRef>> {
        let needle = name.to_lowercase();
        self.find_first(|p| p.name.to_lowercase().contains(&needle))
    }

    fn create(&self, product: NewProduct) -> RepositoryResult<ProductRef> {
        let mut state = lock(&self.state)?;
        state.create_calls += 1;
        if state.fail_writes {
            return Err(RepositoryError::ValidationError(format!(
                "catalog rejected product '{}'",
                product.name
            )));
        }
        let id = state.next_id;
        state.next_id += 1;
        let created = ProductRef {
            id,
            code: product.code,
            name: product.name,
        };
        state.products.push(created.clone());
        Ok(created)
    }
}

// ==========================================
// InMemoryLineRepository - 内存单据行协作方
// ==========================================
#[derive(Debug, Default)]
struct LineState {
    lines: Vec<(RecordId, LineItem)>,
    next_id: RecordId,
    reject_source_row: Option<usize>,
    batches: usize,
}

#[derive(Debug)]
pub struct InMemoryLineRepository {
    state: Mutex<LineState>,
}

impl Default for InMemoryLineRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryLineRepository {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LineState {
                next_id: 1,
                ..LineState::default()
            }),
        }
    }

    /// 拒绝来源行号为 row 的单据行（整批不落地）
    pub fn reject_source_row(self, row: usize) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.reject_source_row = Some(row);
        }
        self
    }

    /// 已写入的全部单据行
    pub fn all_lines(&self) -> Vec<(RecordId, LineItem)> {
        self.state
            .lock()
            .map(|s| s.lines.clone())
            .unwrap_or_default()
    }

    /// 成功提交的批次数
    pub fn batches(&self) -> usize {
        self.state.lock().map(|s| s.batches).unwrap_or(0)
    }
}

impl DocumentLineRepository for InMemoryLineRepository {
    fn create_line(&self, line: &LineItem) -> RepositoryResult<RecordId> {
        let ids = self.create_lines(std::slice::from_ref(line))?;
        ids.first()
            .copied()
            .ok_or_else(|| RepositoryError::InternalError("no id assigned".to_string()))
    }

    fn create_lines(&self, lines: &[LineItem]) -> RepositoryResult<Vec<RecordId>> {
        let mut state = lock(&self.state)?;

        // 先整体检查，保证批次原子性
        if let Some(rejected) = state.reject_source_row {
            if let Some(line) = lines.iter().find(|l| l.source_row == rejected) {
                return Err(RepositoryError::RecordRejected {
                    row: line.source_row,
                    message: format!("line for product {} rejected", line.product_id),
                });
            }
        }

        let mut ids = Vec::with_capacity(lines.len());
        for line in lines {
            let id = state.next_id;
            state.next_id += 1;
            state.lines.push((id, line.clone()));
            ids.push(id);
        }
        state.batches += 1;
        Ok(ids)
    }

    fn list_lines(&self, document: DocumentRef) -> RepositoryResult<Vec<(RecordId, LineItem)>> {
        let state = lock(&self.state)?;
        Ok(state
            .lines
            .iter()
            .filter(|(_, line)| line.document == document)
            .cloned()
            .collect())
    }
}
