// ==========================================
// Excel 订单行导入 - 单据行协作方 Trait
// ==========================================
// 职责: 定义单据行写入/查询接口（不包含实现）
// 红线: 只新建单据行，不修改/删除已有单据行
// ==========================================

use crate::domain::line::LineItem;
use crate::domain::types::{DocumentRef, RecordId};
use crate::repository::error::RepositoryResult;

// ==========================================
// DocumentLineRepository Trait
// ==========================================
// 用途: 父单据的单据行集合
// 实现者: SqliteLineRepository, InMemoryLineRepository
pub trait DocumentLineRepository: Send + Sync {
    /// 新建一条单据行
    ///
    /// # 返回
    /// - Ok(RecordId): 新建单据行 ID
    /// - Err: 协作方拒绝写入
    fn create_line(&self, line: &LineItem) -> RepositoryResult<RecordId>;

    /// 批量新建单据行（一次导入的全部行）
    ///
    /// 默认实现逐行调用 create_line；支持事务的实现应覆写为整批原子写入。
    /// 失败时返回 RecordRejected 以携带来源行号。
    fn create_lines(&self, lines: &[LineItem]) -> RepositoryResult<Vec<RecordId>> {
        let mut ids = Vec::with_capacity(lines.len());
        for line in lines {
            let id = self.create_line(line).map_err(|e| match e {
                rejected @ crate::repository::RepositoryError::RecordRejected { .. } => rejected,
                other => crate::repository::RepositoryError::RecordRejected {
                    row: line.source_row,
                    message: other.to_string(),
                },
            })?;
            ids.push(id);
        }
        Ok(ids)
    }

    /// 查询单据下的全部单据行（按 ID 升序）
    fn list_lines(&self, document: DocumentRef) -> RepositoryResult<Vec<(RecordId, LineItem)>>;
}
