// ==========================================
// Excel 订单行导入 - 单据行 Repository 实现
// ==========================================
// 职责: 基于 purchase_requisition_line / sale_order_line 实现 DocumentLineRepository
// 红线: 一次导入的单据行在同一事务中写入，任一行被拒绝则整批回滚
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::line::LineItem;
use crate::domain::types::{DocumentKind, DocumentRef, RecordId};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::line_repo::DocumentLineRepository;
use rusqlite::{params, Connection, Transaction};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

// ==========================================
// SqliteLineRepository
// ==========================================
pub struct SqliteLineRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteLineRepository {
    /// 创建新的 Repository 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 在事务中插入一条单据行
    fn insert_line_tx(tx: &Transaction, line: &LineItem) -> RepositoryResult<RecordId> {
        match line.document.kind {
            DocumentKind::PurchaseRequisition => {
                tx.execute(
                    r#"
                    INSERT INTO purchase_requisition_line (
                        requisition_id, product_id, product_qty, price_unit,
                        product_description_variants, source_row
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                    "#,
                    params![
                        line.document.id,
                        line.product_id,
                        line.quantity,
                        line.unit_price,
                        line.description,
                        line.source_row as i64,
                    ],
                )?;
            }
            DocumentKind::SaleOrder => {
                let extra_json = serde_json::to_string(&line.extra_attributes)
                    .map_err(|e| RepositoryError::ValidationError(e.to_string()))?;
                tx.execute(
                    r#"
                    INSERT INTO sale_order_line (
                        order_id, product_id, product_uom_qty, price_unit,
                        name, extra_json, source_row
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                    "#,
                    params![
                        line.document.id,
                        line.product_id,
                        line.quantity,
                        line.unit_price,
                        line.description,
                        extra_json,
                        line.source_row as i64,
                    ],
                )?;
            }
        }
        Ok(tx.last_insert_rowid())
    }

    /// 在事务中批量插入单据行
    fn batch_insert_lines_tx(
        tx: &Transaction,
        lines: &[LineItem],
    ) -> RepositoryResult<Vec<RecordId>> {
        let mut ids = Vec::with_capacity(lines.len());
        for line in lines {
            let id = Self::insert_line_tx(tx, line).map_err(|e| {
                RepositoryError::RecordRejected {
                    row: line.source_row,
                    message: e.to_string(),
                }
            })?;
            ids.push(id);
        }
        Ok(ids)
    }
}

impl DocumentLineRepository for SqliteLineRepository {
    fn create_line(&self, line: &LineItem) -> RepositoryResult<RecordId> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;
        let id = Self::insert_line_tx(&tx, line)?;
        tx.commit()?;
        Ok(id)
    }

    fn create_lines(&self, lines: &[LineItem]) -> RepositoryResult<Vec<RecordId>> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;
        // 出错时 tx 被 drop，自动回滚
        let ids = Self::batch_insert_lines_tx(&tx, lines)?;
        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(ids)
    }

    fn list_lines(&self, document: DocumentRef) -> RepositoryResult<Vec<(RecordId, LineItem)>> {
        let conn = self.get_conn()?;
        let mut result = Vec::new();

        match document.kind {
            DocumentKind::PurchaseRequisition => {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT id, product_id, product_qty, price_unit,
                           product_description_variants, source_row
                    FROM purchase_requisition_line
                    WHERE requisition_id = ?1
                    ORDER BY id
                    "#,
                )?;
                let rows = stmt.query_map(params![document.id], |row| {
                    let source_row: i64 = row.get(5)?;
                    Ok((
                        row.get::<_, RecordId>(0)?,
                        LineItem {
                            document,
                            product_id: row.get(1)?,
                            quantity: row.get(2)?,
                            unit_price: row.get(3)?,
                            description: row.get(4)?,
                            extra_attributes: BTreeMap::new(),
                            source_row: source_row as usize,
                        },
                    ))
                })?;
                for row in rows {
                    result.push(row?);
                }
            }
            DocumentKind::SaleOrder => {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT id, product_id, product_uom_qty, price_unit,
                           name, extra_json, source_row
                    FROM sale_order_line
                    WHERE order_id = ?1
                    ORDER BY id
                    "#,
                )?;
                let rows = stmt.query_map(params![document.id], |row| {
                    let extra_json: String = row.get(5)?;
                    let source_row: i64 = row.get(6)?;
                    Ok((
                        row.get::<_, RecordId>(0)?,
                        extra_json,
                        LineItem {
                            document,
                            product_id: row.get(1)?,
                            quantity: row.get(2)?,
                            unit_price: row.get(3)?,
                            description: row.get(4)?,
                            extra_attributes: BTreeMap::new(),
                            source_row: source_row as usize,
                        },
                    ))
                })?;
                for row in rows {
                    let (id, extra_json, mut line) = row?;
                    line.extra_attributes = serde_json::from_str(&extra_json)
                        .map_err(|e| RepositoryError::DatabaseQueryError(e.to_string()))?;
                    result.push((id, line));
                }
            }
        }

        Ok(result)
    }
}
