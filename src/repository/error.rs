// ==========================================
// Excel 订单行导入 - 仓储层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 仓储层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== 数据库错误 =====
    #[error("数据库锁获取失败: {0}")]
    LockError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    #[error("数据库查询失败: {0}")]
    DatabaseQueryError(String),

    #[error("外键约束违反: {0}")]
    ForeignKeyViolation(String),

    // ===== 写入拒绝 =====
    #[error("数据验证失败: {0}")]
    ValidationError(String),

    /// 批量写入时某一行被拒绝（携带来源表格行号，整批回滚）
    #[error("第 {row} 行写入被拒绝: {message}")]
    RecordRejected { row: usize, message: String },

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),
}

impl RepositoryError {
    /// 被拒绝记录的来源行号（若有）
    pub fn rejected_row(&self) -> Option<usize> {
        match self {
            RepositoryError::RecordRejected { row, .. } => Some(*row),
            _ => None,
        }
    }
}

// 实现 From<rusqlite::Error>
impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(_, Some(msg)) => {
                if msg.contains("FOREIGN KEY") {
                    RepositoryError::ForeignKeyViolation(msg)
                } else {
                    RepositoryError::DatabaseQueryError(msg)
                }
            }
            _ => RepositoryError::DatabaseQueryError(err.to_string()),
        }
    }
}

/// Result 类型别名
pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_row() {
        let err = RepositoryError::RecordRejected {
            row: 5,
            message: "FOREIGN KEY constraint failed".to_string(),
        };
        assert_eq!(err.rejected_row(), Some(5));
        assert_eq!(
            RepositoryError::LockError("poisoned".to_string()).rejected_row(),
            None
        );
    }

    #[test]
    fn test_from_rusqlite_no_rows() {
        let err: RepositoryError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, RepositoryError::DatabaseQueryError(_)));
    }
}
