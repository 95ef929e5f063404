// ==========================================
// Excel 订单行导入 - API 层错误类型
// ==========================================
// 职责: 将导入管道/仓储层错误转换为宿主可展示的错误
// 约定: 导入失败携带分类、行号、字段与本地化提示
// ==========================================

use crate::domain::types::ErrorCategory;
use crate::i18n::DEFAULT_LOCALE;
use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API 层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 导入错误
    // ==========================================
    /// 导入失败（message 为面向用户的本地化多行提示）
    #[error("导入失败 [{category}]: {message}")]
    ImportFailed {
        category: ErrorCategory,
        row: Option<usize>,
        field: Option<String>,
        message: String,
    },

    // ==========================================
    // 请求错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据验证失败: {0}")]
    ValidationError(String),

    #[error("配置错误: {0}")]
    ConfigError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),
}

impl ApiError {
    /// 转换导入错误（指定提示语言）
    pub fn from_import(err: ImportError, locale: &str) -> Self {
        ApiError::ImportFailed {
            category: err.category(),
            row: err.row_number(),
            field: err.field().map(str::to_string),
            message: err.user_message(locale),
        }
    }

    /// 导入失败的错误分类
    pub fn category(&self) -> Option<ErrorCategory> {
        match self {
            ApiError::ImportFailed { category, .. } => Some(*category),
            _ => None,
        }
    }
}

// ==========================================
// 从 ImportError 转换（默认语言）
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        ApiError::from_import(err, DEFAULT_LOCALE)
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::DatabaseTransactionError(msg) => {
                ApiError::DatabaseError(format!("事务失败: {}", msg))
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::ValidationError(format!("外键约束违反: {}", msg))
            }
            RepositoryError::ValidationError(msg) => ApiError::ValidationError(msg),
            RepositoryError::RecordRejected { row, message } => {
                ApiError::ValidationError(format!("第 {} 行写入被拒绝: {}", row, message))
            }
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::error::RowErrorKind;

    #[test]
    fn test_import_error_conversion_keeps_location() {
        let err = ImportError::row_validation(
            4,
            "CANTIDAD",
            RowErrorKind::NumericFormat {
                value: "diez".to_string(),
            },
        );
        let api_err = ApiError::from_import(err, "en");
        match &api_err {
            ApiError::ImportFailed {
                category,
                row,
                field,
                message,
            } => {
                assert_eq!(*category, ErrorCategory::RowValidation);
                assert_eq!(*row, Some(4));
                assert_eq!(field.as_deref(), Some("CANTIDAD"));
                assert!(message.contains("diez"));
            }
            other => panic!("unexpected: {:?}", other),
        }
        assert_eq!(api_err.category(), Some(ErrorCategory::RowValidation));
    }

    #[test]
    fn test_repository_error_conversion() {
        let repo_err = RepositoryError::RecordRejected {
            row: 7,
            message: "FOREIGN KEY constraint failed".to_string(),
        };
        let api_err: ApiError = repo_err.into();
        match api_err {
            ApiError::ValidationError(msg) => {
                assert!(msg.contains('7'));
                assert!(msg.contains("FOREIGN KEY"));
            }
            other => panic!("unexpected: {:?}", other),
        }

        let api_err: ApiError =
            RepositoryError::DatabaseTransactionError("disk I/O error".to_string()).into();
        assert!(matches!(api_err, ApiError::DatabaseError(_)));

        let api_err: ApiError = RepositoryError::LockError("poisoned".to_string()).into();
        assert!(matches!(api_err, ApiError::DatabaseConnectionError(_)));
        assert_eq!(api_err.category(), None);
    }
}
