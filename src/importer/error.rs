// ==========================================
// Excel 订单行导入 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 对外契约: category() 分类 + user_message() 多行用户提示（行号/字段/实际值/期望值）
// ==========================================

use crate::domain::types::{format_number, ErrorCategory};
use crate::i18n::t_with_args_in;
use thiserror::Error;

// ==========================================
// 行校验失败子类型
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub enum RowErrorKind {
    MissingField,                                      // 必填字段为空
    ZeroForbidden { value: String },                   // 描述/编码字段为 0
    SentinelError { marker: String },                  // 公式错误标记
    NumericFormat { value: String },                   // 数值无法解析
    Range { value: f64, rule: RangeRule },             // 数值越界
    SubtotalMismatch { computed: f64, declared: f64 }, // 数量 × 单价 ≠ 小计
}

/// 数值范围规则
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RangeRule {
    GreaterThan(f64), // > bound
    AtLeast(f64),     // >= bound
}

impl RangeRule {
    pub fn accepts(&self, value: f64) -> bool {
        match self {
            RangeRule::GreaterThan(bound) => value > *bound,
            RangeRule::AtLeast(bound) => value >= *bound,
        }
    }

    /// 期望值描述（本地化）
    pub fn describe(&self, locale: &str) -> String {
        match self {
            RangeRule::GreaterThan(bound) => t_with_args_in(
                locale,
                "range.greater_than",
                &[("bound", &format_number(*bound))],
            ),
            RangeRule::AtLeast(bound) => t_with_args_in(
                locale,
                "range.at_least",
                &[("bound", &format_number(*bound))],
            ),
        }
    }
}

impl std::fmt::Display for RangeRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RangeRule::GreaterThan(bound) => write!(f, "> {}", format_number(*bound)),
            RangeRule::AtLeast(bound) => write!(f, ">= {}", format_number(*bound)),
        }
    }
}

/// 产品查找方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductLookup {
    Name,
    Code,
}

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("未上传文件")]
    MissingFile,

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("工作表不存在: {sheet}（现有: {}）", .available.join(", "))]
    SheetNotFound {
        sheet: String,
        available: Vec<String>,
    },

    // ===== 表结构错误 =====
    #[error("缺少必需列: {}（已找到: {}）", .missing.join(", "), .found.join(", "))]
    SchemaError {
        missing: Vec<String>,
        found: Vec<String>,
    },

    // ===== 行校验错误 =====
    #[error("行校验失败 (行 {row}, 字段 {field}): {kind:?}")]
    RowValidation {
        row: usize,
        field: String,
        kind: RowErrorKind,
    },

    // ===== 产品匹配错误 =====
    #[error("产品未找到 (行 {row}, {lookup:?}): {value}")]
    ProductNotFound {
        row: usize,
        lookup: ProductLookup,
        value: String,
    },

    #[error("产品目录查询失败 (行 {row}): {message}")]
    CatalogReadError { row: usize, message: String },

    #[error("产品目录拒绝新建 (行 {row}, 编码 {code}): {message}")]
    CatalogWriteError {
        row: usize,
        code: String,
        message: String,
    },

    // ===== 协作方错误 =====
    #[error("单据行写入被拒绝 (单据 {document}, 行 {row:?}): {message}")]
    CollaboratorWriteError {
        row: Option<usize>,
        document: String,
        message: String,
    },

    // ===== 配置错误 =====
    #[error("配置读取失败 (key: {key}): {message}")]
    ConfigReadError { key: String, message: String },
}

impl ImportError {
    pub fn row_validation(row: usize, field: &str, kind: RowErrorKind) -> Self {
        ImportError::RowValidation {
            row,
            field: field.to_string(),
            kind,
        }
    }

    /// 错误分类
    pub fn category(&self) -> ErrorCategory {
        match self {
            ImportError::MissingFile
            | ImportError::FileReadError(_)
            | ImportError::SheetNotFound { .. } => ErrorCategory::FileRead,
            ImportError::SchemaError { .. } => ErrorCategory::Schema,
            ImportError::RowValidation { .. } => ErrorCategory::RowValidation,
            ImportError::ProductNotFound { .. } => ErrorCategory::ProductNotFound,
            ImportError::CatalogReadError { .. } => ErrorCategory::CatalogRead,
            ImportError::CatalogWriteError { .. } => ErrorCategory::CatalogWrite,
            ImportError::CollaboratorWriteError { .. } => ErrorCategory::CollaboratorWrite,
            ImportError::ConfigReadError { .. } => ErrorCategory::Config,
        }
    }

    /// 出错的表格行号（若与行相关）
    pub fn row_number(&self) -> Option<usize> {
        match self {
            ImportError::RowValidation { row, .. }
            | ImportError::ProductNotFound { row, .. }
            | ImportError::CatalogReadError { row, .. }
            | ImportError::CatalogWriteError { row, .. } => Some(*row),
            ImportError::CollaboratorWriteError { row, .. } => *row,
            _ => None,
        }
    }

    /// 出错的字段（若与字段相关）
    pub fn field(&self) -> Option<&str> {
        match self {
            ImportError::RowValidation { field, .. } => Some(field),
            _ => None,
        }
    }

    /// 面向用户的多行提示
    ///
    /// # 参数
    /// - locale: 语言代码（不支持的语言回退西语）
    pub fn user_message(&self, locale: &str) -> String {
        match self {
            ImportError::MissingFile => t_with_args_in(locale, "errors.missing_file", &[]),
            ImportError::FileReadError(detail) => {
                t_with_args_in(locale, "errors.file_read", &[("detail", detail)])
            }
            ImportError::SheetNotFound { sheet, available } => t_with_args_in(
                locale,
                "errors.sheet_not_found",
                &[("sheet", sheet), ("available", &available.join(", "))],
            ),
            ImportError::SchemaError { missing, found } => t_with_args_in(
                locale,
                "errors.schema",
                &[("missing", &missing.join(", ")), ("found", &found.join(", "))],
            ),
            ImportError::RowValidation { row, field, kind } => {
                let row = row.to_string();
                match kind {
                    RowErrorKind::MissingField => t_with_args_in(
                        locale,
                        "errors.missing_field",
                        &[("field", field), ("row", &row)],
                    ),
                    RowErrorKind::ZeroForbidden { value } => t_with_args_in(
                        locale,
                        "errors.zero_forbidden",
                        &[("row", &row), ("field", field), ("value", value)],
                    ),
                    RowErrorKind::SentinelError { marker } => t_with_args_in(
                        locale,
                        "errors.sentinel",
                        &[("row", &row), ("field", field), ("marker", marker)],
                    ),
                    RowErrorKind::NumericFormat { value } => t_with_args_in(
                        locale,
                        "errors.numeric_format",
                        &[("row", &row), ("field", field), ("value", value)],
                    ),
                    RowErrorKind::Range { value, rule } => t_with_args_in(
                        locale,
                        "errors.range",
                        &[
                            ("row", &row),
                            ("field", field),
                            ("value", &format_number(*value)),
                            ("expected", &rule.describe(locale)),
                        ],
                    ),
                    RowErrorKind::SubtotalMismatch { computed, declared } => t_with_args_in(
                        locale,
                        "errors.subtotal_mismatch",
                        &[
                            ("row", &row),
                            ("computed", &format_number(*computed)),
                            ("declared", &format_number(*declared)),
                        ],
                    ),
                }
            }
            ImportError::ProductNotFound { row, lookup, value } => {
                let key = match lookup {
                    ProductLookup::Name => "errors.product_not_found_name",
                    ProductLookup::Code => "errors.product_not_found_code",
                };
                t_with_args_in(locale, key, &[("row", &row.to_string()), ("value", value)])
            }
            ImportError::CatalogReadError { row, message } => t_with_args_in(
                locale,
                "errors.catalog_read",
                &[("row", &row.to_string()), ("detail", message)],
            ),
            ImportError::CatalogWriteError { row, code, message } => t_with_args_in(
                locale,
                "errors.catalog_write",
                &[("row", &row.to_string()), ("code", code), ("detail", message)],
            ),
            ImportError::CollaboratorWriteError {
                row,
                document,
                message,
            } => {
                let row = row
                    .map(|r| r.to_string())
                    .unwrap_or_else(|| t_with_args_in(locale, "common.unknown_row", &[]));
                t_with_args_in(
                    locale,
                    "errors.collaborator_write",
                    &[("row", &row), ("document", document), ("detail", message)],
                )
            }
            ImportError::ConfigReadError { key, message } => t_with_args_in(
                locale,
                "errors.config",
                &[("key", key), ("detail", message)],
            ),
        }
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<base64::DecodeError>
impl From<base64::DecodeError> for ImportError {
    fn from(err: base64::DecodeError) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        assert_eq!(ImportError::MissingFile.category(), ErrorCategory::FileRead);
        assert_eq!(
            ImportError::SchemaError {
                missing: vec!["CANTIDAD".to_string()],
                found: vec![],
            }
            .category(),
            ErrorCategory::Schema
        );
        assert_eq!(
            ImportError::ProductNotFound {
                row: 2,
                lookup: ProductLookup::Code,
                value: "X1".to_string(),
            }
            .category(),
            ErrorCategory::ProductNotFound
        );
    }

    #[test]
    fn test_subtotal_mismatch_message() {
        let err = ImportError::row_validation(
            2,
            "SUBTOTAL",
            RowErrorKind::SubtotalMismatch {
                computed: 10.0,
                declared: 11.0,
            },
        );
        assert_eq!(err.row_number(), Some(2));
        assert_eq!(err.field(), Some("SUBTOTAL"));

        let msg = err.user_message("es");
        assert!(msg.contains("Línea 2"));
        assert!(msg.contains("(10)"));
        assert!(msg.contains("(11)"));
    }

    #[test]
    fn test_product_not_found_message_is_multiline() {
        let err = ImportError::ProductNotFound {
            row: 5,
            lookup: ProductLookup::Name,
            value: "Unknown Widget".to_string(),
        };
        let msg = err.user_message("es");
        assert!(msg.starts_with("Línea 5: Producto no encontrado\n\nNombre: 'Unknown Widget'"));
    }

    #[test]
    fn test_range_message_names_expected_value() {
        let err = ImportError::row_validation(
            3,
            "CANTIDAD",
            RowErrorKind::Range {
                value: 0.5,
                rule: RangeRule::AtLeast(1.0),
            },
        );
        let msg = err.user_message("en");
        assert!(msg.contains("CANTIDAD"));
        assert!(msg.contains("0.5"));
        assert!(msg.contains("1"));
    }

    #[test]
    fn test_range_rule_accepts() {
        assert!(RangeRule::GreaterThan(0.0).accepts(0.1));
        assert!(!RangeRule::GreaterThan(0.0).accepts(0.0));
        assert!(RangeRule::AtLeast(0.0).accepts(0.0));
        assert!(!RangeRule::AtLeast(1.0).accepts(0.99));
    }
}
