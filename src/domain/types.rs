// ==========================================
// Excel 订单行导入 - 领域类型定义
// ==========================================
// 职责: 导入流程 / 产品匹配策略 / 单据类型 / 单元格值
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// 记录标识（产品 / 单据 / 单据行）
pub type RecordId = i64;

// ==========================================
// 导入流程 (Import Variant)
// ==========================================
// 三条导入流程共享同一管道，差异在列结构与产品匹配策略
// 复杂销售订单有两种版式：标准版式 / 导出版式（多一列产品名，且必须位于指定工作表）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportVariant {
    Requisition,            // 采购申请行导入
    SimpleSaleOrder,        // 简单销售订单行导入
    ComplexSaleOrder,       // 复杂销售订单行导入（标准版式）
    ComplexSaleOrderExport, // 复杂销售订单行导入（导出版式）
}

impl fmt::Display for ImportVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl ImportVariant {
    /// 从字符串解析导入流程
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "REQUISITION" => Some(ImportVariant::Requisition),
            "SIMPLE_SALE_ORDER" => Some(ImportVariant::SimpleSaleOrder),
            "COMPLEX_SALE_ORDER" => Some(ImportVariant::ComplexSaleOrder),
            "COMPLEX_SALE_ORDER_EXPORT" => Some(ImportVariant::ComplexSaleOrderExport),
            _ => None,
        }
    }

    /// 转换为存储/日志使用的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ImportVariant::Requisition => "REQUISITION",
            ImportVariant::SimpleSaleOrder => "SIMPLE_SALE_ORDER",
            ImportVariant::ComplexSaleOrder => "COMPLEX_SALE_ORDER",
            ImportVariant::ComplexSaleOrderExport => "COMPLEX_SALE_ORDER_EXPORT",
        }
    }

    /// 目标单据类型
    pub fn document_kind(&self) -> DocumentKind {
        match self {
            ImportVariant::Requisition => DocumentKind::PurchaseRequisition,
            _ => DocumentKind::SaleOrder,
        }
    }

    /// 产品匹配策略
    pub fn strategy(&self) -> ResolutionStrategy {
        match self {
            ImportVariant::Requisition => ResolutionStrategy::ExactNameThenFuzzy,
            ImportVariant::SimpleSaleOrder => ResolutionStrategy::ExactCodeOnly,
            ImportVariant::ComplexSaleOrder | ImportVariant::ComplexSaleOrderExport => {
                ResolutionStrategy::ExactCodeOrCreate
            }
        }
    }
}

// ==========================================
// 产品匹配策略 (Resolution Strategy)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResolutionStrategy {
    ExactNameThenFuzzy, // 名称精确匹配 → 名称包含匹配，找不到即报错
    ExactCodeOnly,      // 编码精确匹配，找不到即报错
    ExactCodeOrCreate,  // 编码精确匹配，找不到则新建产品
}

impl fmt::Display for ResolutionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionStrategy::ExactNameThenFuzzy => write!(f, "EXACT_NAME_THEN_FUZZY"),
            ResolutionStrategy::ExactCodeOnly => write!(f, "EXACT_CODE_ONLY"),
            ResolutionStrategy::ExactCodeOrCreate => write!(f, "EXACT_CODE_OR_CREATE"),
        }
    }
}

impl ResolutionStrategy {
    /// 该策略是否会写产品目录
    pub fn creates_products(&self) -> bool {
        matches!(self, ResolutionStrategy::ExactCodeOrCreate)
    }
}

// ==========================================
// 单据类型 (Document Kind)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentKind {
    PurchaseRequisition, // 采购申请
    SaleOrder,           // 销售订单
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl DocumentKind {
    /// 转换为存储/日志使用的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            DocumentKind::PurchaseRequisition => "PURCHASE_REQUISITION",
            DocumentKind::SaleOrder => "SALE_ORDER",
        }
    }
}

/// 父单据引用
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentRef {
    pub kind: DocumentKind,
    pub id: RecordId,
}

impl DocumentRef {
    pub fn new(kind: DocumentKind, id: RecordId) -> Self {
        Self { kind, id }
    }
}

impl fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.kind, self.id)
    }
}

// ==========================================
// 单元格值 (Cell Value)
// ==========================================
// 原始表格单元格只有三种形态，类型在行校验边界显式解析
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum CellValue {
    Number(f64),
    Text(String),
    Empty,
}

impl CellValue {
    /// 从文本构造（空白文本视为 Empty）
    pub fn from_text(value: &str) -> Self {
        if value.trim().is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(value.to_string())
        }
    }

    /// 是否为空（Empty 或仅含空白的文本）
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(_) => false,
        }
    }

    /// 转为去除首尾空白的文本（数值按表格显示习惯格式化，空值返回 None）
    pub fn as_trimmed_text(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            CellValue::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            CellValue::Number(n) => Some(format_number(*n)),
        }
    }

    /// 原始值的展示形式（用于错误信息）
    pub fn display_value(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => format_number(*n),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_value())
    }
}

// ==========================================
// 校验后字段值 (Typed Value)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypedValue {
    Number(f64),
    Text(String),
}

impl TypedValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            TypedValue::Number(n) => Some(*n),
            TypedValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> String {
        match self {
            TypedValue::Number(n) => format_number(*n),
            TypedValue::Text(s) => s.clone(),
        }
    }

    /// 转为 JSON 值（写入单据行扩展属性）
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            TypedValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            TypedValue::Text(s) => serde_json::Value::String(s.clone()),
        }
    }
}

/// 数值格式化：整数值不带小数部分（1001.0 → "1001"），-0 归一为 0
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else {
        value.to_string()
    }
}

// ==========================================
// 错误分类 (Error Category)
// ==========================================
// 对外契约: 宿主按分类决定提示样式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    FileRead,          // 文件无法解码/解析，或缺少指定工作表
    Schema,            // 缺少必需列
    RowValidation,     // 行校验失败
    ProductNotFound,   // 产品未找到
    CatalogRead,       // 产品目录查询失败
    CatalogWrite,      // 产品目录拒绝新建
    CollaboratorWrite, // 单据行协作方拒绝写入
    Config,            // 配置读取失败
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCategory::FileRead => "FILE_READ",
            ErrorCategory::Schema => "SCHEMA",
            ErrorCategory::RowValidation => "ROW_VALIDATION",
            ErrorCategory::ProductNotFound => "PRODUCT_NOT_FOUND",
            ErrorCategory::CatalogRead => "CATALOG_READ",
            ErrorCategory::CatalogWrite => "CATALOG_WRITE",
            ErrorCategory::CollaboratorWrite => "COLLABORATOR_WRITE",
            ErrorCategory::Config => "CONFIG",
        };
        write!(f, "{}", s)
    }
}
