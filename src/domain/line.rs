// ==========================================
// Excel 订单行导入 - 导入请求 / 产品 / 单据行
// ==========================================
// 用途: 导入管道输入、输出与协作方交换的数据结构
// 红线: 本管道只新建单据行，不修改/删除已有单据行
// ==========================================

use crate::domain::types::{
    DocumentRef, ErrorCategory, ImportVariant, RecordId, TypedValue,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// ImportRequest - 导入请求
// ==========================================
// 由宿主在用户触发导入时构造，单次消费，不持久化
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRequest {
    #[serde(skip)]
    pub source_bytes: Vec<u8>,         // 表格文件内容（已解码）
    pub target_document_id: RecordId,  // 目标单据 ID
    pub sheet_name: Option<String>,    // 指定工作表（可选）
    pub file_name: Option<String>,     // 源文件名（用于格式判断与日志）
}

impl ImportRequest {
    pub fn new(source_bytes: Vec<u8>, target_document_id: RecordId) -> Self {
        Self {
            source_bytes,
            target_document_id,
            sheet_name: None,
            file_name: None,
        }
    }

    pub fn with_sheet_name(mut self, sheet_name: impl Into<String>) -> Self {
        self.sheet_name = Some(sheet_name.into());
        self
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }
}

// ==========================================
// ValidatedRow - 校验通过的数据行
// ==========================================
// 不变量: 必填字段齐全；数值字段满足范围约束；
//         若流程定义了小计，则 quantity * unit_price == subtotal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatedRow {
    pub row_number: usize,                    // 原始表格行号
    pub quantity: f64,                        // 数量
    pub unit_price: f64,                      // 单价
    pub subtotal: Option<f64>,                // 申报小计（仅定义小计的流程）
    pub fields: BTreeMap<String, TypedValue>, // 规范列名 → 类型化值（空值不收录）
}

impl ValidatedRow {
    pub fn number(&self, field: &str) -> Option<f64> {
        self.fields.get(field).and_then(TypedValue::as_number)
    }

    pub fn text(&self, field: &str) -> Option<String> {
        self.fields.get(field).map(TypedValue::as_text)
    }
}

// ==========================================
// ProductRef - 产品引用
// ==========================================
// 目录中已有产品（只读引用）或本次新建产品
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRef {
    pub id: RecordId,
    pub code: Option<String>,
    pub name: String,
}

/// 新建产品请求（仅 ExactCodeOrCreate 策略使用）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub code: Option<String>,
    pub list_price: f64,
    pub description: Option<String>,
}

// ==========================================
// LineItem - 单据行
// ==========================================
// 创建后所有权立即移交单据行协作方
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub document: DocumentRef,                                 // 父单据
    pub product_id: RecordId,                                  // 产品 ID
    pub quantity: f64,                                         // 数量
    pub unit_price: f64,                                       // 单价
    pub description: Option<String>,                           // 描述/变体说明
    pub extra_attributes: BTreeMap<String, serde_json::Value>, // 流程特有字段
    pub source_row: usize,                                     // 来源表格行号
}

// ==========================================
// ImportOutcome - 导入成功结果
// ==========================================
// 宿主收到即视为 “关闭/确认” 信号
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportOutcome {
    pub batch_id: String,                   // 本次导入批次 ID（UUID）
    pub variant: ImportVariant,             // 导入流程
    pub document: DocumentRef,              // 目标单据
    pub total_rows: usize,                  // 表格数据行数
    pub skipped_blank_rows: usize,          // 跳过的空白行
    pub skipped_zero_quantity_rows: usize,  // 跳过的数量为 0 的行
    pub line_ids: Vec<RecordId>,            // 新建单据行 ID
    pub lines: Vec<LineItem>,               // 新建单据行
    pub created_products: Vec<ProductRef>,  // 本次新建的产品
    pub imported_at: DateTime<Utc>,         // 完成时间
    pub elapsed_time: std::time::Duration,  // 耗时
}

impl ImportOutcome {
    pub fn lines_created(&self) -> usize {
        self.line_ids.len()
    }
}

// ==========================================
// RowIssue - 预检问题记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowIssue {
    pub row_number: usize,       // 原始表格行号
    pub field: Option<String>,   // 问题字段
    pub category: ErrorCategory, // 问题分类
    pub message: String,         // 面向用户的描述
}

// ==========================================
// ImportPreview - 预检结果（只读，不写目录/单据）
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportPreview {
    pub variant: ImportVariant,
    pub total_rows: usize,
    pub valid_rows: usize,
    pub skipped_blank_rows: usize,
    pub skipped_zero_quantity_rows: usize,
    pub products_to_create: Vec<String>, // 将被新建的产品编码（去重，按首次出现顺序）
    pub issues: Vec<RowIssue>,
}

impl ImportPreview {
    /// 预检通过即正式导入不会因行数据失败
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}
