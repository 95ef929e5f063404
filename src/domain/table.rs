// ==========================================
// Excel 订单行导入 - 表格中间结构
// ==========================================
// 用途: 文件解析 → 列名规范化 之间的中间产物
// 生命周期: 仅在单次导入调用内
// ==========================================

use crate::domain::types::CellValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

static EMPTY_CELL: CellValue = CellValue::Empty;

// ==========================================
// RawTable - 原始表格
// ==========================================
// headers 保留原始表头文本；rows 不含表头行
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawTable {
    pub sheet_name: Option<String>, // 来源工作表（CSV 为 None）
    pub headers: Vec<String>,       // 原始表头
    pub rows: Vec<Vec<CellValue>>,  // 数据行（按列位置对齐表头）
    pub header_row: u32,            // 表头所在行（1 起始）
}

impl RawTable {
    /// 数据行下标 → 表格中的行号（表头在第 1 行时，下标 0 对应第 2 行）
    pub fn row_number(&self, index: usize) -> usize {
        self.header_row as usize + 1 + index
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ==========================================
// NormalizedRow - 规范化后的数据行
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NormalizedRow {
    pub row_number: usize,                   // 原始表格行号（用于错误信息）
    pub cells: BTreeMap<String, CellValue>, // 规范列名 → 单元格
}

impl NormalizedRow {
    pub fn new(row_number: usize) -> Self {
        Self {
            row_number,
            cells: BTreeMap::new(),
        }
    }

    /// 读取单元格（列不存在时返回 Empty）
    pub fn get(&self, field: &str) -> &CellValue {
        self.cells.get(field).unwrap_or(&EMPTY_CELL)
    }

    pub fn is_blank(&self, field: &str) -> bool {
        self.get(field).is_blank()
    }
}

// ==========================================
// NormalizedTable - 规范化后的表格
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NormalizedTable {
    pub columns: Vec<String>, // 规范列名（按原始列顺序，已去重）
    pub rows: Vec<NormalizedRow>,
}

impl NormalizedTable {
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_number_accounts_for_header() {
        let table = RawTable {
            sheet_name: None,
            headers: vec!["NOMBRE".to_string()],
            rows: vec![vec![CellValue::Empty]; 3],
            header_row: 1,
        };
        assert_eq!(table.row_number(0), 2);
        assert_eq!(table.row_number(2), 4);
    }

    #[test]
    fn test_normalized_row_missing_column_is_empty() {
        let mut row = NormalizedRow::new(2);
        row.cells
            .insert("CANTIDAD".to_string(), CellValue::Number(3.0));

        assert_eq!(row.get("CANTIDAD"), &CellValue::Number(3.0));
        assert_eq!(row.get("NOMBRE"), &CellValue::Empty);
        assert!(row.is_blank("NOMBRE"));
    }
}
