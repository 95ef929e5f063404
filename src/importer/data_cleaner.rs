// ==========================================
// Excel 订单行导入 - 单元格清洗器实现
// ==========================================
// 职责: TRIM / 空值标准化 / 数值解析
// ==========================================

use crate::domain::types::CellValue;
use crate::importer::line_importer_trait::DataCleaner as DataCleanerTrait;

pub struct DataCleaner;

impl DataCleanerTrait for DataCleaner {
    fn clean_text(&self, cell: &CellValue) -> Option<String> {
        cell.as_trimmed_text()
    }

    fn parse_number(&self, cell: &CellValue) -> Result<Option<f64>, String> {
        let value = match cell {
            CellValue::Empty => return Ok(None),
            CellValue::Number(n) => *n,
            CellValue::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Ok(None);
                }
                trimmed.parse::<f64>().map_err(|_| s.clone())?
            }
        };

        if value.is_finite() {
            Ok(Some(value))
        } else {
            Err(cell.display_value())
        }
    }

    fn is_zero(&self, cell: &CellValue) -> bool {
        matches!(self.parse_number(cell), Ok(Some(v)) if v == 0.0)
    }
}
