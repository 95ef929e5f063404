// ==========================================
// Excel 订单行导入 - 导入配置快照
// ==========================================
// 用途: 单次导入使用的配置值（导入开始时读取一次）
// ==========================================

use crate::config::import_config_trait::ImportConfigReader;
use serde::{Deserialize, Serialize};
use std::error::Error;

/// 默认公式错误标记
pub const DEFAULT_SENTINEL_MARKERS: [&str; 8] = [
    "#N/A", "#REF!", "#VALUE!", "#DIV/0!", "#NAME?", "#NUM!", "#NULL!", "#ERROR!",
];

/// 默认占位产品名
pub const DEFAULT_PLACEHOLDER_PRODUCT_NAME: &str = "Producto sin nombre";

/// 导出版式默认工作表名
pub const DEFAULT_EXPORT_SHEET_NAME: &str = "EXPORTACION ODOO";

/// 采购申请默认最小数量
pub const DEFAULT_REQUISITION_MIN_QUANTITY: f64 = 1.0;

// ==========================================
// ImportSettings
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    pub subtotal_tolerance: f64,
    pub sentinel_markers: Vec<String>,
    pub requisition_min_quantity: f64,
    pub placeholder_product_name: String,
    pub export_sheet_name: String,
    pub locale: String,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            subtotal_tolerance: 0.0,
            sentinel_markers: DEFAULT_SENTINEL_MARKERS
                .iter()
                .map(|m| m.to_string())
                .collect(),
            requisition_min_quantity: DEFAULT_REQUISITION_MIN_QUANTITY,
            placeholder_product_name: DEFAULT_PLACEHOLDER_PRODUCT_NAME.to_string(),
            export_sheet_name: DEFAULT_EXPORT_SHEET_NAME.to_string(),
            locale: crate::i18n::DEFAULT_LOCALE.to_string(),
        }
    }
}

impl ImportSettings {
    pub fn with_subtotal_tolerance(mut self, tolerance: f64) -> Self {
        self.subtotal_tolerance = tolerance;
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// 单元格文本是否为公式错误标记（返回命中的标记）
    pub fn match_sentinel(&self, text: &str) -> Option<&str> {
        let trimmed = text.trim();
        self.sentinel_markers
            .iter()
            .find(|m| m.eq_ignore_ascii_case(trimmed))
            .map(String::as_str)
    }
}

impl ImportConfigReader for ImportSettings {
    fn get_subtotal_tolerance(&self) -> Result<f64, Box<dyn Error>> {
        Ok(self.subtotal_tolerance)
    }

    fn get_sentinel_markers(&self) -> Result<Vec<String>, Box<dyn Error>> {
        Ok(self.sentinel_markers.clone())
    }

    fn get_requisition_min_quantity(&self) -> Result<f64, Box<dyn Error>> {
        Ok(self.requisition_min_quantity)
    }

    fn get_placeholder_product_name(&self) -> Result<String, Box<dyn Error>> {
        Ok(self.placeholder_product_name.clone())
    }

    fn get_export_sheet_name(&self) -> Result<String, Box<dyn Error>> {
        Ok(self.export_sheet_name.clone())
    }

    fn get_locale(&self) -> Result<String, Box<dyn Error>> {
        Ok(self.locale.clone())
    }

    fn load_import_settings(&self) -> Result<ImportSettings, Box<dyn Error>> {
        Ok(self.clone())
    }
}
