// ==========================================
// Excel 订单行导入 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入管道所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::import_settings::ImportSettings;
use std::error::Error;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 用途: 导入管道所需的配置读取接口
// 实现者: ConfigManager（从 config_kv 表读取）, ImportSettings（内存快照）
pub trait ImportConfigReader: Send + Sync {
    // ===== 行校验配置 =====

    /// 获取小计校验容差（|数量 × 单价 − 小计| ≤ 容差 视为一致）
    ///
    /// # 默认值
    /// - 0.0（逐位相等）
    fn get_subtotal_tolerance(&self) -> Result<f64, Box<dyn Error>>;

    /// 获取表格公式错误标记列表（大小写不敏感匹配）
    ///
    /// # 默认值
    /// - ["#N/A", "#REF!", "#VALUE!", "#DIV/0!", "#NAME?", "#NUM!", "#NULL!", "#ERROR!"]
    fn get_sentinel_markers(&self) -> Result<Vec<String>, Box<dyn Error>>;

    /// 获取采购申请流程的最小数量
    ///
    /// # 默认值
    /// - 1.0
    fn get_requisition_min_quantity(&self) -> Result<f64, Box<dyn Error>>;

    // ===== 产品新建配置 =====

    /// 获取新建产品时的占位名称（行内无产品名时使用）
    ///
    /// # 默认值
    /// - "Producto sin nombre"
    fn get_placeholder_product_name(&self) -> Result<String, Box<dyn Error>>;

    // ===== 文件配置 =====

    /// 获取导出版式必须存在的工作表名
    ///
    /// # 默认值
    /// - "EXPORTACION ODOO"
    fn get_export_sheet_name(&self) -> Result<String, Box<dyn Error>>;

    // ===== 提示语言 =====

    /// 获取错误提示语言
    ///
    /// # 默认值
    /// - "es"
    fn get_locale(&self) -> Result<String, Box<dyn Error>>;

    /// 一次读取全部导入配置
    fn load_import_settings(&self) -> Result<ImportSettings, Box<dyn Error>> {
        Ok(ImportSettings {
            subtotal_tolerance: self.get_subtotal_tolerance()?,
            sentinel_markers: self.get_sentinel_markers()?,
            requisition_min_quantity: self.get_requisition_min_quantity()?,
            placeholder_product_name: self.get_placeholder_product_name()?,
            export_sheet_name: self.get_export_sheet_name()?,
            locale: self.get_locale()?,
        })
    }
}
