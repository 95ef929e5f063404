// ==========================================
// Excel 订单行导入 - 导入管道 Trait
// ==========================================
// 职责: 定义导入主接口与各阶段组件接口（不包含实现）
// 管道: 文件解析 → 列名规范化 → 表结构校验 → 行过滤 → 行校验 → 产品匹配 → 单据行生成
// ==========================================

use crate::config::ImportSettings;
use crate::domain::line::{
    ImportOutcome, ImportPreview, ImportRequest, LineItem, ProductRef, ValidatedRow,
};
use crate::domain::table::{NormalizedRow, NormalizedTable, RawTable};
use crate::domain::types::{CellValue, DocumentRef, ImportVariant, RecordId};
use crate::importer::error::ImportResult;
use crate::importer::variant_profile::VariantProfile;
use crate::repository::{CatalogPort, DocumentLineRepository};

// ==========================================
// LineImporter Trait
// ==========================================
// 用途: 单据行导入主接口
// 实现者: LineImporterImpl
pub trait LineImporter: Send + Sync {
    /// 导入表格中的单据行
    ///
    /// # 参数
    /// - variant: 导入流程
    /// - request: 导入请求（文件内容 + 目标单据）
    ///
    /// # 返回
    /// - Ok(ImportOutcome): 全部行通过并已写入（宿主据此关闭向导）
    /// - Err(ImportError): 首个失败；本次导入不写入任何单据行
    ///
    /// # 导入流程
    /// 1. 文件解码与解析（工作表选择）
    /// 2. 列名规范化
    /// 3. 表结构校验（仅一次）
    /// 4. 行过滤（空白行 / 数量为 0 的行）
    /// 5. 逐行校验 → 产品匹配（可能新建产品）→ 单据行暂存
    /// 6. 暂存单据行整批提交
    fn import(&self, variant: ImportVariant, request: &ImportRequest)
        -> ImportResult<ImportOutcome>;

    /// 预检（只读）
    ///
    /// 与 import 走同一管道，但不写产品目录与单据行；
    /// 收集全部行问题而非首个。文件/表结构错误仍直接返回 Err。
    fn preview(&self, variant: ImportVariant, request: &ImportRequest)
        -> ImportResult<ImportPreview>;
}

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口（阶段 1）
// 实现者: ExcelParser, CsvParser, UniversalFileParser
pub trait FileParser: Send + Sync {
    /// 解析文件内容为原始表格
    ///
    /// # 参数
    /// - bytes: 文件内容
    /// - sheet_name: 指定工作表（None 表示第一个工作表；CSV 忽略）
    /// - file_name: 源文件名（用于格式判断，可选）
    ///
    /// # 返回
    /// - Ok(RawTable): 首行为表头
    /// - Err: FileReadError / SheetNotFound
    fn parse_to_raw_table(
        &self,
        bytes: &[u8],
        sheet_name: Option<&str>,
        file_name: Option<&str>,
    ) -> ImportResult<RawTable>;
}

// ==========================================
// ColumnNormalizer Trait
// ==========================================
// 用途: 列名规范化（阶段 2，无失败路径）
// 实现者: ColumnNormalizer
pub trait ColumnNormalizer: Send + Sync {
    /// 将原始表头映射为规范列名
    fn normalize(&self, table: &RawTable, profile: &VariantProfile) -> NormalizedTable;
}

// ==========================================
// SchemaValidator Trait
// ==========================================
// 用途: 表结构校验（阶段 3，每次导入只执行一次）
// 实现者: SchemaValidator
pub trait SchemaValidator: Send + Sync {
    /// 校验必需列是否齐全
    ///
    /// # 返回
    /// - Err(SchemaError): 列出缺失列与全部已找到的列
    fn validate(&self, table: &NormalizedTable, profile: &VariantProfile) -> ImportResult<()>;
}

/// 行过滤结果
#[derive(Debug, Clone, Default)]
pub struct FilteredRows {
    pub rows: Vec<NormalizedRow>,
    pub skipped_blank: usize,
    pub skipped_zero_quantity: usize,
}

// ==========================================
// RowFilter Trait
// ==========================================
// 用途: 行过滤（阶段 4）
// 实现者: RowFilter
pub trait RowFilter: Send + Sync {
    /// 丢弃必需列全空的行与数量为 0 的行（保持顺序与原始行号）
    fn filter(&self, rows: Vec<NormalizedRow>, profile: &VariantProfile) -> FilteredRows;
}

// ==========================================
// DataCleaner Trait
// ==========================================
// 用途: 单元格清洗与类型转换（行校验使用）
// 实现者: DataCleaner
pub trait DataCleaner: Send + Sync {
    /// 单元格 → 去空白文本（空值返回 None）
    fn clean_text(&self, cell: &CellValue) -> Option<String>;

    /// 单元格 → 有限浮点数
    ///
    /// # 返回
    /// - Ok(None): 空值
    /// - Ok(Some(f64)): 解析成功
    /// - Err(raw): 无法解析（含 NaN / 无穷），返回原始值
    fn parse_number(&self, cell: &CellValue) -> Result<Option<f64>, String>;

    /// 单元格是否为数值 0（0 / 0.0 / "0"）
    fn is_zero(&self, cell: &CellValue) -> bool;
}

// ==========================================
// RowValidator Trait
// ==========================================
// 用途: 逐行校验（阶段 5a）
// 实现者: RowValidator
pub trait RowValidator: Send + Sync {
    /// 按固定顺序校验一行，遇首个失败即返回
    ///
    /// 顺序: 必填 → 禁止为 0 → 公式错误标记 → 数值格式 → 数值范围 → 小计一致性
    fn validate_row(
        &self,
        row: &NormalizedRow,
        profile: &VariantProfile,
        settings: &ImportSettings,
    ) -> ImportResult<ValidatedRow>;
}

// ==========================================
// ProductResolver Trait
// ==========================================
// 用途: 产品匹配（阶段 5b）
// 实现者: ProductResolver
pub trait ProductResolver: Send + Sync {
    /// 只读查找
    ///
    /// # 返回
    /// - Ok(Some): 命中
    /// - Ok(None): 未命中且策略允许新建
    /// - Err(ProductNotFound): 未命中且策略不允许新建
    /// - Err(CatalogReadError): 目录查询失败
    fn lookup(
        &self,
        catalog: &dyn CatalogPort,
        row: &ValidatedRow,
        profile: &VariantProfile,
    ) -> ImportResult<Option<ProductRef>>;

    /// 查找，未命中时按策略新建
    ///
    /// # 返回
    /// - Ok((ProductRef, created)): created 表示本次新建
    fn resolve(
        &self,
        catalog: &dyn CatalogPort,
        row: &ValidatedRow,
        profile: &VariantProfile,
        settings: &ImportSettings,
    ) -> ImportResult<(ProductRef, bool)>;
}

// ==========================================
// LineMaterializer Trait
// ==========================================
// 用途: 单据行组装与提交（阶段 5c / 6）
// 实现者: LineMaterializer
pub trait LineMaterializer: Send + Sync {
    /// 组装单据行（纯函数）
    fn build_line(
        &self,
        document: DocumentRef,
        row: &ValidatedRow,
        product: &ProductRef,
        profile: &VariantProfile,
        description_column: Option<&str>,
    ) -> LineItem;

    /// 整批提交暂存的单据行
    ///
    /// # 返回
    /// - Err(CollaboratorWriteError): 协作方拒绝（不重试）
    fn submit(
        &self,
        repo: &dyn DocumentLineRepository,
        document: DocumentRef,
        lines: &[LineItem],
    ) -> ImportResult<Vec<RecordId>>;
}
