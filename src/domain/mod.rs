// ==========================================
// Excel 订单行导入 - 领域模型层
// ==========================================
// 职责: 定义导入请求、表格中间结构、单据行与产品实体
// 红线: 不含数据访问逻辑,不含管道逻辑
// ==========================================

pub mod line;
pub mod table;
pub mod types;

// 重导出核心类型
pub use line::{
    ImportOutcome, ImportPreview, ImportRequest, LineItem, NewProduct, ProductRef, RowIssue,
    ValidatedRow,
};
pub use table::{NormalizedRow, NormalizedTable, RawTable};
pub use types::{
    format_number, CellValue, DocumentKind, DocumentRef, ErrorCategory, ImportVariant, RecordId,
    ResolutionStrategy, TypedValue,
};
