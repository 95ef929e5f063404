// ==========================================
// Excel 订单行导入 - API 层
// ==========================================
// 职责: 提供宿主调用入口（导入 / 预检 / 配置）
// ==========================================

pub mod error;
pub mod import_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use import_api::{ImportApi, ImportApiRequest, ImportApiResponse};
