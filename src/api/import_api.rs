// ==========================================
// 单据行导入 API
// ==========================================
// 职责: 宿主调用入口（Base64 上传载荷 → 导入管道 → 响应 DTO）
// 存储: 单个 SQLite 连接由产品目录 / 单据行 / 配置共享
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::{ConfigManager, ImportConfigReader};
use crate::db::{init_schema, open_sqlite_connection};
use crate::domain::line::{ImportOutcome, ImportPreview, ImportRequest, LineItem};
use crate::domain::types::{DocumentRef, ImportVariant, RecordId};
use crate::i18n::{t_with_args_in, DEFAULT_LOCALE};
use crate::importer::{LineImporter, LineImporterImpl};
use crate::repository::{
    DocumentLineRepository, SqliteCatalogRepository, SqliteLineRepository,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::info;

type SqliteImporter = LineImporterImpl<SqliteCatalogRepository, SqliteLineRepository, ConfigManager>;

/// 导入请求（宿主表单提交内容）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportApiRequest {
    /// 目标单据 ID（采购申请 / 销售订单）
    pub document_id: RecordId,
    /// Base64 编码的表格文件（可带 data URL 前缀）
    pub file_base64: String,
    /// 源文件名
    #[serde(default)]
    pub file_name: Option<String>,
    /// 指定工作表（导出版式忽略此项）
    #[serde(default)]
    pub sheet_name: Option<String>,
}

/// 导入成功响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportApiResponse {
    /// 宿主动作（固定为 "close"，关闭导入向导）
    pub action: String,
    /// 导入批次ID
    pub batch_id: String,
    /// 新建单据行数
    pub lines_created: usize,
    /// 新建单据行ID
    pub line_ids: Vec<RecordId>,
    /// 本次新建产品的编码
    pub products_created: Vec<String>,
    /// 跳过的行数（空白行 + 数量为 0 的行）
    pub skipped_rows: usize,
    /// 导入耗时（毫秒）
    pub elapsed_ms: i64,
    /// 提示信息
    pub message: String,
}

impl ImportApiResponse {
    fn from_outcome(outcome: &ImportOutcome, locale: &str) -> Self {
        let lines_created = outcome.lines_created();
        Self {
            action: "close".to_string(),
            batch_id: outcome.batch_id.clone(),
            lines_created,
            line_ids: outcome.line_ids.clone(),
            products_created: outcome
                .created_products
                .iter()
                .filter_map(|p| p.code.clone())
                .collect(),
            skipped_rows: outcome.skipped_blank_rows + outcome.skipped_zero_quantity_rows,
            elapsed_ms: outcome.elapsed_time.as_millis() as i64,
            message: t_with_args_in(
                locale,
                "import.finished",
                &[("lines", &lines_created.to_string())],
            ),
        }
    }
}

/// 单据行导入 API
pub struct ImportApi {
    importer: SqliteImporter,
}

impl ImportApi {
    /// 打开数据库并初始化表结构
    pub fn new(db_path: &str) -> ApiResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| ApiError::DatabaseConnectionError(e.to_string()))?;
        Self::from_connection(Arc::new(Mutex::new(conn)))
    }

    /// 从已有连接创建（表结构幂等初始化）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ApiResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| ApiError::DatabaseConnectionError(format!("锁获取失败: {}", e)))?;
            init_schema(&guard).map_err(|e| ApiError::DatabaseError(e.to_string()))?;
        }

        let config = ConfigManager::from_connection(conn.clone())
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;
        let importer = LineImporterImpl::with_defaults(
            SqliteCatalogRepository::from_connection(conn.clone()),
            SqliteLineRepository::from_connection(conn),
            config,
        );
        Ok(Self { importer })
    }

    fn locale(&self) -> String {
        self.importer
            .config()
            .get_locale()
            .unwrap_or_else(|_| DEFAULT_LOCALE.to_string())
    }

    fn build_request(&self, request: ImportApiRequest, locale: &str) -> ApiResult<ImportRequest> {
        if request.document_id <= 0 {
            return Err(ApiError::InvalidInput(format!(
                "无效的单据ID: {}",
                request.document_id
            )));
        }

        let mut import_request = ImportRequest::from_base64(&request.file_base64, request.document_id)
            .map_err(|e| ApiError::from_import(e, locale))?;
        import_request.file_name = request.file_name;
        import_request.sheet_name = request.sheet_name;
        Ok(import_request)
    }

    /// 导入单据行
    ///
    /// # 返回
    /// - Ok(ImportApiResponse): 全部行已写入，action = "close"
    /// - Err(ApiError::ImportFailed): 带分类/行号/字段与本地化提示
    pub fn import_lines(
        &self,
        variant: ImportVariant,
        request: ImportApiRequest,
    ) -> ApiResult<ImportApiResponse> {
        let locale = self.locale();
        let import_request = self.build_request(request, &locale)?;

        let outcome = self
            .importer
            .import(variant, &import_request)
            .map_err(|e| ApiError::from_import(e, &locale))?;

        Ok(ImportApiResponse::from_outcome(&outcome, &locale))
    }

    /// 预检（只读）
    pub fn preview_lines(
        &self,
        variant: ImportVariant,
        request: ImportApiRequest,
    ) -> ApiResult<ImportPreview> {
        let locale = self.locale();
        let import_request = self.build_request(request, &locale)?;

        self.importer
            .preview(variant, &import_request)
            .map_err(|e| ApiError::from_import(e, &locale))
    }

    /// 查询单据下的全部单据行
    pub fn list_lines(
        &self,
        variant: ImportVariant,
        document_id: RecordId,
    ) -> ApiResult<Vec<(RecordId, LineItem)>> {
        let document = DocumentRef::new(variant.document_kind(), document_id);
        Ok(self.importer.lines().list_lines(document)?)
    }

    /// 更新导入配置（global scope）
    pub fn set_config_value(&self, key: &str, value: &str) -> ApiResult<()> {
        self.importer
            .config()
            .set_global_config_value(key, value)
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;
        info!(key = %key, "导入配置已更新");
        Ok(())
    }

    /// 当前生效配置快照（JSON）
    pub fn get_config_snapshot(&self) -> ApiResult<String> {
        self.importer
            .config()
            .get_config_snapshot()
            .map_err(|e| ApiError::ConfigError(e.to_string()))
    }
}
