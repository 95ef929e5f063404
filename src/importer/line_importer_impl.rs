// ==========================================
// Excel 订单行导入 - 单据行导入器实现
// ==========================================
// 职责: 串联管道各阶段，从文件到单据行
// 流程: 解析 → 规范化 → 表结构校验 → 行过滤 → 逐行(校验 → 产品匹配 → 暂存) → 整批提交
// 红线: 任一行失败则本次导入不写入任何单据行；
//       之前行已新建的产品保留在目录中（不回滚）
// ==========================================

use crate::config::{ImportConfigReader, ImportSettings};
use crate::domain::line::{
    ImportOutcome, ImportPreview, ImportRequest, LineItem, ProductRef, RowIssue,
};
use crate::domain::types::{DocumentRef, ImportVariant};
use crate::importer::column_normalizer::ColumnNormalizer as DefaultColumnNormalizer;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::line_importer_trait::{
    ColumnNormalizer, FileParser, FilteredRows, LineImporter, LineMaterializer,
    ProductResolver, RowFilter, RowValidator, SchemaValidator,
};
use crate::importer::line_materializer::LineMaterializer as DefaultLineMaterializer;
use crate::importer::product_resolver::ProductResolver as DefaultProductResolver;
use crate::importer::row_filter::RowFilter as DefaultRowFilter;
use crate::importer::row_validator::RowValidator as DefaultRowValidator;
use crate::importer::schema_validator::SchemaValidator as DefaultSchemaValidator;
use crate::importer::variant_profile::VariantProfile;
use crate::repository::{CatalogPort, DocumentLineRepository};
use chrono::Utc;
use std::time::Instant;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

/// 解析 + 表结构校验 + 行过滤之后的中间状态
struct PreparedImport {
    settings: ImportSettings,
    profile: VariantProfile,
    document: DocumentRef,
    description_column: Option<&'static str>,
    total_rows: usize,
    filtered: FilteredRows,
}

// ==========================================
// LineImporterImpl - 单据行导入器实现
// ==========================================
pub struct LineImporterImpl<C, L, S>
where
    C: CatalogPort,
    L: DocumentLineRepository,
    S: ImportConfigReader,
{
    // 协作方
    catalog: C,
    lines: L,

    // 配置读取器
    config: S,

    // 管道组件
    file_parser: Box<dyn FileParser>,
    column_normalizer: Box<dyn ColumnNormalizer>,
    schema_validator: Box<dyn SchemaValidator>,
    row_filter: Box<dyn RowFilter>,
    row_validator: Box<dyn RowValidator>,
    product_resolver: Box<dyn ProductResolver>,
    line_materializer: Box<dyn LineMaterializer>,
}

impl<C, L, S> LineImporterImpl<C, L, S>
where
    C: CatalogPort,
    L: DocumentLineRepository,
    S: ImportConfigReader,
{
    /// 创建新的 LineImporter 实例
    ///
    /// # 参数
    /// - catalog: 产品目录
    /// - lines: 单据行协作方
    /// - config: 配置读取器
    /// - 其余: 各阶段组件
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        catalog: C,
        lines: L,
        config: S,
        file_parser: Box<dyn FileParser>,
        column_normalizer: Box<dyn ColumnNormalizer>,
        schema_validator: Box<dyn SchemaValidator>,
        row_filter: Box<dyn RowFilter>,
        row_validator: Box<dyn RowValidator>,
        product_resolver: Box<dyn ProductResolver>,
        line_materializer: Box<dyn LineMaterializer>,
    ) -> Self {
        Self {
            catalog,
            lines,
            config,
            file_parser,
            column_normalizer,
            schema_validator,
            row_filter,
            row_validator,
            product_resolver,
            line_materializer,
        }
    }

    /// 使用默认组件创建
    pub fn with_defaults(catalog: C, lines: L, config: S) -> Self {
        Self::new(
            catalog,
            lines,
            config,
            Box::new(UniversalFileParser),
            Box::new(DefaultColumnNormalizer),
            Box::new(DefaultSchemaValidator),
            Box::new(DefaultRowFilter),
            Box::new(DefaultRowValidator),
            Box::new(DefaultProductResolver),
            Box::new(DefaultLineMaterializer),
        )
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn lines(&self) -> &L {
        &self.lines
    }

    pub fn config(&self) -> &S {
        &self.config
    }

    fn load_settings(&self) -> ImportResult<ImportSettings> {
        self.config
            .load_import_settings()
            .map_err(|e| ImportError::ConfigReadError {
                key: "import.*".to_string(),
                message: e.to_string(),
            })
    }

    /// 阶段 1-4: 解析 → 规范化 → 表结构校验 → 行过滤
    fn prepare(
        &self,
        variant: ImportVariant,
        request: &ImportRequest,
    ) -> ImportResult<PreparedImport> {
        let settings = self.load_settings()?;
        let profile = VariantProfile::for_variant(variant);
        let document = DocumentRef::new(profile.document_kind(), request.target_document_id);

        if request.source_bytes.is_empty() {
            return Err(ImportError::MissingFile);
        }

        // 导出版式必须位于指定工作表
        let sheet_name = if profile.requires_export_sheet {
            Some(settings.export_sheet_name.as_str())
        } else {
            request.sheet_name.as_deref()
        };

        // === 步骤 1: 解析文件 ===
        let raw = self.file_parser.parse_to_raw_table(
            &request.source_bytes,
            sheet_name,
            request.file_name.as_deref(),
        )?;
        // CSV 没有工作表，无法满足导出版式
        if profile.requires_export_sheet && raw.sheet_name.is_none() {
            return Err(ImportError::SheetNotFound {
                sheet: settings.export_sheet_name.clone(),
                available: Vec::new(),
            });
        }
        debug!(
            sheet = ?raw.sheet_name,
            headers = raw.headers.len(),
            rows = raw.len(),
            "文件解析完成"
        );

        // === 步骤 2: 列名规范化 ===
        let mut table = self.column_normalizer.normalize(&raw, &profile);

        // === 步骤 3: 表结构校验 ===
        self.schema_validator.validate(&table, &profile)?;

        let description_column = profile
            .description_candidates
            .iter()
            .copied()
            .find(|column| table.has_column(column));

        // === 步骤 4: 行过滤 ===
        let total_rows = table.rows.len();
        let filtered = self
            .row_filter
            .filter(std::mem::take(&mut table.rows), &profile);
        debug!(
            total = total_rows,
            kept = filtered.rows.len(),
            skipped_blank = filtered.skipped_blank,
            skipped_zero_quantity = filtered.skipped_zero_quantity,
            "行过滤完成"
        );

        Ok(PreparedImport {
            settings,
            profile,
            document,
            description_column,
            total_rows,
            filtered,
        })
    }

    fn run_import(
        &self,
        batch_id: &str,
        variant: ImportVariant,
        request: &ImportRequest,
    ) -> ImportResult<ImportOutcome> {
        let start_time = Instant::now();
        let prepared = self.prepare(variant, request)?;
        let PreparedImport {
            settings,
            profile,
            document,
            description_column,
            total_rows,
            filtered,
        } = prepared;

        // === 步骤 5: 逐行校验 → 产品匹配 → 暂存 ===
        let mut staged: Vec<LineItem> = Vec::with_capacity(filtered.rows.len());
        let mut created_products: Vec<ProductRef> = Vec::new();
        for row in &filtered.rows {
            let validated = self.row_validator.validate_row(row, &profile, &settings)?;
            let (product, created) = self.product_resolver.resolve(
                &self.catalog,
                &validated,
                &profile,
                &settings,
            )?;
            if created {
                created_products.push(product.clone());
            }
            staged.push(self.line_materializer.build_line(
                document,
                &validated,
                &product,
                &profile,
                description_column,
            ));
        }

        // === 步骤 6: 整批提交 ===
        let line_ids = self
            .line_materializer
            .submit(&self.lines, document, &staged)?;

        let elapsed_time = start_time.elapsed();
        info!(
            batch_id = %batch_id,
            variant = %variant,
            document = %document,
            total = total_rows,
            lines_created = line_ids.len(),
            products_created = created_products.len(),
            skipped_blank = filtered.skipped_blank,
            skipped_zero_quantity = filtered.skipped_zero_quantity,
            elapsed_ms = elapsed_time.as_millis() as u64,
            "单据行导入完成"
        );

        Ok(ImportOutcome {
            batch_id: batch_id.to_string(),
            variant,
            document,
            total_rows,
            skipped_blank_rows: filtered.skipped_blank,
            skipped_zero_quantity_rows: filtered.skipped_zero_quantity,
            line_ids,
            lines: staged,
            created_products,
            imported_at: Utc::now(),
            elapsed_time,
        })
    }
}

impl<C, L, S> LineImporter for LineImporterImpl<C, L, S>
where
    C: CatalogPort,
    L: DocumentLineRepository,
    S: ImportConfigReader,
{
    #[instrument(skip(self, request), fields(batch_id))]
    fn import(
        &self,
        variant: ImportVariant,
        request: &ImportRequest,
    ) -> ImportResult<ImportOutcome> {
        let batch_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("batch_id", batch_id.as_str());
        info!(
            batch_id = %batch_id,
            variant = %variant,
            document_id = request.target_document_id,
            file_name = request.file_name.as_deref().unwrap_or("unknown"),
            bytes = request.source_bytes.len(),
            "开始导入单据行"
        );

        self.run_import(&batch_id, variant, request).map_err(|e| {
            // 每次失败导入只记录这一条诊断事件
            error!(
                batch_id = %batch_id,
                variant = %variant,
                category = %e.category(),
                row = ?e.row_number(),
                field = ?e.field(),
                error = %e,
                "单据行导入失败"
            );
            e
        })
    }

    #[instrument(skip(self, request))]
    fn preview(
        &self,
        variant: ImportVariant,
        request: &ImportRequest,
    ) -> ImportResult<ImportPreview> {
        let prepared = self.prepare(variant, request)?;
        let locale = prepared.settings.locale.as_str();

        let mut valid_rows = 0;
        let mut issues: Vec<RowIssue> = Vec::new();
        let mut products_to_create: Vec<String> = Vec::new();

        for row in &prepared.filtered.rows {
            let outcome = self
                .row_validator
                .validate_row(row, &prepared.profile, &prepared.settings)
                .and_then(|validated| {
                    self.product_resolver
                        .lookup(&self.catalog, &validated, &prepared.profile)
                        .map(|found| (validated, found))
                });

            match outcome {
                Ok((_, Some(_))) => valid_rows += 1,
                Ok((validated, None)) => {
                    valid_rows += 1;
                    if let Some(code) = validated.text(prepared.profile.product_key_field) {
                        if !products_to_create.contains(&code) {
                            products_to_create.push(code);
                        }
                    }
                }
                Err(e) => issues.push(RowIssue {
                    row_number: e.row_number().unwrap_or(row.row_number),
                    field: e.field().map(str::to_string),
                    category: e.category(),
                    message: e.user_message(locale),
                }),
            }
        }

        info!(
            variant = %variant,
            total = prepared.total_rows,
            valid = valid_rows,
            issues = issues.len(),
            products_to_create = products_to_create.len(),
            "导入预检完成"
        );

        Ok(ImportPreview {
            variant,
            total_rows: prepared.total_rows,
            valid_rows,
            skipped_blank_rows: prepared.filtered.skipped_blank,
            skipped_zero_quantity_rows: prepared.filtered.skipped_zero_quantity,
            products_to_create,
            issues,
        })
    }
}
