// ==========================================
// Excel 订单行导入 - 单据行组装与提交
// ==========================================
// 组装: 数量 / 单价 / 描述 / 流程扩展属性（空值记为 null）
// 提交: 全部行校验通过后整批交给协作方，失败不重试
// ==========================================

use crate::domain::line::{LineItem, ProductRef, ValidatedRow};
use crate::domain::types::{DocumentRef, RecordId};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::line_importer_trait::LineMaterializer as LineMaterializerTrait;
use crate::importer::variant_profile::VariantProfile;
use crate::repository::DocumentLineRepository;
use std::collections::BTreeMap;
use tracing::debug;

pub struct LineMaterializer;

impl LineMaterializerTrait for LineMaterializer {
    fn build_line(
        &self,
        document: DocumentRef,
        row: &ValidatedRow,
        product: &ProductRef,
        profile: &VariantProfile,
        description_column: Option<&str>,
    ) -> LineItem {
        let description = description_column.and_then(|column| row.text(column));

        let extra_attributes: BTreeMap<String, serde_json::Value> = profile
            .extra_attributes
            .iter()
            .map(|(column, attribute)| {
                let value = row
                    .fields
                    .get(*column)
                    .map(|v| v.to_json())
                    .unwrap_or(serde_json::Value::Null);
                (attribute.to_string(), value)
            })
            .collect();

        LineItem {
            document,
            product_id: product.id,
            quantity: row.quantity,
            unit_price: row.unit_price,
            description,
            extra_attributes,
            source_row: row.row_number,
        }
    }

    fn submit(
        &self,
        repo: &dyn DocumentLineRepository,
        document: DocumentRef,
        lines: &[LineItem],
    ) -> ImportResult<Vec<RecordId>> {
        if lines.is_empty() {
            return Ok(Vec::new());
        }

        let ids = repo
            .create_lines(lines)
            .map_err(|e| ImportError::CollaboratorWriteError {
                row: e.rejected_row(),
                document: document.to_string(),
                message: e.to_string(),
            })?;

        debug!(document = %document, count = ids.len(), "单据行已提交");
        Ok(ids)
    }
}
