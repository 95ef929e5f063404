// ==========================================
// Excel 订单行导入 - 行过滤
// ==========================================
// 丢弃: 必需列全部为空的行（表尾填充）、数量为 0 的行（静默跳过）
// 保持: 行顺序与原始行号
// ==========================================

use crate::domain::table::NormalizedRow;
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::line_importer_trait::{
    DataCleaner as _, FilteredRows, RowFilter as RowFilterTrait,
};
use crate::importer::variant_profile::VariantProfile;
use tracing::debug;

pub struct RowFilter;

impl RowFilterTrait for RowFilter {
    fn filter(&self, rows: Vec<NormalizedRow>, profile: &VariantProfile) -> FilteredRows {
        let mut result = FilteredRows::default();

        for row in rows {
            if profile
                .required_columns
                .iter()
                .all(|column| row.is_blank(column))
            {
                result.skipped_blank += 1;
                continue;
            }

            if DataCleaner.is_zero(row.get(profile.quantity_field)) {
                debug!(row = row.row_number, "数量为 0，跳过");
                result.skipped_zero_quantity += 1;
                continue;
            }

            result.rows.push(row);
        }

        result
    }
}
