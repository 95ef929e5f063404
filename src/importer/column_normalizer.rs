// ==========================================
// Excel 订单行导入 - 列名规范化
// ==========================================
// 规则: trim + 小写 + 空白折叠 → 查同义词表 → 规范列名；
//       未知表头以小写形式透传；空表头丢弃；重复规范列保留首列
// ==========================================

use crate::domain::table::{NormalizedRow, NormalizedTable, RawTable};
use crate::domain::types::CellValue;
use crate::importer::line_importer_trait::ColumnNormalizer as ColumnNormalizerTrait;
use crate::importer::variant_profile::VariantProfile;
use tracing::warn;

/// 表头规范化键：trim + 小写 + 连续空白折叠为单个空格
pub fn normalize_header(header: &str) -> String {
    header
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

pub struct ColumnNormalizer;

impl ColumnNormalizerTrait for ColumnNormalizer {
    fn normalize(&self, table: &RawTable, profile: &VariantProfile) -> NormalizedTable {
        // (列位置, 规范列名)
        let mut mapping: Vec<(usize, String)> = Vec::with_capacity(table.headers.len());
        let mut columns: Vec<String> = Vec::with_capacity(table.headers.len());

        for (idx, header) in table.headers.iter().enumerate() {
            let key = normalize_header(header);
            if key.is_empty() {
                continue;
            }
            let canonical = profile
                .canonical_for(&key)
                .map(str::to_string)
                .unwrap_or(key);

            if columns.contains(&canonical) {
                warn!(
                    column = %canonical,
                    header = %header,
                    position = idx + 1,
                    "重复列名，保留首列"
                );
                continue;
            }
            columns.push(canonical.clone());
            mapping.push((idx, canonical));
        }

        let rows = table
            .rows
            .iter()
            .enumerate()
            .map(|(i, raw)| {
                let mut row = NormalizedRow::new(table.row_number(i));
                for (idx, canonical) in &mapping {
                    let cell = raw.get(*idx).cloned().unwrap_or(CellValue::Empty);
                    row.cells.insert(canonical.clone(), cell);
                }
                row
            })
            .collect();

        NormalizedTable { columns, rows }
    }
}
