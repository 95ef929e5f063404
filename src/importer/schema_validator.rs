// ==========================================
// Excel 订单行导入 - 表结构校验
// ==========================================
// 每次导入只执行一次，在任何行处理之前
// ==========================================

use crate::domain::table::NormalizedTable;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::line_importer_trait::SchemaValidator as SchemaValidatorTrait;
use crate::importer::variant_profile::VariantProfile;

pub struct SchemaValidator;

impl SchemaValidatorTrait for SchemaValidator {
    fn validate(&self, table: &NormalizedTable, profile: &VariantProfile) -> ImportResult<()> {
        let missing: Vec<String> = profile
            .required_columns
            .iter()
            .filter(|column| !table.has_column(column))
            .map(|column| column.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ImportError::SchemaError {
                missing,
                found: table.columns.clone(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::ImportVariant;

    #[test]
    fn test_reports_exactly_missing_and_found() {
        let profile = VariantProfile::for_variant(ImportVariant::Requisition);
        let table = NormalizedTable {
            columns: vec!["NOMBRE".to_string(), "observación".to_string()],
            rows: vec![],
        };

        match SchemaValidator.validate(&table, &profile) {
            Err(ImportError::SchemaError { missing, found }) => {
                assert_eq!(missing, vec!["CANTIDAD", "PRECIO_UNITARIO"]);
                assert_eq!(found, vec!["NOMBRE", "observación"]);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_complete_schema_passes() {
        let profile = VariantProfile::for_variant(ImportVariant::SimpleSaleOrder);
        let table = NormalizedTable {
            columns: vec![
                "quantity".to_string(),
                "product_code".to_string(),
                "price_unit".to_string(),
                "notes".to_string(),
            ],
            rows: vec![],
        };
        assert!(SchemaValidator.validate(&table, &profile).is_ok());
    }
}
