// ==========================================
// Excel 订单行导入 - 行校验
// ==========================================
// 校验顺序（遇首个失败即中止）:
// 1. 必填字段非空
// 2. 描述/编码字段不得为 0
// 3. 读取字段不得为公式错误标记
// 4. 数值字段可解析为有限浮点数
// 5. 数值范围（数量 > 0、流程最小数量、价格 ≥ 0）
// 6. 数量 × 单价 == 小计（仅定义小计的流程）
// ==========================================

use crate::config::ImportSettings;
use crate::domain::line::ValidatedRow;
use crate::domain::table::NormalizedRow;
use crate::domain::types::{CellValue, TypedValue};
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::error::{ImportError, ImportResult, RangeRule, RowErrorKind};
use crate::importer::line_importer_trait::{
    DataCleaner as _, RowValidator as RowValidatorTrait,
};
use crate::importer::variant_profile::VariantProfile;
use std::collections::BTreeMap;

pub struct RowValidator;

impl RowValidator {
    fn check_required(row: &NormalizedRow, profile: &VariantProfile) -> ImportResult<()> {
        for field in profile.required_fields {
            if row.is_blank(field) {
                return Err(ImportError::row_validation(
                    row.row_number,
                    field,
                    RowErrorKind::MissingField,
                ));
            }
        }
        Ok(())
    }

    fn check_zero_forbidden(row: &NormalizedRow, profile: &VariantProfile) -> ImportResult<()> {
        for field in profile.zero_forbidden_fields {
            let cell = row.get(field);
            if DataCleaner.is_zero(cell) {
                return Err(ImportError::row_validation(
                    row.row_number,
                    field,
                    RowErrorKind::ZeroForbidden {
                        value: cell.display_value().trim().to_string(),
                    },
                ));
            }
        }
        Ok(())
    }

    fn check_sentinels(
        row: &NormalizedRow,
        consumed: &[&str],
        settings: &ImportSettings,
    ) -> ImportResult<()> {
        for field in consumed {
            if let CellValue::Text(text) = row.get(field) {
                if let Some(marker) = settings.match_sentinel(text) {
                    return Err(ImportError::row_validation(
                        row.row_number,
                        field,
                        RowErrorKind::SentinelError {
                            marker: marker.to_string(),
                        },
                    ));
                }
            }
        }
        Ok(())
    }

    fn parse_numbers(
        row: &NormalizedRow,
        profile: &VariantProfile,
    ) -> ImportResult<BTreeMap<&'static str, f64>> {
        let mut numbers = BTreeMap::new();
        for field in profile
            .numeric_fields
            .iter()
            .chain(profile.optional_numeric_fields.iter())
        {
            match DataCleaner.parse_number(row.get(field)) {
                Ok(Some(value)) => {
                    numbers.insert(*field, value);
                }
                Ok(None) => {}
                Err(raw) => {
                    return Err(ImportError::row_validation(
                        row.row_number,
                        field,
                        RowErrorKind::NumericFormat { value: raw },
                    ))
                }
            }
        }
        Ok(numbers)
    }

    fn required_number(
        numbers: &BTreeMap<&'static str, f64>,
        row_number: usize,
        field: &str,
    ) -> ImportResult<f64> {
        numbers
            .get(field)
            .copied()
            .ok_or_else(|| ImportError::row_validation(row_number, field, RowErrorKind::MissingField))
    }

    fn check_range(
        row_number: usize,
        field: &str,
        value: f64,
        rule: RangeRule,
    ) -> ImportResult<()> {
        if rule.accepts(value) {
            Ok(())
        } else {
            Err(ImportError::row_validation(
                row_number,
                field,
                RowErrorKind::Range { value, rule },
            ))
        }
    }
}

impl RowValidatorTrait for RowValidator {
    fn validate_row(
        &self,
        row: &NormalizedRow,
        profile: &VariantProfile,
        settings: &ImportSettings,
    ) -> ImportResult<ValidatedRow> {
        let row_number = row.row_number;
        let consumed = profile.consumed_fields();

        Self::check_required(row, profile)?;
        Self::check_zero_forbidden(row, profile)?;
        Self::check_sentinels(row, &consumed, settings)?;

        let numbers = Self::parse_numbers(row, profile)?;
        let quantity = Self::required_number(&numbers, row_number, profile.quantity_field)?;
        let unit_price = Self::required_number(&numbers, row_number, profile.unit_price_field)?;

        // 数量 > 0（零数量行已在过滤阶段丢弃）
        Self::check_range(
            row_number,
            profile.quantity_field,
            quantity,
            RangeRule::GreaterThan(0.0),
        )?;
        if profile.enforces_min_quantity {
            Self::check_range(
                row_number,
                profile.quantity_field,
                quantity,
                RangeRule::AtLeast(settings.requisition_min_quantity),
            )?;
        }
        for field in profile.non_negative_fields {
            if let Some(value) = numbers.get(field) {
                Self::check_range(row_number, field, *value, RangeRule::AtLeast(0.0))?;
            }
        }

        let subtotal = match profile.subtotal_field {
            Some(field) => {
                let declared = Self::required_number(&numbers, row_number, field)?;
                let computed = quantity * unit_price;
                if (computed - declared).abs() > settings.subtotal_tolerance {
                    return Err(ImportError::row_validation(
                        row_number,
                        field,
                        RowErrorKind::SubtotalMismatch { computed, declared },
                    ));
                }
                Some(declared)
            }
            None => None,
        };

        let mut fields = BTreeMap::new();
        for field in consumed {
            let value = match numbers.get(field) {
                Some(n) => Some(TypedValue::Number(*n)),
                None => match row.get(field) {
                    CellValue::Number(n) => Some(TypedValue::Number(*n)),
                    cell => DataCleaner.clean_text(cell).map(TypedValue::Text),
                },
            };
            if let Some(value) = value {
                fields.insert(field.to_string(), value);
            }
        }

        Ok(ValidatedRow {
            row_number,
            quantity,
            unit_price,
            subtotal,
            fields,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::ImportVariant;
    use crate::importer::variant_profile::fields::*;

    fn make_row(row_number: usize, cells: &[(&str, CellValue)]) -> NormalizedRow {
        let mut row = NormalizedRow::new(row_number);
        for (field, cell) in cells {
            row.cells.insert(field.to_string(), cell.clone());
        }
        row
    }

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn num(n: f64) -> CellValue {
        CellValue::Number(n)
    }

    fn requisition() -> VariantProfile {
        VariantProfile::for_variant(ImportVariant::Requisition)
    }

    fn complex() -> VariantProfile {
        VariantProfile::for_variant(ImportVariant::ComplexSaleOrder)
    }

    fn kind_of(err: ImportError) -> (usize, String, RowErrorKind) {
        match err {
            ImportError::RowValidation { row, field, kind } => (row, field, kind),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_valid_requisition_row() {
        let row = make_row(
            2,
            &[
                (NOMBRE, text(" Bolt M6 ")),
                (CANTIDAD, num(10.0)),
                (PRECIO_UNITARIO, text("0.5")),
                (DESCRIPCION, text("Acero")),
            ],
        );
        let validated = RowValidator
            .validate_row(&row, &requisition(), &ImportSettings::default())
            .unwrap();
        assert_eq!(validated.quantity, 10.0);
        assert_eq!(validated.unit_price, 0.5);
        assert_eq!(validated.subtotal, None);
        assert_eq!(validated.text(NOMBRE), Some("Bolt M6".to_string()));
        assert_eq!(validated.text(DESCRIPCION), Some("Acero".to_string()));
    }

    #[test]
    fn test_missing_field_first() {
        let row = make_row(
            7,
            &[
                (NOMBRE, text("Bolt")),
                (CANTIDAD, text("   ")),
                (PRECIO_UNITARIO, text("#N/A")),
            ],
        );
        let (r, field, kind) = kind_of(
            RowValidator
                .validate_row(&row, &requisition(), &ImportSettings::default())
                .unwrap_err(),
        );
        assert_eq!((r, field.as_str()), (7, CANTIDAD));
        assert_eq!(kind, RowErrorKind::MissingField);
    }

    #[test]
    fn test_zero_forbidden_before_sentinel() {
        let row = make_row(
            3,
            &[
                (NOMBRE, text("0")),
                (CANTIDAD, text("#REF!")),
                (PRECIO_UNITARIO, num(1.0)),
            ],
        );
        let (_, field, kind) = kind_of(
            RowValidator
                .validate_row(&row, &requisition(), &ImportSettings::default())
                .unwrap_err(),
        );
        assert_eq!(field, NOMBRE);
        assert_eq!(
            kind,
            RowErrorKind::ZeroForbidden {
                value: "0".to_string()
            }
        );
    }

    #[test]
    fn test_sentinel_in_optional_field() {
        let row = make_row(
            4,
            &[
                (NOMBRE, text("Bolt")),
                (CANTIDAD, num(2.0)),
                (PRECIO_UNITARIO, num(1.0)),
                (DESCRIPCION, text("#value!")),
            ],
        );
        let (_, field, kind) = kind_of(
            RowValidator
                .validate_row(&row, &requisition(), &ImportSettings::default())
                .unwrap_err(),
        );
        assert_eq!(field, DESCRIPCION);
        assert_eq!(
            kind,
            RowErrorKind::SentinelError {
                marker: "#VALUE!".to_string()
            }
        );
    }

    #[test]
    fn test_numeric_format_reports_raw_value() {
        let row = make_row(
            5,
            &[
                (NOMBRE, text("Bolt")),
                (CANTIDAD, text("diez")),
                (PRECIO_UNITARIO, num(1.0)),
            ],
        );
        let (_, field, kind) = kind_of(
            RowValidator
                .validate_row(&row, &requisition(), &ImportSettings::default())
                .unwrap_err(),
        );
        assert_eq!(field, CANTIDAD);
        assert_eq!(
            kind,
            RowErrorKind::NumericFormat {
                value: "diez".to_string()
            }
        );
    }

    #[test]
    fn test_range_rules() {
        let settings = ImportSettings::default();

        let negative_price = make_row(
            2,
            &[
                (NOMBRE, text("Bolt")),
                (CANTIDAD, num(2.0)),
                (PRECIO_UNITARIO, num(-1.0)),
            ],
        );
        let (_, field, kind) = kind_of(
            RowValidator
                .validate_row(&negative_price, &requisition(), &settings)
                .unwrap_err(),
        );
        assert_eq!(field, PRECIO_UNITARIO);
        assert_eq!(
            kind,
            RowErrorKind::Range {
                value: -1.0,
                rule: RangeRule::AtLeast(0.0)
            }
        );

        let fractional = make_row(
            3,
            &[
                (NOMBRE, text("Bolt")),
                (CANTIDAD, num(0.5)),
                (PRECIO_UNITARIO, num(1.0)),
            ],
        );
        let (_, _, kind) = kind_of(
            RowValidator
                .validate_row(&fractional, &requisition(), &settings)
                .unwrap_err(),
        );
        assert_eq!(
            kind,
            RowErrorKind::Range {
                value: 0.5,
                rule: RangeRule::AtLeast(1.0)
            }
        );

        let negative_qty = make_row(
            4,
            &[
                (PRODUCT_CODE, text("A1")),
                (QUANTITY, num(-2.0)),
                (PRICE_UNIT, num(1.0)),
            ],
        );
        let (_, _, kind) = kind_of(
            RowValidator
                .validate_row(
                    &negative_qty,
                    &VariantProfile::for_variant(ImportVariant::SimpleSaleOrder),
                    &settings,
                )
                .unwrap_err(),
        );
        assert_eq!(
            kind,
            RowErrorKind::Range {
                value: -2.0,
                rule: RangeRule::GreaterThan(0.0)
            }
        );
    }

    fn complex_row(row_number: usize, subtotal: f64) -> NormalizedRow {
        make_row(
            row_number,
            &[
                (TIPOLOGIA, text("P1")),
                (CODIGO, text("X1")),
                (CANTIDAD, num(2.0)),
                (SUBTOTAL_UNIDAD, num(5.0)),
                (SUBTOTAL, num(subtotal)),
                (PRECIO_UNITARIO_CARPINTERIA, num(3.0)),
                (CODIGO_DISTANCIA_KM, text("D-20")),
                (PRECIO_UNITARIO_INSTALACION, CellValue::Empty),
            ],
        )
    }

    #[test]
    fn test_subtotal_mismatch() {
        let (row, field, kind) = kind_of(
            RowValidator
                .validate_row(&complex_row(2, 11.0), &complex(), &ImportSettings::default())
                .unwrap_err(),
        );
        assert_eq!(row, 2);
        assert_eq!(field, SUBTOTAL);
        assert_eq!(
            kind,
            RowErrorKind::SubtotalMismatch {
                computed: 10.0,
                declared: 11.0
            }
        );
    }

    #[test]
    fn test_subtotal_tolerance() {
        let settings = ImportSettings::default().with_subtotal_tolerance(0.01);
        let validated = RowValidator
            .validate_row(&complex_row(2, 10.005), &complex(), &settings)
            .unwrap();
        assert_eq!(validated.subtotal, Some(10.005));
    }

    #[test]
    fn test_complex_row_fields() {
        let validated = RowValidator
            .validate_row(&complex_row(9, 10.0), &complex(), &ImportSettings::default())
            .unwrap();
        assert_eq!(validated.unit_price, 5.0);
        assert_eq!(validated.number(PRECIO_UNITARIO_CARPINTERIA), Some(3.0));
        assert_eq!(validated.text(CODIGO_DISTANCIA_KM), Some("D-20".to_string()));
        assert!(!validated.fields.contains_key(PRECIO_UNITARIO_INSTALACION));
        assert!(!validated.fields.contains_key(DESCRIPCION));
    }
}
