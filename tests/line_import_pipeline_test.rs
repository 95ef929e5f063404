// ==========================================
// 单据行导入管道集成测试
// ==========================================
// 测试目标: 真实 xlsx 载荷 → 完整管道 → 内存协作方
// ==========================================


use order_line_import::config::ImportSettings;
use order_line_import::domain::types::{DocumentKind, ErrorCategory};
use order_line_import::importer::{ImportError, LineImporter, ProductLookup, RowErrorKind};
use order_line_import::repository::{DocumentLineRepository, InMemoryCatalog, InMemoryLineRepository};
use order_line_import::{DocumentRef, ImportVariant};
use test_helpers::*;

// ==========================================
// 规格场景
// ==========================================

#[test]
fn test_scenario_a_requisition_exact_name() {
    let importer = memory_importer(InMemoryCatalog::with_products(vec![
        (None, "Tornillo"),
        (None, "Bolt M6"),
    ]));
    let bytes = single_sheet_xlsx(
        REQUISITION_HEADERS,
        vec![vec![
            Cell::S("Bolt M6"),
            Cell::N(10.0),
            Cell::N(0.5),
            Cell::Blank,
        ]],
    );

    let outcome = importer
        .import(ImportVariant::Requisition, &xlsx_request(bytes, 5))
        .expect("导入应成功");

    assert_eq!(outcome.lines_created(), 1);
    let line = &outcome.lines[0];
    assert_eq!(line.product_id, 2);
    assert_eq!(line.quantity, 10.0);
    assert_eq!(line.unit_price, 0.5);
    assert_eq!(line.description, None);
    assert_eq!(
        line.document,
        DocumentRef::new(DocumentKind::PurchaseRequisition, 5)
    );
}

#[test]
fn test_scenario_b_subtotal_mismatch() {
    let importer = memory_importer(InMemoryCatalog::with_products(vec![(Some("X1"), "Ventana")]));
    let bytes = single_sheet_xlsx(
        COMPLEX_SALE_HEADERS,
        vec![complex_row("X1", "Ventana", 2.0, 5.0, 11.0)],
    );

    let err = importer
        .import(ImportVariant::ComplexSaleOrder, &xlsx_request(bytes, 1))
        .unwrap_err();

    match err {
        ImportError::RowValidation { row, field, kind } => {
            // 表头在第 1 行，首个数据行为第 2 行
            assert_eq!(row, 2);
            assert_eq!(field, "SUBTOTAL");
            assert_eq!(
                kind,
                RowErrorKind::SubtotalMismatch {
                    computed: 10.0,
                    declared: 11.0
                }
            );
        }
        other => panic!("unexpected: {:?}", other),
    }
    assert!(importer.lines().all_lines().is_empty());
}

#[test]
fn test_scenario_c_unknown_product_name() {
    let importer = memory_importer(InMemoryCatalog::with_products(vec![
        (None, "Bolt M6"),
        (None, "Nut M6"),
    ]));
    let bytes = single_sheet_xlsx(
        REQUISITION_HEADERS,
        vec![vec![
            Cell::S("Unknown Widget"),
            Cell::N(1.0),
            Cell::N(1.0),
            Cell::Blank,
        ]],
    );

    let err = importer
        .import(ImportVariant::Requisition, &xlsx_request(bytes, 1))
        .unwrap_err();

    match &err {
        ImportError::ProductNotFound { row, lookup, value } => {
            assert_eq!(*row, 2);
            assert_eq!(*lookup, ProductLookup::Name);
            assert_eq!(value, "Unknown Widget");
        }
        other => panic!("unexpected: {:?}", other),
    }
    assert!(err.user_message("es").contains("Unknown Widget"));
    assert!(err.user_message("en").contains("Unknown Widget"));
}

#[test]
fn test_scenario_d_export_layout_creates_product() {
    let importer = memory_importer(InMemoryCatalog::new());
    let header: Vec<Cell> = COMPLEX_SALE_EXPORT_HEADERS
        .iter()
        .map(|h| Cell::S(*h))
        .collect();
    let mut named = complex_row("X1", "Ventana", 2.0, 5.0, 10.0);
    named.push(Cell::S("Ventana corredera 2H"));
    let mut unnamed = complex_row("X2", "Puerta", 1.0, 7.5, 7.5);
    unnamed.push(Cell::Blank);

    let bytes = build_xlsx(&[
        ("Resumen", vec![vec![Cell::S("total"), Cell::N(17.5)]]),
        ("EXPORTACION ODOO", vec![header, named, unnamed]),
    ]);

    let outcome = importer
        .import(ImportVariant::ComplexSaleOrderExport, &xlsx_request(bytes, 3))
        .expect("导入应成功");

    assert_eq!(outcome.created_products.len(), 2);
    let products = importer.catalog().products();
    assert_eq!(products[0].code.as_deref(), Some("X1"));
    assert_eq!(products[0].name, "Ventana corredera 2H");
    assert_eq!(products[1].name, ImportSettings::default().placeholder_product_name);

    assert_eq!(outcome.lines[0].product_id, products[0].id);
    assert_eq!(outcome.lines[0].unit_price, 5.0);
    assert_eq!(outcome.lines[0].description.as_deref(), Some("Ventana"));
    assert_eq!(
        outcome.lines[0].extra_attributes.get("x_studio_tipologia"),
        Some(&serde_json::json!("P1"))
    );
    assert_eq!(outcome.lines[1].product_id, products[1].id);
}

// ==========================================
// 可测属性
// ==========================================

#[test]
fn test_missing_columns_reported() {
    let importer = memory_importer(InMemoryCatalog::new());
    let bytes = single_sheet_xlsx(
        &["NOMBRE", "Observacion"],
        vec![vec![Cell::S("Bolt"), Cell::S("x")]],
    );

    let err = importer
        .import(ImportVariant::Requisition, &xlsx_request(bytes, 1))
        .unwrap_err();

    match &err {
        ImportError::SchemaError { missing, found } => {
            assert_eq!(missing, &vec!["CANTIDAD".to_string(), "PRECIO_UNITARIO".to_string()]);
            assert_eq!(found, &vec!["NOMBRE".to_string(), "observacion".to_string()]);
        }
        other => panic!("unexpected: {:?}", other),
    }
    let message = err.user_message("es");
    assert!(message.contains("CANTIDAD"));
    assert!(message.contains("PRECIO_UNITARIO"));
}

#[test]
fn test_zero_quantity_rows_are_silently_dropped() {
    let importer = memory_importer(InMemoryCatalog::with_products(vec![
        (Some("A1"), "Widget"),
        (Some("B2"), "Gadget"),
    ]));
    let bytes = single_sheet_xlsx(
        SIMPLE_SALE_HEADERS,
        vec![
            vec![Cell::S("A1"), Cell::N(3.0), Cell::N(2.0)],
            vec![Cell::S("ZZ"), Cell::N(0.0), Cell::N(2.0)],
            vec![Cell::Blank, Cell::Blank, Cell::Blank],
            vec![Cell::S("B2"), Cell::N(1.0), Cell::N(4.0)],
        ],
    );

    let outcome = importer
        .import(ImportVariant::SimpleSaleOrder, &xlsx_request(bytes, 9))
        .expect("导入应成功");

    assert_eq!(outcome.lines_created(), 2);
    assert_eq!(outcome.skipped_zero_quantity_rows, 1);
    let rows: Vec<usize> = outcome.lines.iter().map(|l| l.source_row).collect();
    assert_eq!(rows, vec![2, 5]);
}

#[test]
fn test_lookup_only_import_is_repeatable_without_catalog_writes() {
    let importer = memory_importer(InMemoryCatalog::with_products(vec![(Some("A1"), "Widget")]));
    let bytes = single_sheet_xlsx(
        SIMPLE_SALE_HEADERS,
        vec![vec![Cell::S("A1"), Cell::N(2.0), Cell::N(10.0)]],
    );
    let request = xlsx_request(bytes, 4);

    let first = importer.import(ImportVariant::SimpleSaleOrder, &request).unwrap();
    let second = importer.import(ImportVariant::SimpleSaleOrder, &request).unwrap();

    assert_ne!(first.batch_id, second.batch_id);
    assert_eq!(first.lines, second.lines);
    assert_ne!(first.line_ids, second.line_ids);
    assert_eq!(importer.lines().all_lines().len(), 2);
    assert_eq!(importer.catalog().create_calls(), 0);
}

#[test]
fn test_quantity_and_price_round_trip() {
    let importer = memory_importer(InMemoryCatalog::with_products(vec![(Some("A1"), "Widget")]));
    let bytes = single_sheet_xlsx(
        SIMPLE_SALE_HEADERS,
        vec![vec![Cell::S("A1"), Cell::N(3.25), Cell::N(19.99)]],
    );

    let outcome = importer
        .import(ImportVariant::SimpleSaleOrder, &xlsx_request(bytes, 4))
        .unwrap();

    let document = DocumentRef::new(DocumentKind::SaleOrder, 4);
    let stored = importer.lines().list_lines(document).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].0, outcome.line_ids[0]);
    assert_eq!(stored[0].1.quantity, 3.25);
    assert_eq!(stored[0].1.unit_price, 19.99);
}

#[test]
fn test_sentinel_marker_in_cell() {
    let importer = memory_importer(InMemoryCatalog::with_products(vec![(None, "Bolt M6")]));
    let bytes = single_sheet_xlsx(
        REQUISITION_HEADERS,
        vec![
            vec![Cell::S("Bolt M6"), Cell::N(1.0), Cell::N(1.0), Cell::Blank],
            vec![Cell::S("Bolt M6"), Cell::N(1.0), Cell::S("#N/A"), Cell::Blank],
        ],
    );

    let err = importer
        .import(ImportVariant::Requisition, &xlsx_request(bytes, 1))
        .unwrap_err();

    assert_eq!(err.category(), ErrorCategory::RowValidation);
    assert_eq!(err.row_number(), Some(3));
    assert_eq!(err.field(), Some("PRECIO_UNITARIO"));
    assert!(err.user_message("es").contains("#N/A"));
}

#[test]
fn test_export_layout_requires_sheet() {
    let importer = memory_importer(InMemoryCatalog::new());
    let mut rows = vec![COMPLEX_SALE_EXPORT_HEADERS
        .iter()
        .map(|h| Cell::S(*h))
        .collect::<Vec<_>>()];
    let mut row = complex_row("X1", "Ventana", 1.0, 1.0, 1.0);
    row.push(Cell::S("Ventana"));
    rows.push(row);
    let bytes = build_xlsx(&[("Hoja1", rows)]);

    let err = importer
        .import(ImportVariant::ComplexSaleOrderExport, &xlsx_request(bytes, 1))
        .unwrap_err();

    match err {
        ImportError::SheetNotFound { sheet, available } => {
            assert_eq!(sheet, "EXPORTACION ODOO");
            assert_eq!(available, vec!["Hoja1".to_string()]);
        }
        other => panic!("unexpected: {:?}", other),
    }
    assert_eq!(importer.catalog().create_calls(), 0);
}

#[test]
fn test_export_layout_rejects_csv_payload() {
    let importer = memory_importer(InMemoryCatalog::new());
    let csv = format!(
        "{}\nP1,1,X1,Ventana,,,,10,10,Ventana corredera\n",
        COMPLEX_SALE_EXPORT_HEADERS.join(",")
    );
    let request = order_line_import::ImportRequest::new(csv.into_bytes(), 1)
        .with_file_name("lineas.csv");

    let err = importer
        .import(ImportVariant::ComplexSaleOrderExport, &request)
        .unwrap_err();

    match err {
        ImportError::SheetNotFound { sheet, available } => {
            assert_eq!(sheet, "EXPORTACION ODOO");
            assert!(available.is_empty());
        }
        other => panic!("unexpected: {:?}", other),
    }
    assert_eq!(importer.catalog().create_calls(), 0);
    assert!(importer.lines().all_lines().is_empty());
}

#[test]
fn test_requested_sheet_is_used() {
    let importer = memory_importer(InMemoryCatalog::with_products(vec![(Some("A1"), "Widget")]));
    let header = || {
        SIMPLE_SALE_HEADERS
            .iter()
            .map(|h| Cell::S(*h))
            .collect::<Vec<_>>()
    };
    let bytes = build_xlsx(&[
        ("Notas", vec![vec![Cell::S("sin datos")]]),
        (
            "Lineas",
            vec![header(), vec![Cell::S("A1"), Cell::N(1.0), Cell::N(1.0)]],
        ),
    ]);

    let request = xlsx_request(bytes, 2).with_sheet_name(" lineas ");
    let outcome = importer
        .import(ImportVariant::SimpleSaleOrder, &request)
        .unwrap();
    assert_eq!(outcome.lines_created(), 1);
}

#[test]
fn test_collaborator_rejection_writes_nothing() {
    let importer = memory_importer_with(
        InMemoryCatalog::with_products(vec![(Some("A1"), "Widget")]),
        InMemoryLineRepository::new().reject_source_row(3),
        ImportSettings::default(),
    );
    let bytes = single_sheet_xlsx(
        SIMPLE_SALE_HEADERS,
        vec![
            vec![Cell::S("A1"), Cell::N(1.0), Cell::N(1.0)],
            vec![Cell::S("A1"), Cell::N(2.0), Cell::N(1.0)],
        ],
    );

    let err = importer
        .import(ImportVariant::SimpleSaleOrder, &xlsx_request(bytes, 1))
        .unwrap_err();

    assert_eq!(err.category(), ErrorCategory::CollaboratorWrite);
    assert_eq!(err.row_number(), Some(3));
    assert!(importer.lines().all_lines().is_empty());
}

#[test]
fn test_subtotal_tolerance_setting() {
    let importer = memory_importer_with(
        InMemoryCatalog::with_products(vec![(Some("X1"), "Ventana")]),
        InMemoryLineRepository::new(),
        ImportSettings::default().with_subtotal_tolerance(0.01),
    );
    let bytes = single_sheet_xlsx(
        COMPLEX_SALE_HEADERS,
        vec![complex_row("X1", "Ventana", 3.0, 0.1, 0.3)],
    );

    let outcome = importer
        .import(ImportVariant::ComplexSaleOrder, &xlsx_request(bytes, 1))
        .expect("容差范围内应通过");
    assert_eq!(outcome.lines_created(), 1);
}

#[test]
fn test_preview_reports_every_row_issue() {
    let importer = memory_importer(InMemoryCatalog::with_products(vec![(Some("A1"), "Widget")]));
    let bytes = single_sheet_xlsx(
        SIMPLE_SALE_HEADERS,
        vec![
            vec![Cell::S("A1"), Cell::N(1.0), Cell::N(1.0)],
            vec![Cell::S("NOPE"), Cell::N(1.0), Cell::N(1.0)],
            vec![Cell::S("A1"), Cell::S("dos"), Cell::N(1.0)],
            vec![Cell::S("A1"), Cell::N(1.0), Cell::N(-3.0)],
        ],
    );

    let preview = importer
        .preview(ImportVariant::SimpleSaleOrder, &xlsx_request(bytes, 1))
        .unwrap();

    assert_eq!(preview.total_rows, 4);
    assert_eq!(preview.valid_rows, 1);
    let categories: Vec<(usize, ErrorCategory)> = preview
        .issues
        .iter()
        .map(|i| (i.row_number, i.category))
        .collect();
    assert_eq!(
        categories,
        vec![
            (3, ErrorCategory::ProductNotFound),
            (4, ErrorCategory::RowValidation),
            (5, ErrorCategory::RowValidation),
        ]
    );
    assert!(importer.lines().all_lines().is_empty());
}
