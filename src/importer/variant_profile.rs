// ==========================================
// Excel 订单行导入 - 导入流程列结构定义
// ==========================================
// 职责: 每条导入流程的同义词映射 / 必需列 / 必填字段 / 数值字段 / 产品匹配字段
// 说明: 规范列名即表格模板中的列名（采购申请与复杂销售订单为大写西语，
//       简单销售订单为小写英文）
// ==========================================

use crate::domain::types::{DocumentKind, ImportVariant, ResolutionStrategy};

// ==========================================
// 规范列名常量
// ==========================================
pub mod fields {
    // 采购申请
    pub const NOMBRE: &str = "NOMBRE";
    pub const CANTIDAD: &str = "CANTIDAD";
    pub const PRECIO_UNITARIO: &str = "PRECIO_UNITARIO";
    pub const DESCRIPCION: &str = "DESCRIPCION";
    pub const VARIANTES: &str = "VARIANTES";
    pub const DETALLES: &str = "DETALLES";

    // 简单销售订单
    pub const PRODUCT_CODE: &str = "product_code";
    pub const QUANTITY: &str = "quantity";
    pub const PRICE_UNIT: &str = "price_unit";

    // 复杂销售订单
    pub const TIPOLOGIA: &str = "TIPOLOGIA";
    pub const CODIGO: &str = "CODIGO";
    pub const PRECIO_UNITARIO_CARPINTERIA: &str = "PRECIO UNITARIO CARPINTERIA";
    pub const CODIGO_DISTANCIA_KM: &str = "CODIGO DISTANCIA /KM";
    pub const PRECIO_UNITARIO_INSTALACION: &str = "PRECIO UNITARIO INSTALACION";
    pub const SUBTOTAL_UNIDAD: &str = "SUBTOTAL UNIDAD";
    pub const SUBTOTAL: &str = "SUBTOTAL";
    pub const NOMBRE_DEL_PRODUCTO: &str = "NOMBRE DEL PRODUCTO";
}

use fields::*;

// ==========================================
// 同义词表（键为 trim + 小写 + 空白折叠后的表头）
// ==========================================
const REQUISITION_SYNONYMS: &[(&str, &str)] = &[
    ("producto", NOMBRE),
    ("nombre", NOMBRE),
    ("cantidad", CANTIDAD),
    ("precio unitario", PRECIO_UNITARIO),
    ("precio_unitario", PRECIO_UNITARIO),
    ("descripcion", DESCRIPCION),
    ("descripción", DESCRIPCION),
    ("variantes", VARIANTES),
    ("detalles", DETALLES),
];

const SIMPLE_SALE_SYNONYMS: &[(&str, &str)] = &[
    ("product_code", PRODUCT_CODE),
    ("product code", PRODUCT_CODE),
    ("quantity", QUANTITY),
    ("qty", QUANTITY),
    ("price_unit", PRICE_UNIT),
    ("unit price", PRICE_UNIT),
];

const COMPLEX_SALE_SYNONYMS: &[(&str, &str)] = &[
    ("tipologia", TIPOLOGIA),
    ("tipología", TIPOLOGIA),
    ("cantidad", CANTIDAD),
    ("codigo", CODIGO),
    ("código", CODIGO),
    ("descripcion", DESCRIPCION),
    ("descripción", DESCRIPCION),
    ("precio unitario carpinteria", PRECIO_UNITARIO_CARPINTERIA),
    ("precio unitario carpintería", PRECIO_UNITARIO_CARPINTERIA),
    ("codigo distancia /km", CODIGO_DISTANCIA_KM),
    ("código distancia /km", CODIGO_DISTANCIA_KM),
    ("precio unitario instalacion", PRECIO_UNITARIO_INSTALACION),
    ("precio unitario instalación", PRECIO_UNITARIO_INSTALACION),
    ("subtotal unidad", SUBTOTAL_UNIDAD),
    ("subtotal", SUBTOTAL),
    ("nombre del producto", NOMBRE_DEL_PRODUCTO),
];

const COMPLEX_SALE_COLUMNS: &[&str] = &[
    TIPOLOGIA,
    CANTIDAD,
    CODIGO,
    DESCRIPCION,
    PRECIO_UNITARIO_CARPINTERIA,
    CODIGO_DISTANCIA_KM,
    PRECIO_UNITARIO_INSTALACION,
    SUBTOTAL_UNIDAD,
    SUBTOTAL,
];

const COMPLEX_SALE_EXPORT_COLUMNS: &[&str] = &[
    TIPOLOGIA,
    CANTIDAD,
    CODIGO,
    DESCRIPCION,
    PRECIO_UNITARIO_CARPINTERIA,
    CODIGO_DISTANCIA_KM,
    PRECIO_UNITARIO_INSTALACION,
    SUBTOTAL_UNIDAD,
    SUBTOTAL,
    NOMBRE_DEL_PRODUCTO,
];

const COMPLEX_SALE_EXTRAS: &[(&str, &str)] = &[
    (TIPOLOGIA, "x_studio_tipologia"),
    (PRECIO_UNITARIO_CARPINTERIA, "x_studio_precio_unitario_carpinteria"),
    (CODIGO_DISTANCIA_KM, "x_studio_codigo_distancia"),
    (PRECIO_UNITARIO_INSTALACION, "x_studio_precio_unitario_instalacion"),
];

// ==========================================
// VariantProfile - 导入流程列结构
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VariantProfile {
    pub variant: ImportVariant,
    pub synonyms: &'static [(&'static str, &'static str)],
    pub required_columns: &'static [&'static str], // 表头必须存在
    pub required_fields: &'static [&'static str],  // 行内不可为空
    pub zero_forbidden_fields: &'static [&'static str],
    pub numeric_fields: &'static [&'static str], // 必填数值
    pub optional_numeric_fields: &'static [&'static str], // 有值时须为数值
    pub non_negative_fields: &'static [&'static str],
    pub quantity_field: &'static str,
    pub unit_price_field: &'static str,
    pub subtotal_field: Option<&'static str>,
    pub enforces_min_quantity: bool, // 采购申请: 数量 ≥ 配置最小值
    pub product_key_field: &'static str,
    pub product_name_fields: &'static [&'static str], // 新建产品名称来源（取首个非空）
    pub description_candidates: &'static [&'static str], // 取表中首个存在的列
    pub extra_attributes: &'static [(&'static str, &'static str)], // 列 → 单据行扩展属性
    pub requires_export_sheet: bool,
}

impl VariantProfile {
    pub fn for_variant(variant: ImportVariant) -> Self {
        match variant {
            ImportVariant::Requisition => Self {
                variant,
                synonyms: REQUISITION_SYNONYMS,
                required_columns: &[NOMBRE, CANTIDAD, PRECIO_UNITARIO],
                required_fields: &[NOMBRE, CANTIDAD, PRECIO_UNITARIO],
                zero_forbidden_fields: &[NOMBRE],
                numeric_fields: &[CANTIDAD, PRECIO_UNITARIO],
                optional_numeric_fields: &[],
                non_negative_fields: &[PRECIO_UNITARIO],
                quantity_field: CANTIDAD,
                unit_price_field: PRECIO_UNITARIO,
                subtotal_field: None,
                enforces_min_quantity: true,
                product_key_field: NOMBRE,
                product_name_fields: &[NOMBRE],
                description_candidates: &[DESCRIPCION, VARIANTES, DETALLES],
                extra_attributes: &[],
                requires_export_sheet: false,
            },
            ImportVariant::SimpleSaleOrder => Self {
                variant,
                synonyms: SIMPLE_SALE_SYNONYMS,
                required_columns: &[PRODUCT_CODE, QUANTITY, PRICE_UNIT],
                required_fields: &[PRODUCT_CODE, QUANTITY, PRICE_UNIT],
                zero_forbidden_fields: &[PRODUCT_CODE],
                numeric_fields: &[QUANTITY, PRICE_UNIT],
                optional_numeric_fields: &[],
                non_negative_fields: &[PRICE_UNIT],
                quantity_field: QUANTITY,
                unit_price_field: PRICE_UNIT,
                subtotal_field: None,
                enforces_min_quantity: false,
                product_key_field: PRODUCT_CODE,
                product_name_fields: &[],
                description_candidates: &[],
                extra_attributes: &[],
                requires_export_sheet: false,
            },
            ImportVariant::ComplexSaleOrder => Self {
                variant,
                synonyms: COMPLEX_SALE_SYNONYMS,
                required_columns: COMPLEX_SALE_COLUMNS,
                required_fields: &[CODIGO, CANTIDAD, SUBTOTAL_UNIDAD, SUBTOTAL],
                zero_forbidden_fields: &[CODIGO, DESCRIPCION],
                numeric_fields: &[CANTIDAD, SUBTOTAL_UNIDAD, SUBTOTAL],
                optional_numeric_fields: &[
                    PRECIO_UNITARIO_CARPINTERIA,
                    PRECIO_UNITARIO_INSTALACION,
                ],
                non_negative_fields: &[
                    SUBTOTAL_UNIDAD,
                    SUBTOTAL,
                    PRECIO_UNITARIO_CARPINTERIA,
                    PRECIO_UNITARIO_INSTALACION,
                ],
                quantity_field: CANTIDAD,
                unit_price_field: SUBTOTAL_UNIDAD,
                subtotal_field: Some(SUBTOTAL),
                enforces_min_quantity: false,
                product_key_field: CODIGO,
                product_name_fields: &[DESCRIPCION],
                description_candidates: &[DESCRIPCION],
                extra_attributes: COMPLEX_SALE_EXTRAS,
                requires_export_sheet: false,
            },
            ImportVariant::ComplexSaleOrderExport => Self {
                variant,
                synonyms: COMPLEX_SALE_SYNONYMS,
                required_columns: COMPLEX_SALE_EXPORT_COLUMNS,
                required_fields: &[CODIGO, CANTIDAD, SUBTOTAL_UNIDAD, SUBTOTAL],
                zero_forbidden_fields: &[CODIGO, DESCRIPCION, NOMBRE_DEL_PRODUCTO],
                numeric_fields: &[CANTIDAD, SUBTOTAL_UNIDAD, SUBTOTAL],
                optional_numeric_fields: &[
                    PRECIO_UNITARIO_CARPINTERIA,
                    PRECIO_UNITARIO_INSTALACION,
                ],
                non_negative_fields: &[
                    SUBTOTAL_UNIDAD,
                    SUBTOTAL,
                    PRECIO_UNITARIO_CARPINTERIA,
                    PRECIO_UNITARIO_INSTALACION,
                ],
                quantity_field: CANTIDAD,
                unit_price_field: SUBTOTAL_UNIDAD,
                subtotal_field: Some(SUBTOTAL),
                enforces_min_quantity: false,
                product_key_field: CODIGO,
                product_name_fields: &[NOMBRE_DEL_PRODUCTO],
                description_candidates: &[DESCRIPCION],
                extra_attributes: COMPLEX_SALE_EXTRAS,
                requires_export_sheet: true,
            },
        }
    }

    pub fn strategy(&self) -> ResolutionStrategy {
        self.variant.strategy()
    }

    pub fn document_kind(&self) -> DocumentKind {
        self.variant.document_kind()
    }

    /// 查找同义词对应的规范列名
    pub fn canonical_for(&self, normalized_header: &str) -> Option<&'static str> {
        self.synonyms
            .iter()
            .find(|(synonym, _)| *synonym == normalized_header)
            .map(|(_, canonical)| *canonical)
    }

    pub fn is_numeric(&self, field: &str) -> bool {
        self.numeric_fields.contains(&field) || self.optional_numeric_fields.contains(&field)
    }

    /// 本流程读取的全部字段（去重，保持声明顺序）
    ///
    /// 公式错误标记检测覆盖这些字段
    pub fn consumed_fields(&self) -> Vec<&'static str> {
        let mut result: Vec<&'static str> = Vec::new();
        let groups: [&[&'static str]; 5] = [
            self.required_fields,
            self.numeric_fields,
            self.optional_numeric_fields,
            self.product_name_fields,
            self.description_candidates,
        ];
        for field in groups
            .iter()
            .flat_map(|g| g.iter().copied())
            .chain(self.extra_attributes.iter().map(|(column, _)| *column))
        {
            if !result.contains(&field) {
                result.push(field);
            }
        }
        result
    }
}
