// ==========================================
// Excel 订单行导入 - 产品匹配
// ==========================================
// 策略:
// - ExactNameThenFuzzy: 名称精确 → 名称包含（不区分大小写，取 ID 最小者）
// - ExactCodeOnly:      编码精确
// - ExactCodeOrCreate:  编码精确，未命中则新建（名称缺失时使用占位名称）
// 红线: 同一行对目录最多一次写入；新建产品不随导入失败回滚
// ==========================================

use crate::config::ImportSettings;
use crate::domain::line::{NewProduct, ProductRef, ValidatedRow};
use crate::domain::types::ResolutionStrategy;
use crate::importer::error::{ImportError, ImportResult, ProductLookup, RowErrorKind};
use crate::importer::line_importer_trait::ProductResolver as ProductResolverTrait;
use crate::importer::variant_profile::VariantProfile;
use crate::repository::{CatalogPort, RepositoryError};
use tracing::{debug, info};

pub struct ProductResolver;

impl ProductResolver {
    fn key_text(row: &ValidatedRow, profile: &VariantProfile) -> ImportResult<String> {
        row.text(profile.product_key_field).ok_or_else(|| {
            ImportError::row_validation(
                row.row_number,
                profile.product_key_field,
                RowErrorKind::MissingField,
            )
        })
    }

    fn read_error(row: &ValidatedRow, err: RepositoryError) -> ImportError {
        ImportError::CatalogReadError {
            row: row.row_number,
            message: err.to_string(),
        }
    }

    /// 新建产品请求（名称取首个非空名称列，否则占位名称）
    fn new_product(
        row: &ValidatedRow,
        profile: &VariantProfile,
        code: &str,
        settings: &ImportSettings,
    ) -> NewProduct {
        let name = profile
            .product_name_fields
            .iter()
            .find_map(|field| row.text(field))
            .unwrap_or_else(|| settings.placeholder_product_name.clone());
        let description = profile
            .description_candidates
            .iter()
            .find_map(|field| row.text(field));

        NewProduct {
            name,
            code: Some(code.to_string()),
            list_price: row.unit_price,
            description,
        }
    }
}

impl ProductResolverTrait for ProductResolver {
    fn lookup(
        &self,
        catalog: &dyn CatalogPort,
        row: &ValidatedRow,
        profile: &VariantProfile,
    ) -> ImportResult<Option<ProductRef>> {
        let key = Self::key_text(row, profile)?;

        match profile.strategy() {
            ResolutionStrategy::ExactNameThenFuzzy => {
                if let Some(product) = catalog
                    .find_by_name(&key)
                    .map_err(|e| Self::read_error(row, e))?
                {
                    return Ok(Some(product));
                }
                match catalog
                    .find_by_name_fuzzy(&key)
                    .map_err(|e| Self::read_error(row, e))?
                {
                    Some(product) => {
                        debug!(
                            row = row.row_number,
                            name = %key,
                            matched = %product.name,
                            "名称模糊匹配命中"
                        );
                        Ok(Some(product))
                    }
                    None => Err(ImportError::ProductNotFound {
                        row: row.row_number,
                        lookup: ProductLookup::Name,
                        value: key,
                    }),
                }
            }
            ResolutionStrategy::ExactCodeOnly => match catalog
                .find_by_code(&key)
                .map_err(|e| Self::read_error(row, e))?
            {
                Some(product) => Ok(Some(product)),
                None => Err(ImportError::ProductNotFound {
                    row: row.row_number,
                    lookup: ProductLookup::Code,
                    value: key,
                }),
            },
            ResolutionStrategy::ExactCodeOrCreate => catalog
                .find_by_code(&key)
                .map_err(|e| Self::read_error(row, e)),
        }
    }

    fn resolve(
        &self,
        catalog: &dyn CatalogPort,
        row: &ValidatedRow,
        profile: &VariantProfile,
        settings: &ImportSettings,
    ) -> ImportResult<(ProductRef, bool)> {
        if let Some(product) = self.lookup(catalog, row, profile)? {
            return Ok((product, false));
        }

        // 仅 ExactCodeOrCreate 会走到这里
        let code = Self::key_text(row, profile)?;
        let request = Self::new_product(row, profile, &code, settings);
        let product = catalog
            .create(request)
            .map_err(|e| ImportError::CatalogWriteError {
                row: row.row_number,
                code: code.clone(),
                message: e.to_string(),
            })?;

        info!(
            row = row.row_number,
            product_id = product.id,
            code = %code,
            name = %product.name,
            "新建产品"
        );
        Ok((product, true))
    }
}
