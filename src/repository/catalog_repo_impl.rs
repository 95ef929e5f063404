// ==========================================
// Excel 订单行导入 - 产品目录 Repository 实现
// ==========================================
// 职责: 基于 product 表实现 CatalogPort（使用 rusqlite）
// 红线: Repository 不含业务规则，只做查找 / 新建
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::line::{NewProduct, ProductRef};
use crate::repository::catalog_repo::CatalogPort;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// SqliteCatalogRepository
// ==========================================
pub struct SqliteCatalogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteCatalogRepository {
    /// 创建新的 Repository 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_product(row: &Row) -> rusqlite::Result<ProductRef> {
        Ok(ProductRef {
            id: row.get(0)?,
            code: row.get(1)?,
            name: row.get(2)?,
        })
    }

    fn query_first(&self, sql: &str, arg: &str) -> RepositoryResult<Option<ProductRef>> {
        let conn = self.get_conn()?;
        let product = conn
            .query_row(sql, params![arg], Self::map_product)
            .optional()?;
        Ok(product)
    }
}

/// 转义 LIKE 通配符（配合 ESCAPE '\'）
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

impl CatalogPort for SqliteCatalogRepository {
    fn find_by_code(&self, code: &str) -> RepositoryResult<Option<ProductRef>> {
        self.query_first(
            "SELECT id, default_code, name FROM product WHERE default_code = ?1 ORDER BY id LIMIT 1",
            code,
        )
    }

    fn find_by_name(&self, name: &str) -> RepositoryResult<Option<ProductRef>> {
        self.query_first(
            "SELECT id, default_code, name FROM product WHERE name = ?1 ORDER BY id LIMIT 1",
            name,
        )
    }

    fn find_by_name_fuzzy(&self, name: &str) -> RepositoryResult<Option<ProductRef>> {
        // 两侧均按 Unicode 小写比较
        let pattern = format!("%{}%", escape_like(&name.to_lowercase()));
        self.query_first(
            r#"
            SELECT id, default_code, name FROM product
            WHERE ulower(name) LIKE ?1 ESCAPE '\'
            ORDER BY id LIMIT 1
            "#,
            &pattern,
        )
    }

    fn create(&self, product: NewProduct) -> RepositoryResult<ProductRef> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO product (default_code, name, description, list_price, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                product.code,
                product.name,
                product.description,
                product.list_price,
                chrono::Utc::now().to_rfc3339(),
            ],
        )?;

        Ok(ProductRef {
            id: conn.last_insert_rowid(),
            code: product.code,
            name: product.name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{configure_sqlite_connection, init_schema};

    fn setup() -> SqliteCatalogRepository {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        init_schema(&conn).unwrap();
        conn.execute_batch(
            r#"
            INSERT INTO product (default_code, name, list_price, created_at)
            VALUES ('P-001', 'Bolt M6', 1.5, '2024-01-01T00:00:00Z');
            INSERT INTO product (default_code, name, list_price, created_at)
            VALUES (NULL, 'Tornillo 100% acero', 2.0, '2024-01-01T00:00:00Z');
            INSERT INTO product (default_code, name, list_price, created_at)
            VALUES ('P-001', 'Bolt M6 duplicate', 1.5, '2024-01-01T00:00:00Z');
            INSERT INTO product (default_code, name, list_price, created_at)
            VALUES ('N-7', 'TUERCA ÑANDÚ M6', 0.3, '2024-01-01T00:00:00Z');
            "#,
        )
        .unwrap();
        SqliteCatalogRepository::from_connection(Arc::new(Mutex::new(conn)))
    }

    #[test]
    fn test_find_by_code_returns_lowest_id() {
        let repo = setup();
        let found = repo.find_by_code("P-001").unwrap().unwrap();
        assert_eq!(found.id, 1);
        assert_eq!(found.name, "Bolt M6");
        assert!(repo.find_by_code("P-404").unwrap().is_none());
    }

    #[test]
    fn test_find_by_name_exact_is_case_sensitive() {
        let repo = setup();
        assert_eq!(repo.find_by_name("Bolt M6").unwrap().unwrap().id, 1);
        assert!(repo.find_by_name("bolt m6").unwrap().is_none());
    }

    #[test]
    fn test_fuzzy_escapes_wildcards() {
        let repo = setup();
        assert_eq!(repo.find_by_name_fuzzy("100%").unwrap().unwrap().id, 2);
        assert_eq!(repo.find_by_name_fuzzy("BOLT").unwrap().unwrap().id, 1);
        assert!(repo.find_by_name_fuzzy("_olt").unwrap().is_none());
    }

    #[test]
    fn test_fuzzy_folds_non_ascii_case() {
        let repo = setup();
        let found = repo.find_by_name_fuzzy("tuerca ñandú").unwrap().unwrap();
        assert_eq!(found.id, 4);
        assert_eq!(found.code.as_deref(), Some("N-7"));

        let memory = crate::repository::InMemoryCatalog::with_products(vec![(
            Some("N-7"),
            "TUERCA ÑANDÚ M6",
        )]);
        assert!(memory.find_by_name_fuzzy("tuerca ñandú").unwrap().is_some());
    }

    #[test]
    fn test_create_product() {
        let repo = setup();
        let created = repo
            .create(NewProduct {
                name: "Puerta batiente".to_string(),
                code: Some("X-9".to_string()),
                list_price: 250.0,
                description: Some("Madera".to_string()),
            })
            .unwrap();
        assert_eq!(created.id, 5);
        assert_eq!(repo.find_by_code("X-9").unwrap(), Some(created));
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like(r"a%b_c\d"), r"a\%b\_c\\d");
    }
}
