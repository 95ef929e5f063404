// ==========================================
// Excel 订单行导入 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::import_config_trait::ImportConfigReader;
use crate::config::import_settings::{
    DEFAULT_EXPORT_SHEET_NAME, DEFAULT_PLACEHOLDER_PRODUCT_NAME,
    DEFAULT_REQUISITION_MIN_QUANTITY, DEFAULT_SENTINEL_MARKERS,
};
use crate::db::open_sqlite_connection;
use rusqlite::{params, Connection};
use serde_json::json;
use std::collections::BTreeMap;
use std::error::Error;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 读取 global scope 的配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        self.get_config_value(key)
    }

    /// 写入 global scope 的配置值（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value, updated_at) VALUES ('global', ?1, ?2, ?3)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = ?3",
            params![key, value, chrono::Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// 从 config_kv 表读取数值配置，带默认值
    fn get_f64_or_default(&self, key: &str, default: f64) -> Result<f64, Box<dyn Error>> {
        match self.get_config_value(key)? {
            Some(raw) => {
                let value: f64 = raw
                    .trim()
                    .parse()
                    .map_err(|e| format!("{} 不是有效数值 '{}': {}", key, raw, e))?;
                if !value.is_finite() || value < 0.0 {
                    return Err(format!("{} 必须为非负有限数值: {}", key, raw).into());
                }
                Ok(value)
            }
            None => Ok(default),
        }
    }

    /// 从 config_kv 表读取文本配置，带默认值（空白视为未配置）
    fn get_text_or_default(&self, key: &str, default: &str) -> Result<String, Box<dyn Error>> {
        Ok(self
            .get_config_value(key)?
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| default.to_string()))
    }

    /// 获取所有配置的快照（JSON格式）
    ///
    /// # 用途
    /// - 导入批次日志中记录生效配置
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        let json_value = json!(config_map);
        Ok(serde_json::to_string(&json_value)?)
    }
}

impl ImportConfigReader for ConfigManager {
    fn get_subtotal_tolerance(&self) -> Result<f64, Box<dyn Error>> {
        self.get_f64_or_default(config_keys::SUBTOTAL_TOLERANCE, 0.0)
    }

    fn get_sentinel_markers(&self) -> Result<Vec<String>, Box<dyn Error>> {
        match self.get_config_value(config_keys::SENTINEL_MARKERS)? {
            Some(raw) => {
                let markers: Vec<String> = serde_json::from_str(&raw)?;
                Ok(markers
                    .into_iter()
                    .map(|m| m.trim().to_string())
                    .filter(|m| !m.is_empty())
                    .collect())
            }
            None => Ok(DEFAULT_SENTINEL_MARKERS
                .iter()
                .map(|m| m.to_string())
                .collect()),
        }
    }

    fn get_requisition_min_quantity(&self) -> Result<f64, Box<dyn Error>> {
        self.get_f64_or_default(
            config_keys::REQUISITION_MIN_QUANTITY,
            DEFAULT_REQUISITION_MIN_QUANTITY,
        )
    }

    fn get_placeholder_product_name(&self) -> Result<String, Box<dyn Error>> {
        self.get_text_or_default(
            config_keys::PLACEHOLDER_PRODUCT_NAME,
            DEFAULT_PLACEHOLDER_PRODUCT_NAME,
        )
    }

    fn get_export_sheet_name(&self) -> Result<String, Box<dyn Error>> {
        self.get_text_or_default(config_keys::EXPORT_SHEET_NAME, DEFAULT_EXPORT_SHEET_NAME)
    }

    fn get_locale(&self) -> Result<String, Box<dyn Error>> {
        let raw = self.get_text_or_default(config_keys::LOCALE, crate::i18n::DEFAULT_LOCALE)?;
        Ok(crate::i18n::normalize_locale(&raw).to_string())
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 行校验
    pub const SUBTOTAL_TOLERANCE: &str = "import.subtotal_tolerance";
    pub const SENTINEL_MARKERS: &str = "import.sentinel_markers"; // JSON 数组
    pub const REQUISITION_MIN_QUANTITY: &str = "import.requisition_min_quantity";

    // 产品新建
    pub const PLACEHOLDER_PRODUCT_NAME: &str = "import.placeholder_product_name";

    // 文件
    pub const EXPORT_SHEET_NAME: &str = "import.export_sheet_name";

    // 提示语言
    pub const LOCALE: &str = "import.locale";
}
