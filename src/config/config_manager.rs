// ==========================================
// Hệ thống quản lý hợp đồng - Quản lý cấu hình
// ==========================================
// Trách nhiệm: nạp, truy vấn cấu hình vận hành
// Lưu trữ: bảng config_kv (key-value, scope 'global')
// ==========================================

use crate::db::open_sqlite_connection;
use crate::engine::financial::DEFAULT_VAT_RATE;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tracing::warn;

use crate::engine::approval::DEFAULT_AUTO_MARGIN_THRESHOLD;

/// Tập khóa cấu hình của lõi
pub mod config_keys {
    /// Thuế suất VAT dùng khi ước tính doanh thu (số thập phân, vd 0.10)
    pub const VAT_RATE: &str = "finance/vat_rate";
    /// Ngưỡng biên lợi nhuận (%) cho lối tắt phê duyệt tự động
    pub const AUTO_MARGIN_THRESHOLD: &str = "approval/auto_margin_threshold";
}

// ==========================================
// ConfigManager - Quản lý cấu hình
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// Tạo ConfigManager từ đường dẫn CSDL
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Tạo ConfigManager từ kết nối có sẵn
    ///
    /// Ghi chú: áp lại PRAGMA thống nhất cho kết nối truyền vào (idempotent).
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            crate::db::configure_sqlite_connection(&guard)
                .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        }

        Ok(Self { conn })
    }

    /// Tạo ConfigManager trên CSDL trong bộ nhớ (dành cho test)
    pub fn in_memory() -> RepositoryResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        crate::db::configure_sqlite_connection(&conn)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        crate::db::init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Đọc giá trị cấu hình theo khóa (scope 'global')
    fn get_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Ghi giá trị cấu hình (scope 'global')
    pub fn set_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"INSERT INTO config_kv (scope_id, key, value, updated_at)
               VALUES ('global', ?1, ?2, datetime('now'))
               ON CONFLICT(scope_id, key)
               DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at"#,
            params![key, value],
        )?;

        Ok(())
    }

    /// Đọc cấu hình số thực, dùng mặc định khi thiếu hoặc hỏng
    fn get_f64_or_default(&self, key: &str, default: f64) -> RepositoryResult<f64> {
        match self.get_config_value(key)? {
            Some(raw) => match raw.trim().parse::<f64>() {
                Ok(v) if v.is_finite() => Ok(v),
                _ => {
                    warn!(key, raw = %raw, "giá trị cấu hình hỏng, dùng mặc định");
                    Ok(default)
                }
            },
            None => Ok(default),
        }
    }

    /// Thuế suất VAT cho ước tính doanh thu (mặc định 0.10)
    pub fn vat_rate(&self) -> RepositoryResult<f64> {
        self.get_f64_or_default(config_keys::VAT_RATE, DEFAULT_VAT_RATE)
    }

    /// Ngưỡng biên lợi nhuận (%) cho lối tắt phê duyệt tự động (mặc định 30)
    pub fn auto_margin_threshold(&self) -> RepositoryResult<f64> {
        self.get_f64_or_default(
            config_keys::AUTO_MARGIN_THRESHOLD,
            DEFAULT_AUTO_MARGIN_THRESHOLD,
        )
    }

    /// Ảnh chụp toàn bộ cấu hình scope 'global' (JSON)
    ///
    /// Dùng để lưu kèm hồ sơ khi cần tái lập điều kiện tính toán.
    pub fn get_config_snapshot(&self) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        let mut stmt = conn
            .prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        serde_json::to_string(&config_map)
            .map_err(|e| RepositoryError::InternalError(format!("không tạo được ảnh chụp cấu hình: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_unset() {
        let config = ConfigManager::in_memory().unwrap();
        assert_eq!(config.vat_rate().unwrap(), DEFAULT_VAT_RATE);
        assert_eq!(
            config.auto_margin_threshold().unwrap(),
            DEFAULT_AUTO_MARGIN_THRESHOLD
        );
    }

    #[test]
    fn test_set_and_read_back() {
        let config = ConfigManager::in_memory().unwrap();
        config
            .set_config_value(config_keys::AUTO_MARGIN_THRESHOLD, "25")
            .unwrap();
        assert_eq!(config.auto_margin_threshold().unwrap(), 25.0);

        // Ghi đè lần hai
        config
            .set_config_value(config_keys::AUTO_MARGIN_THRESHOLD, "40")
            .unwrap();
        assert_eq!(config.auto_margin_threshold().unwrap(), 40.0);
    }

    #[test]
    fn test_malformed_value_falls_back() {
        let config = ConfigManager::in_memory().unwrap();
        config
            .set_config_value(config_keys::VAT_RATE, "khong-phai-so")
            .unwrap();
        assert_eq!(config.vat_rate().unwrap(), DEFAULT_VAT_RATE);
    }

    #[test]
    fn test_snapshot_contains_keys() {
        let config = ConfigManager::in_memory().unwrap();
        config.set_config_value(config_keys::VAT_RATE, "0.08").unwrap();
        let snapshot = config.get_config_snapshot().unwrap();
        assert!(snapshot.contains("finance/vat_rate"));
        assert!(snapshot.contains("0.08"));
    }
}
