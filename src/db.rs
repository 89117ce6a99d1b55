// ==========================================
// Hệ thống quản lý hợp đồng - Khởi tạo kết nối SQLite
// ==========================================
// Mục tiêu:
// - Thống nhất PRAGMA cho mọi Connection::open, tránh tình trạng
//   "module này bật khóa ngoại, module kia không bật"
// - Thống nhất busy_timeout, giảm lỗi busy khi ghi đồng thời
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// busy_timeout mặc định (mili giây)
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// schema_version hiện tại mà mã nguồn kỳ vọng
///
/// Chỉ dùng để cảnh báo khi chạy trên CSDL cũ, không tự động di trú.
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// Áp PRAGMA thống nhất cho kết nối SQLite
///
/// Ghi chú:
/// - foreign_keys phải bật riêng cho TỪNG kết nối
/// - busy_timeout phải cấu hình riêng cho TỪNG kết nối
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// Mở kết nối SQLite và áp cấu hình thống nhất
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// Đọc schema_version (trả None nếu bảng chưa tồn tại)
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// Khởi tạo schema (idempotent, CREATE TABLE IF NOT EXISTS)
///
/// Gồm các bảng: hợp đồng, hạng mục, chi phí triển khai, PAKD,
/// nhật ký xét duyệt và cấu hình key-value.
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS config_scope (
            scope_id TEXT PRIMARY KEY,
            scope_type TEXT NOT NULL,
            scope_key TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(scope_type, scope_key)
        );

        INSERT OR IGNORE INTO config_scope (scope_id, scope_type, scope_key)
        VALUES ('global', 'GLOBAL', 'global');

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL REFERENCES config_scope(scope_id) ON DELETE CASCADE,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );

        CREATE TABLE IF NOT EXISTS contract (
            contract_id TEXT PRIMARY KEY,
            contract_no TEXT NOT NULL,
            customer_name TEXT,
            supplier_discount_percent REAL NOT NULL DEFAULT 0,
            created_by TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS contract_line_item (
            item_id TEXT PRIMARY KEY,
            contract_id TEXT NOT NULL REFERENCES contract(contract_id),
            name TEXT NOT NULL,
            unit TEXT,
            quantity REAL NOT NULL DEFAULT 0,
            unit_input_price REAL NOT NULL DEFAULT 0,
            unit_output_price REAL NOT NULL DEFAULT 0,
            direct_cost_total REAL NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS execution_cost (
            cost_id TEXT PRIMARY KEY,
            contract_id TEXT NOT NULL REFERENCES contract(contract_id),
            name TEXT NOT NULL,
            amount REAL NOT NULL DEFAULT 0,
            percent_of_input REAL NOT NULL DEFAULT 0,
            requires_expert INTEGER
        );

        CREATE TABLE IF NOT EXISTS business_plan (
            plan_id TEXT PRIMARY KEY,
            contract_id TEXT NOT NULL REFERENCES contract(contract_id),
            plan_name TEXT NOT NULL,
            status TEXT NOT NULL,
            totals_snapshot_json TEXT,
            created_by TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            submitted_at TEXT,
            approved_by TEXT,
            approved_at TEXT
        );

        CREATE TABLE IF NOT EXISTS review_log (
            entry_id TEXT PRIMARY KEY,
            plan_id TEXT NOT NULL REFERENCES business_plan(plan_id),
            contract_id TEXT NOT NULL,
            reviewer_id TEXT NOT NULL,
            role TEXT NOT NULL,
            action TEXT NOT NULL,
            from_status TEXT NOT NULL,
            to_status TEXT NOT NULL,
            comment TEXT,
            auto_approved INTEGER NOT NULL DEFAULT 0,
            basis_json TEXT,
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_line_item_contract
            ON contract_line_item(contract_id);
        CREATE INDEX IF NOT EXISTS idx_execution_cost_contract
            ON execution_cost(contract_id);
        CREATE INDEX IF NOT EXISTS idx_plan_contract
            ON business_plan(contract_id);
        CREATE INDEX IF NOT EXISTS idx_review_log_plan
            ON review_log(plan_id, created_at);
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;

    Ok(())
}
