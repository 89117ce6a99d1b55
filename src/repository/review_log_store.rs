// ==========================================
// Hệ thống quản lý hợp đồng - Kho nhật ký xét duyệt
// ==========================================
// Nguyên tắc: chỉ thêm và đọc; không tồn tại thao tác sửa/xóa
// ==========================================

use crate::domain::review_log::ReviewLogEntry;
use crate::domain::types::{ActorRole, PlanStatus, ReviewAction};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{column_datetime, format_datetime};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// ReviewLogStore - Giao diện kho nhật ký
// ==========================================
pub trait ReviewLogStore: Send + Sync {
    /// Ghi thêm một bản ghi xét duyệt
    fn append(&self, entry: &ReviewLogEntry) -> RepositoryResult<String>;

    /// Liệt kê nhật ký của một PAKD, cũ nhất trước (đọc lại được nhiều lần)
    fn list_by_plan(&self, plan_id: &str) -> RepositoryResult<Vec<ReviewLogEntry>>;
}

// ==========================================
// SqliteReviewLogStore - Kho nhật ký trên SQLite
// ==========================================
pub struct SqliteReviewLogStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteReviewLogStore {
    /// Tạo kho nhật ký mới
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<RawEntryRow> {
        Ok(RawEntryRow {
            entry_id: row.get(0)?,
            plan_id: row.get(1)?,
            contract_id: row.get(2)?,
            reviewer_id: row.get(3)?,
            role: row.get(4)?,
            action: row.get(5)?,
            from_status: row.get(6)?,
            to_status: row.get(7)?,
            comment: row.get(8)?,
            auto_approved: row.get::<_, i64>(9)? != 0,
            basis_json: row.get(10)?,
            created_at: column_datetime(row, 11)?,
        })
    }
}

// Dòng thô trước khi phân tích enum, để trả lỗi trường có ngữ cảnh
struct RawEntryRow {
    entry_id: String,
    plan_id: String,
    contract_id: String,
    reviewer_id: String,
    role: String,
    action: String,
    from_status: String,
    to_status: String,
    comment: Option<String>,
    auto_approved: bool,
    basis_json: Option<String>,
    created_at: chrono::NaiveDateTime,
}

impl RawEntryRow {
    fn into_entry(self) -> RepositoryResult<ReviewLogEntry> {
        let parse_status = |field: &str, raw: &str| {
            PlanStatus::from_str(raw).ok_or_else(|| RepositoryError::FieldValueError {
                field: field.to_string(),
                message: format!("trạng thái không hợp lệ: {}", raw),
            })
        };

        let role =
            ActorRole::from_str(&self.role).ok_or_else(|| RepositoryError::FieldValueError {
                field: "review_log.role".to_string(),
                message: format!("vai trò không hợp lệ: {}", self.role),
            })?;

        let action = ReviewAction::from_str(&self.action).ok_or_else(|| {
            RepositoryError::FieldValueError {
                field: "review_log.action".to_string(),
                message: format!("hành động không hợp lệ: {}", self.action),
            }
        })?;

        let basis_json = match self.basis_json {
            Some(raw) => Some(serde_json::from_str(&raw).map_err(|e| {
                RepositoryError::FieldValueError {
                    field: "review_log.basis_json".to_string(),
                    message: format!("JSON cơ sở quyết định hỏng: {}", e),
                }
            })?),
            None => None,
        };

        Ok(ReviewLogEntry {
            entry_id: self.entry_id,
            plan_id: self.plan_id,
            contract_id: self.contract_id,
            reviewer_id: self.reviewer_id,
            role,
            action,
            from_status: parse_status("review_log.from_status", &self.from_status)?,
            to_status: parse_status("review_log.to_status", &self.to_status)?,
            comment: self.comment,
            auto_approved: self.auto_approved,
            basis_json,
            created_at: self.created_at,
        })
    }
}

impl ReviewLogStore for SqliteReviewLogStore {
    fn append(&self, entry: &ReviewLogEntry) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"INSERT INTO review_log (
                entry_id, plan_id, contract_id, reviewer_id, role, action,
                from_status, to_status, comment, auto_approved, basis_json, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
            params![
                entry.entry_id,
                entry.plan_id,
                entry.contract_id,
                entry.reviewer_id,
                entry.role.to_db_str(),
                entry.action.as_str(),
                entry.from_status.to_db_str(),
                entry.to_status.to_db_str(),
                entry.comment,
                entry.auto_approved as i64,
                entry.basis_json.as_ref().map(|v| v.to_string()),
                format_datetime(&entry.created_at),
            ],
        )?;

        Ok(entry.entry_id.clone())
    }

    fn list_by_plan(&self, plan_id: &str) -> RepositoryResult<Vec<ReviewLogEntry>> {
        let conn = self.get_conn()?;

        // rowid phá hòa khi nhiều bản ghi rơi vào cùng một giây,
        // giữ đúng thứ tự ghi thêm
        let mut stmt = conn.prepare(
            r#"SELECT entry_id, plan_id, contract_id, reviewer_id, role, action,
                      from_status, to_status, comment, auto_approved, basis_json, created_at
               FROM review_log
               WHERE plan_id = ?
               ORDER BY created_at ASC, rowid ASC"#,
        )?;

        let rows = stmt
            .query_map(params![plan_id], |row| Self::map_row(row))?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(RawEntryRow::into_entry).collect()
    }
}
