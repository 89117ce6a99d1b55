// ==========================================
// Hệ thống quản lý hợp đồng - Kho PAKD
// ==========================================
// Nguyên tắc: Repository không làm logic nghiệp vụ, chỉ ánh xạ dữ liệu
// Bản chốt tổng hợp tài chính lưu dạng JSON trên dòng PAKD
// ==========================================

use crate::domain::plan::{BusinessPlan, FinancialTotals};
use crate::domain::types::PlanStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{column_datetime, column_optional_datetime, format_datetime};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// PlanStore - Giao diện kho PAKD
// ==========================================
pub trait PlanStore: Send + Sync {
    /// Đọc PAKD theo id
    fn get(&self, plan_id: &str) -> RepositoryResult<Option<BusinessPlan>>;

    /// Thêm PAKD mới
    fn create(&self, plan: &BusinessPlan) -> RepositoryResult<String>;

    /// Lưu lại PAKD (trạng thái, bản chốt, thông tin phê duyệt)
    fn save(&self, plan: &BusinessPlan) -> RepositoryResult<()>;

    /// Liệt kê PAKD của một hợp đồng, mới nhất trước
    fn list_by_contract(&self, contract_id: &str) -> RepositoryResult<Vec<BusinessPlan>>;
}

// ==========================================
// SqlitePlanStore - Kho PAKD trên SQLite
// ==========================================
pub struct SqlitePlanStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqlitePlanStore {
    /// Tạo kho PAKD mới
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn snapshot_to_json(plan: &BusinessPlan) -> RepositoryResult<Option<String>> {
        match &plan.totals_snapshot {
            Some(totals) => serde_json::to_string(totals)
                .map(Some)
                .map_err(|e| RepositoryError::InternalError(format!(
                    "không tuần tự hóa được bản chốt tổng hợp: {}",
                    e
                ))),
            None => Ok(None),
        }
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<(BusinessPlan, Option<String>, String)> {
        let status_raw: String = row.get(3)?;
        let snapshot_raw: Option<String> = row.get(4)?;

        let plan = BusinessPlan {
            plan_id: row.get(0)?,
            contract_id: row.get(1)?,
            plan_name: row.get(2)?,
            // Trạng thái gán tạm, phân tích ở ngoài để trả lỗi có ngữ cảnh
            status: PlanStatus::Draft,
            totals_snapshot: None,
            created_by: row.get(5)?,
            created_at: column_datetime(row, 6)?,
            updated_at: column_datetime(row, 7)?,
            submitted_at: column_optional_datetime(row, 8)?,
            approved_by: row.get(9)?,
            approved_at: column_optional_datetime(row, 10)?,
        };

        Ok((plan, snapshot_raw, status_raw))
    }

    fn finish_row(
        (mut plan, snapshot_raw, status_raw): (BusinessPlan, Option<String>, String),
    ) -> RepositoryResult<BusinessPlan> {
        plan.status =
            PlanStatus::from_str(&status_raw).ok_or_else(|| RepositoryError::FieldValueError {
                field: "business_plan.status".to_string(),
                message: format!("trạng thái không hợp lệ: {}", status_raw),
            })?;

        plan.totals_snapshot = match snapshot_raw {
            Some(raw) => Some(serde_json::from_str::<FinancialTotals>(&raw).map_err(|e| {
                RepositoryError::FieldValueError {
                    field: "business_plan.totals_snapshot_json".to_string(),
                    message: format!("JSON bản chốt hỏng: {}", e),
                }
            })?),
            None => None,
        };

        Ok(plan)
    }
}

const PLAN_COLUMNS: &str = r#"plan_id, contract_id, plan_name, status, totals_snapshot_json,
           created_by, created_at, updated_at, submitted_at, approved_by, approved_at"#;

impl PlanStore for SqlitePlanStore {
    fn get(&self, plan_id: &str) -> RepositoryResult<Option<BusinessPlan>> {
        let conn = self.get_conn()?;

        let row = match conn.query_row(
            &format!(
                "SELECT {} FROM business_plan WHERE plan_id = ?",
                PLAN_COLUMNS
            ),
            params![plan_id],
            Self::map_row,
        ) {
            Ok(v) => v,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        Self::finish_row(row).map(Some)
    }

    fn create(&self, plan: &BusinessPlan) -> RepositoryResult<String> {
        let snapshot_json = Self::snapshot_to_json(plan)?;
        let conn = self.get_conn()?;

        conn.execute(
            r#"INSERT INTO business_plan (
                plan_id, contract_id, plan_name, status, totals_snapshot_json,
                created_by, created_at, updated_at, submitted_at, approved_by, approved_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
            params![
                plan.plan_id,
                plan.contract_id,
                plan.plan_name,
                plan.status.to_db_str(),
                snapshot_json,
                plan.created_by,
                format_datetime(&plan.created_at),
                format_datetime(&plan.updated_at),
                plan.submitted_at.as_ref().map(format_datetime),
                plan.approved_by,
                plan.approved_at.as_ref().map(format_datetime),
            ],
        )?;

        Ok(plan.plan_id.clone())
    }

    fn save(&self, plan: &BusinessPlan) -> RepositoryResult<()> {
        let snapshot_json = Self::snapshot_to_json(plan)?;
        let conn = self.get_conn()?;

        let rows = conn.execute(
            r#"UPDATE business_plan
               SET status = ?, totals_snapshot_json = ?, updated_at = ?,
                   submitted_at = ?, approved_by = ?, approved_at = ?
               WHERE plan_id = ?"#,
            params![
                plan.status.to_db_str(),
                snapshot_json,
                format_datetime(&plan.updated_at),
                plan.submitted_at.as_ref().map(format_datetime),
                plan.approved_by,
                plan.approved_at.as_ref().map(format_datetime),
                plan.plan_id,
            ],
        )?;

        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "BusinessPlan".to_string(),
                id: plan.plan_id.clone(),
            });
        }

        Ok(())
    }

    fn list_by_contract(&self, contract_id: &str) -> RepositoryResult<Vec<BusinessPlan>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM business_plan WHERE contract_id = ? ORDER BY created_at DESC",
            PLAN_COLUMNS
        ))?;

        let rows = stmt
            .query_map(params![contract_id], |row| Self::map_row(row))?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(Self::finish_row).collect()
    }
}
