// ==========================================
// Hệ thống quản lý hợp đồng - Kho hợp đồng
// ==========================================
// Nguyên tắc: Repository không làm logic nghiệp vụ, chỉ ánh xạ dữ liệu
// ==========================================

use crate::domain::contract::{is_expert_hiring_name, Contract, ExecutionCost, LineItem};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::{column_datetime, format_datetime};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// ContractStore - Giao diện đọc dữ liệu hợp đồng
// ==========================================
// Lõi phê duyệt chỉ cần đọc; việc sửa hạng mục/chi phí thuộc màn hình
// hợp đồng bên ngoài
pub trait ContractStore: Send + Sync {
    /// Đọc hợp đồng theo id
    fn get_contract(&self, contract_id: &str) -> RepositoryResult<Option<Contract>>;

    /// Đọc danh sách hạng mục của hợp đồng
    fn get_line_items(&self, contract_id: &str) -> RepositoryResult<Vec<LineItem>>;

    /// Đọc danh sách chi phí triển khai của hợp đồng
    fn get_execution_costs(&self, contract_id: &str) -> RepositoryResult<Vec<ExecutionCost>>;
}

// ==========================================
// SqliteContractStore - Kho hợp đồng trên SQLite
// ==========================================
pub struct SqliteContractStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteContractStore {
    /// Tạo kho hợp đồng mới
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // Ghi dữ liệu (phục vụ màn hình hợp đồng & test)
    // ==========================================

    /// Thêm hợp đồng mới
    pub fn create_contract(&self, contract: &Contract) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"INSERT INTO contract (
                contract_id, contract_no, customer_name,
                supplier_discount_percent, created_by, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)"#,
            params![
                contract.contract_id,
                contract.contract_no,
                contract.customer_name,
                contract.supplier_discount_percent,
                contract.created_by,
                format_datetime(&contract.created_at),
                format_datetime(&contract.updated_at),
            ],
        )?;

        Ok(contract.contract_id.clone())
    }

    /// Thêm hạng mục hợp đồng
    pub fn save_line_item(&self, item: &LineItem) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"INSERT INTO contract_line_item (
                item_id, contract_id, name, unit,
                quantity, unit_input_price, unit_output_price, direct_cost_total
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
            params![
                item.item_id,
                item.contract_id,
                item.name,
                item.unit,
                item.quantity,
                item.unit_input_price,
                item.unit_output_price,
                item.direct_cost_total,
            ],
        )?;

        Ok(item.item_id.clone())
    }

    /// Thêm khoản chi phí triển khai
    pub fn save_execution_cost(&self, cost: &ExecutionCost) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"INSERT INTO execution_cost (
                cost_id, contract_id, name, amount, percent_of_input, requires_expert
            ) VALUES (?, ?, ?, ?, ?, ?)"#,
            params![
                cost.cost_id,
                cost.contract_id,
                cost.name,
                cost.amount,
                cost.percent_of_input,
                cost.requires_expert as i64,
            ],
        )?;

        Ok(cost.cost_id.clone())
    }

    // ==========================================
    // Ánh xạ dòng dữ liệu
    // ==========================================

    fn map_contract_row(row: &Row<'_>) -> rusqlite::Result<Contract> {
        Ok(Contract {
            contract_id: row.get(0)?,
            contract_no: row.get(1)?,
            customer_name: row.get(2)?,
            supplier_discount_percent: row.get(3)?,
            created_by: row.get(4)?,
            created_at: column_datetime(row, 5)?,
            updated_at: column_datetime(row, 6)?,
        })
    }

    fn map_line_item_row(row: &Row<'_>) -> rusqlite::Result<LineItem> {
        Ok(LineItem {
            item_id: row.get(0)?,
            contract_id: row.get(1)?,
            name: row.get(2)?,
            unit: row.get(3)?,
            quantity: row.get(4)?,
            unit_input_price: row.get(5)?,
            unit_output_price: row.get(6)?,
            direct_cost_total: row.get(7)?,
        })
    }

    fn map_execution_cost_row(row: &Row<'_>) -> rusqlite::Result<ExecutionCost> {
        let name: String = row.get(2)?;
        // Dòng dữ liệu cũ chưa có cờ tường minh: suy ra từ tên khoản chi
        let requires_expert_raw: Option<i64> = row.get(5)?;
        let requires_expert = requires_expert_raw
            .map(|v| v != 0)
            .unwrap_or_else(|| is_expert_hiring_name(&name));

        Ok(ExecutionCost {
            cost_id: row.get(0)?,
            contract_id: row.get(1)?,
            name,
            amount: row.get(3)?,
            percent_of_input: row.get(4)?,
            requires_expert,
        })
    }
}

impl ContractStore for SqliteContractStore {
    fn get_contract(&self, contract_id: &str) -> RepositoryResult<Option<Contract>> {
        let conn = self.get_conn()?;

        match conn.query_row(
            r#"SELECT contract_id, contract_no, customer_name,
                      supplier_discount_percent, created_by, created_at, updated_at
               FROM contract
               WHERE contract_id = ?"#,
            params![contract_id],
            Self::map_contract_row,
        ) {
            Ok(contract) => Ok(Some(contract)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn get_line_items(&self, contract_id: &str) -> RepositoryResult<Vec<LineItem>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT item_id, contract_id, name, unit,
                      quantity, unit_input_price, unit_output_price, direct_cost_total
               FROM contract_line_item
               WHERE contract_id = ?
               ORDER BY item_id"#,
        )?;

        let items = stmt
            .query_map(params![contract_id], |row| Self::map_line_item_row(row))?
            .collect::<Result<Vec<LineItem>, _>>()?;

        Ok(items)
    }

    fn get_execution_costs(&self, contract_id: &str) -> RepositoryResult<Vec<ExecutionCost>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT cost_id, contract_id, name, amount, percent_of_input, requires_expert
               FROM execution_cost
               WHERE contract_id = ?
               ORDER BY cost_id"#,
        )?;

        let costs = stmt
            .query_map(params![contract_id], |row| {
                Self::map_execution_cost_row(row)
            })?
            .collect::<Result<Vec<ExecutionCost>, _>>()?;

        Ok(costs)
    }
}
