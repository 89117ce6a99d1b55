// ==========================================
// Hệ thống quản lý hợp đồng - Tầng kho dữ liệu
// ==========================================
// Trách nhiệm: cung cấp giao diện truy cập dữ liệu, che giấu chi tiết CSDL
// Nguyên tắc: Repository không chứa logic nghiệp vụ
// Ràng buộc: mọi truy vấn dùng tham số hóa, chống SQL injection
// ==========================================

pub mod contract_store;
pub mod error;
pub mod plan_store;
pub mod review_log_store;

// Tái xuất các kho chính
pub use contract_store::{ContractStore, SqliteContractStore};
pub use error::{RepositoryError, RepositoryResult};
pub use plan_store::{PlanStore, SqlitePlanStore};
pub use review_log_store::{ReviewLogStore, SqliteReviewLogStore};

use chrono::NaiveDateTime;
use rusqlite::Row;

/// Định dạng thời gian thống nhất trong CSDL
pub(crate) const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Định dạng NaiveDateTime thành chuỗi lưu CSDL
pub(crate) fn format_datetime(ts: &NaiveDateTime) -> String {
    ts.format(DATETIME_FORMAT).to_string()
}

/// Đọc cột thời gian bắt buộc từ một dòng kết quả
pub(crate) fn column_datetime(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDateTime> {
    let raw: String = row.get(idx)?;
    NaiveDateTime::parse_from_str(&raw, DATETIME_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Đọc cột thời gian tùy chọn từ một dòng kết quả
pub(crate) fn column_optional_datetime(
    row: &Row<'_>,
    idx: usize,
) -> rusqlite::Result<Option<NaiveDateTime>> {
    let raw: Option<String> = row.get(idx)?;
    match raw {
        Some(s) => NaiveDateTime::parse_from_str(&s, DATETIME_FORMAT)
            .map(Some)
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    idx,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            }),
        None => Ok(None),
    }
}
