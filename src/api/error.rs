// ==========================================
// Hệ thống quản lý hợp đồng - Lỗi tầng API
// ==========================================
// Trách nhiệm: chuyển lỗi kỹ thuật của các tầng dưới thành thông điệp
//              nghiệp vụ cho người dùng; mọi lỗi phải nêu rõ nguyên nhân
// Công cụ: macro dẫn xuất thiserror
// ==========================================

use crate::engine::error::WorkflowError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// Lỗi tầng API
#[derive(Error, Debug)]
pub enum ApiError {
    // ===== Lỗi nghiệp vụ phê duyệt =====
    #[error("Chuyển trạng thái không hợp lệ: {0}")]
    InvalidTransition(String),

    #[error("PAKD đã kết thúc: {0}")]
    PlanClosed(String),

    #[error("Từ chối PAKD bắt buộc phải có lý do")]
    MissingRejectionReason,

    // ===== Lỗi dữ liệu đầu vào =====
    #[error("Dữ liệu không hợp lệ: {0}")]
    InvalidInput(String),

    #[error("Không tìm thấy: {0}")]
    NotFound(String),

    // ===== Lỗi truy cập dữ liệu =====
    #[error("Lỗi cơ sở dữ liệu: {0}")]
    DatabaseError(String),

    // ===== Lỗi chung =====
    #[error("Lỗi nội bộ: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// Chuyển đổi từ RepositoryError
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{} (id={}) không tồn tại", entity, id))
            }
            RepositoryError::DatabaseConnectionError(msg)
            | RepositoryError::DatabaseTransactionError(msg)
            | RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseError(format!("không lấy được khóa cơ sở dữ liệu: {}", msg))
            }
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::InvalidInput(format!("vi phạm ràng buộc duy nhất: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::InvalidInput(format!("vi phạm ràng buộc khóa ngoại: {}", msg))
            }
            RepositoryError::ValidationError(msg) => ApiError::InvalidInput(msg),
            RepositoryError::FieldValueError { field, message } => {
                ApiError::InvalidInput(format!("trường {} lỗi: {}", field, message))
            }
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// Chuyển đổi từ WorkflowError
// ==========================================
impl From<WorkflowError> for ApiError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::InvalidTransition { status, role } => ApiError::InvalidTransition(
                format!("vai trò {} không được thao tác ở trạng thái {}", role, status),
            ),
            WorkflowError::PlanClosed { status } => {
                ApiError::PlanClosed(format!("trạng thái hiện tại là {}", status))
            }
            WorkflowError::PlanNotFound(plan_id) => {
                ApiError::NotFound(format!("PAKD (id={}) không tồn tại", plan_id))
            }
            WorkflowError::MissingRejectionReason => ApiError::MissingRejectionReason,
            WorkflowError::LockError(msg) => ApiError::InternalError(format!(
                "không lấy được khóa theo PAKD: {}",
                msg
            )),
            WorkflowError::Store(repo_err) => repo_err.into(),
            WorkflowError::Other(err) => ApiError::Other(err),
        }
    }
}

/// Bí danh kiểu Result
pub type ApiResult<T> = Result<T, ApiError>;
