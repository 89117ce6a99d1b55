// ==========================================
// Hệ thống quản lý hợp đồng - Lỗi luồng phê duyệt
// ==========================================
// Căn cứ: QuyTrinh_PheDuyet_PAKD_v1.1.md - ngữ nghĩa thất bại
// Công cụ: macro dẫn xuất thiserror
// ==========================================

use crate::domain::types::{ActorRole, PlanStatus};
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// Lỗi luồng phê duyệt
///
/// Mọi lỗi trả về cho lớp gọi dưới dạng Result có kiểu; lõi không tự
/// thử lại. Một chuyển đổi thất bại không làm thay đổi trạng thái PAKD.
#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("Chuyển trạng thái không hợp lệ: vai trò {role} không được thao tác ở trạng thái {status}")]
    InvalidTransition { status: PlanStatus, role: ActorRole },

    #[error("PAKD đã kết thúc ở trạng thái {status}, không nhận thêm chuyển đổi")]
    PlanClosed { status: PlanStatus },

    #[error("Không tìm thấy PAKD: plan_id={0}")]
    PlanNotFound(String),

    #[error("Từ chối PAKD bắt buộc phải có lý do")]
    MissingRejectionReason,

    #[error("Không lấy được khóa theo PAKD: {0}")]
    LockError(String),

    #[error(transparent)]
    Store(#[from] RepositoryError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Bí danh kiểu Result
pub type WorkflowResult<T> = Result<T, WorkflowError>;

// ==========================================
// TransitionWarning - Cảnh báo không chặn
// ==========================================
// Ghi nhật ký thất bại SAU KHI trạng thái đã lưu thành công: trạng thái
// PAKD là chính, vết kiểm toán là nỗ lực tốt nhất, không rollback
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionWarning {
    #[error("Ghi nhật ký xét duyệt thất bại (trạng thái đã được lưu): {0}")]
    LogAppendFailed(String),
}
