// ==========================================
// Hệ thống quản lý hợp đồng - Nhật ký xét duyệt
// ==========================================
// Căn cứ: QuyTrinh_PheDuyet_PAKD_v1.1.md - vết kiểm toán
// Nguyên tắc: mỗi lần chuyển trạng thái ghi đúng một bản ghi;
//             bản ghi bất biến, không sửa, không xóa
// ==========================================

use crate::domain::types::{ActorRole, PlanStatus, ReviewAction};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

// ==========================================
// ReviewLogEntry - Bản ghi xét duyệt
// ==========================================
// Chỉ WorkflowEngine được phép ghi; dùng cho hiển thị lịch sử,
// không bao giờ đọc ngược để ra quyết định
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewLogEntry {
    pub entry_id: String,              // ID bản ghi
    pub plan_id: String,               // PAKD liên quan
    pub contract_id: String,           // Hợp đồng liên quan
    pub reviewer_id: String,           // Người thao tác
    pub role: ActorRole,               // Vai trò được ghi nhận
    pub action: ReviewAction,          // Hành động
    pub from_status: PlanStatus,       // Trạng thái trước
    pub to_status: PlanStatus,         // Trạng thái sau
    pub comment: Option<String>,       // Ý kiến / lý do
    pub auto_approved: bool,           // Chuyển theo lối tắt tự động
    pub basis_json: Option<JsonValue>, // Cơ sở quyết định (JSON)
    pub created_at: NaiveDateTime,     // Thời điểm ghi
}

impl ReviewLogEntry {
    /// Tạo bản ghi xét duyệt mới
    pub fn new(
        plan_id: String,
        contract_id: String,
        reviewer_id: String,
        role: ActorRole,
        action: ReviewAction,
        from_status: PlanStatus,
        to_status: PlanStatus,
    ) -> Self {
        Self {
            entry_id: uuid::Uuid::new_v4().to_string(),
            plan_id,
            contract_id,
            reviewer_id,
            role,
            action,
            from_status,
            to_status,
            comment: None,
            auto_approved: false,
            basis_json: None,
            created_at: chrono::Local::now().naive_local(),
        }
    }

    /// Gắn ý kiến / lý do
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Gắn cơ sở quyết định (chuyển thành JSON)
    pub fn with_basis<T: Serialize>(mut self, basis: &T) -> Self {
        self.basis_json = serde_json::to_value(basis).ok();
        self
    }

    /// Đánh dấu bản ghi thuộc lối tắt phê duyệt tự động
    pub fn mark_auto_approved(mut self) -> Self {
        self.auto_approved = true;
        self
    }
}
