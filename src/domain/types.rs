// ==========================================
// Hệ thống quản lý hợp đồng - Định nghĩa kiểu lĩnh vực
// ==========================================
// Căn cứ: QuyTrinh_PheDuyet_PAKD_v1.1.md - trạng thái & vai trò
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// Trạng thái PAKD (Plan Status)
// ==========================================
// Nguyên tắc: tập trạng thái hữu hạn, tiến một chiều
// Định dạng tuần tự hóa: SCREAMING_SNAKE_CASE (thống nhất với CSDL)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanStatus {
    Draft,          // Bản nháp
    PendingUnit,    // Chờ trưởng đơn vị duyệt
    PendingFinance, // Chờ kế toán duyệt
    PendingBoard,   // Chờ ban giám đốc duyệt
    Approved,       // Đã phê duyệt
    Rejected,       // Đã từ chối
}

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl PlanStatus {
    /// Phân tích trạng thái từ chuỗi (lưu trong CSDL)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "DRAFT" => Some(PlanStatus::Draft),
            "PENDING_UNIT" => Some(PlanStatus::PendingUnit),
            "PENDING_FINANCE" => Some(PlanStatus::PendingFinance),
            "PENDING_BOARD" => Some(PlanStatus::PendingBoard),
            "APPROVED" => Some(PlanStatus::Approved),
            "REJECTED" => Some(PlanStatus::Rejected),
            _ => None,
        }
    }

    /// Chuyển thành chuỗi lưu CSDL
    pub fn to_db_str(&self) -> &'static str {
        match self {
            PlanStatus::Draft => "DRAFT",
            PlanStatus::PendingUnit => "PENDING_UNIT",
            PlanStatus::PendingFinance => "PENDING_FINANCE",
            PlanStatus::PendingBoard => "PENDING_BOARD",
            PlanStatus::Approved => "APPROVED",
            PlanStatus::Rejected => "REJECTED",
        }
    }

    /// Trạng thái kết thúc: không nhận thêm bất kỳ chuyển đổi nào
    pub fn is_terminal(&self) -> bool {
        matches!(self, PlanStatus::Approved | PlanStatus::Rejected)
    }

    /// Đang nằm trong một cấp duyệt
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            PlanStatus::PendingUnit | PlanStatus::PendingFinance | PlanStatus::PendingBoard
        )
    }
}

// ==========================================
// Vai trò tác nhân (Actor Role)
// ==========================================
// Quyền hạn do lớp gọi cung cấp, lõi không tự xác thực
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActorRole {
    Sales,      // Nhân viên kinh doanh
    UnitLead,   // Trưởng đơn vị
    Accountant, // Kế toán
    Board,      // Ban giám đốc
    Admin,      // Quản trị hệ thống
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl ActorRole {
    /// Phân tích vai trò từ chuỗi
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "SALES" => Some(ActorRole::Sales),
            "UNIT_LEAD" => Some(ActorRole::UnitLead),
            "ACCOUNTANT" => Some(ActorRole::Accountant),
            "BOARD" => Some(ActorRole::Board),
            "ADMIN" => Some(ActorRole::Admin),
            _ => None,
        }
    }

    /// Chuyển thành chuỗi lưu CSDL
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ActorRole::Sales => "SALES",
            ActorRole::UnitLead => "UNIT_LEAD",
            ActorRole::Accountant => "ACCOUNTANT",
            ActorRole::Board => "BOARD",
            ActorRole::Admin => "ADMIN",
        }
    }

    /// Quyền vượt cấp của quản trị viên (cờ tường minh, không so khớp định danh)
    pub fn is_admin(&self) -> bool {
        matches!(self, ActorRole::Admin)
    }
}

// ==========================================
// Hành động xét duyệt (Review Action)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewAction {
    Submit,  // Trình duyệt
    Approve, // Phê duyệt
    Reject,  // Từ chối
}

impl fmt::Display for ReviewAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ReviewAction {
    /// Chuyển thành chuỗi (dùng cho lưu CSDL)
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewAction::Submit => "SUBMIT",
            ReviewAction::Approve => "APPROVE",
            ReviewAction::Reject => "REJECT",
        }
    }

    /// Phân tích từ chuỗi
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "SUBMIT" => Some(ReviewAction::Submit),
            "APPROVE" => Some(ReviewAction::Approve),
            "REJECT" => Some(ReviewAction::Reject),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_status_round_trip() {
        for status in [
            PlanStatus::Draft,
            PlanStatus::PendingUnit,
            PlanStatus::PendingFinance,
            PlanStatus::PendingBoard,
            PlanStatus::Approved,
            PlanStatus::Rejected,
        ] {
            assert_eq!(PlanStatus::from_str(status.to_db_str()), Some(status));
        }
        assert_eq!(PlanStatus::from_str("KHONG_TON_TAI"), None);
    }

    #[test]
    fn test_terminal_and_pending() {
        assert!(PlanStatus::Approved.is_terminal());
        assert!(PlanStatus::Rejected.is_terminal());
        assert!(!PlanStatus::Draft.is_terminal());
        assert!(PlanStatus::PendingFinance.is_pending());
        assert!(!PlanStatus::Draft.is_pending());
        assert!(!PlanStatus::Approved.is_pending());
    }

    #[test]
    fn test_role_parse() {
        assert_eq!(ActorRole::from_str("unit_lead"), Some(ActorRole::UnitLead));
        assert!(ActorRole::Admin.is_admin());
        assert!(!ActorRole::Accountant.is_admin());
    }
}
