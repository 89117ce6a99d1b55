// ==========================================
// Hệ thống quản lý hợp đồng - Chính sách phê duyệt
// ==========================================
// Căn cứ: QuyTrinh_PheDuyet_PAKD_v1.1.md - máy trạng thái xét duyệt
// Nguyên tắc: toàn bộ phân quyền nằm trong MỘT bảng ủy quyền
//             (vai trò × trạng thái); quyền vượt cấp của quản trị viên
//             là cờ tường minh, không so khớp định danh
// ==========================================
// Hàm thuần túy: không I/O, gọi đồng thời an toàn giữa các PAKD
// ==========================================

use crate::domain::plan::FinancialTotals;
use crate::domain::types::{ActorRole, PlanStatus};
use crate::engine::error::{WorkflowError, WorkflowResult};
use serde::{Deserialize, Serialize};

/// Ngưỡng biên lợi nhuận mặc định cho lối tắt phê duyệt tự động (%)
pub const DEFAULT_AUTO_MARGIN_THRESHOLD: f64 = 30.0;

// ==========================================
// Bảng ủy quyền chuyển trạng thái
// ==========================================
// Mỗi dòng: trạng thái nguồn, các vai trò được thao tác, trạng thái kế
// tiếp bình thường. Lối tắt tự động chỉ xét tại cấp kế toán.
struct StageRule {
    from: PlanStatus,
    authorized: &'static [ActorRole],
    normal_next: PlanStatus,
    skip_eligible: bool,
}

const STAGE_RULES: &[StageRule] = &[
    StageRule {
        from: PlanStatus::Draft,
        authorized: &[ActorRole::Sales, ActorRole::UnitLead],
        normal_next: PlanStatus::PendingUnit,
        skip_eligible: false,
    },
    StageRule {
        from: PlanStatus::PendingUnit,
        authorized: &[ActorRole::UnitLead],
        normal_next: PlanStatus::PendingFinance,
        skip_eligible: false,
    },
    StageRule {
        from: PlanStatus::PendingFinance,
        authorized: &[ActorRole::Accountant],
        normal_next: PlanStatus::PendingBoard,
        skip_eligible: true,
    },
    StageRule {
        from: PlanStatus::PendingBoard,
        authorized: &[ActorRole::Board],
        normal_next: PlanStatus::Approved,
        skip_eligible: false,
    },
];

// ==========================================
// PolicyDecision - Kết quả quyết định
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolicyDecision {
    pub next_status: PlanStatus, // Trạng thái kế tiếp
    pub auto_approved: bool,     // Đi theo lối tắt tự động
}

// ==========================================
// ApprovalPolicy - Chính sách phê duyệt
// ==========================================
#[derive(Debug, Clone)]
pub struct ApprovalPolicy {
    auto_margin_threshold: f64,
}

impl Default for ApprovalPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl ApprovalPolicy {
    /// Tạo chính sách với ngưỡng tự động mặc định (30%)
    pub fn new() -> Self {
        Self {
            auto_margin_threshold: DEFAULT_AUTO_MARGIN_THRESHOLD,
        }
    }

    /// Tạo chính sách với ngưỡng tự động tùy chỉnh
    pub fn with_margin_threshold(threshold: f64) -> Self {
        Self {
            auto_margin_threshold: threshold,
        }
    }

    fn rule_for(status: PlanStatus) -> Option<&'static StageRule> {
        STAGE_RULES.iter().find(|rule| rule.from == status)
    }

    /// Quyết định trạng thái kế tiếp cho một lần trình/duyệt
    ///
    /// # Tham số
    /// - `current`: trạng thái hiện tại của PAKD
    /// - `actor_role`: vai trò người thao tác
    /// - `totals`: bản chốt tổng hợp tài chính (lối tắt tự động rẽ nhánh
    ///   theo `profit_margin` và khoản thuê chuyên gia trong bản chốt)
    /// - `is_admin_override`: quyền vượt cấp tường minh; chỉ cho phép
    ///   tiến đúng MỘT cấp, không nhảy cóc ngoài lối tắt tự động
    ///
    /// # Trả về
    /// - `Ok(PolicyDecision)`: trạng thái kế tiếp + cờ tự động
    /// - `Err(PlanClosed)`: PAKD đã kết thúc
    /// - `Err(InvalidTransition)`: vai trò không được thao tác
    pub fn next_status(
        &self,
        current: PlanStatus,
        actor_role: ActorRole,
        totals: &FinancialTotals,
        is_admin_override: bool,
    ) -> WorkflowResult<PolicyDecision> {
        if current.is_terminal() {
            return Err(WorkflowError::PlanClosed { status: current });
        }

        let rule = Self::rule_for(current).ok_or(WorkflowError::InvalidTransition {
            status: current,
            role: actor_role,
        })?;

        if !is_admin_override && !rule.authorized.contains(&actor_role) {
            return Err(WorkflowError::InvalidTransition {
                status: current,
                role: actor_role,
            });
        }

        // Lối tắt tự động: biên lợi nhuận đạt ngưỡng VÀ không có khoản
        // thuê chuyên gia bên ngoài với số tiền > 0. Giá trị ký bằng 0
        // không đủ điều kiện dù ngưỡng cấu hình thấp.
        if rule.skip_eligible
            && totals.signing_value > 0.0
            && totals.profit_margin >= self.auto_margin_threshold
            && !totals.has_expert_hiring()
        {
            return Ok(PolicyDecision {
                next_status: PlanStatus::Approved,
                auto_approved: true,
            });
        }

        Ok(PolicyDecision {
            next_status: rule.normal_next,
            auto_approved: false,
        })
    }

    /// Kiểm tra quyền từ chối ở trạng thái hiện tại
    ///
    /// Từ chối chỉ hợp lệ từ các trạng thái chờ duyệt, bởi chính vai trò
    /// được duyệt cấp đó (hoặc quyền vượt cấp). Từ chối là một chiều:
    /// PAKD bị từ chối không trình lại được, phải tạo bản nháp mới.
    pub fn authorize_reject(
        &self,
        current: PlanStatus,
        actor_role: ActorRole,
        is_admin_override: bool,
    ) -> WorkflowResult<()> {
        if current.is_terminal() {
            return Err(WorkflowError::PlanClosed { status: current });
        }

        if !current.is_pending() {
            return Err(WorkflowError::InvalidTransition {
                status: current,
                role: actor_role,
            });
        }

        let rule = Self::rule_for(current).ok_or(WorkflowError::InvalidTransition {
            status: current,
            role: actor_role,
        })?;

        if is_admin_override || rule.authorized.contains(&actor_role) {
            Ok(())
        } else {
            Err(WorkflowError::InvalidTransition {
                status: current,
                role: actor_role,
            })
        }
    }

    /// Ngưỡng biên lợi nhuận đang áp dụng (%)
    pub fn auto_margin_threshold(&self) -> f64 {
        self.auto_margin_threshold
    }
}
