// ==========================================
// Hệ thống quản lý hợp đồng - Mô hình PAKD
// ==========================================
// Căn cứ: QuyTrinh_PheDuyet_PAKD_v1.1.md - vòng đời PAKD
// Nguyên tắc: tổng hợp tài chính được chốt (đóng băng) tại thời điểm
//             trình duyệt; các cấp duyệt sau chỉ đọc bản chốt này
// ==========================================

use crate::domain::types::PlanStatus;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// FinancialTotals - Tổng hợp tài chính
// ==========================================
// Giá trị dẫn xuất thuần túy từ (hạng mục, chi phí triển khai, % chiết
// khấu); tính lại hai lần trên cùng đầu vào phải cho kết quả giống hệt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialTotals {
    pub signing_value: f64,             // Giá trị ký hợp đồng
    pub total_input: f64,               // Tổng chi phí đầu vào
    pub total_direct_costs: f64,        // Tổng chi phí trực tiếp
    pub execution_costs_sum: f64,       // Tổng chi phí triển khai
    pub supplier_discount_amount: f64,  // Tiền chiết khấu nhà cung cấp
    pub total_costs: f64,               // Tổng giá vốn
    pub gross_profit: f64,              // Lợi nhuận gộp
    pub profit_margin: f64,             // Biên lợi nhuận (%)
    pub estimated_revenue: f64,         // Doanh thu ước tính (trước VAT)
    pub expert_hiring_amount: f64,      // Tiền thuê chuyên gia bên ngoài
}

impl FinancialTotals {
    /// Bản tổng hợp rỗng (mọi giá trị bằng 0)
    pub fn zero() -> Self {
        Self {
            signing_value: 0.0,
            total_input: 0.0,
            total_direct_costs: 0.0,
            execution_costs_sum: 0.0,
            supplier_discount_amount: 0.0,
            total_costs: 0.0,
            gross_profit: 0.0,
            profit_margin: 0.0,
            estimated_revenue: 0.0,
            expert_hiring_amount: 0.0,
        }
    }

    /// Có khoản thuê chuyên gia bên ngoài với số tiền > 0 hay không.
    /// Được chốt cùng bản tổng hợp nên quyết định bỏ qua cấp ban giám
    /// đốc không bị ảnh hưởng bởi các lần sửa chi phí về sau.
    pub fn has_expert_hiring(&self) -> bool {
        self.expert_hiring_amount > 0.0
    }
}

// ==========================================
// BusinessPlan - Phương án kinh doanh (PAKD)
// ==========================================
// Thuộc về đúng một hợp đồng; tạo ở trạng thái Draft khi hợp đồng
// được trình duyệt lần đầu
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessPlan {
    pub plan_id: String,                          // ID PAKD
    pub contract_id: String,                      // Hợp đồng gắn kèm
    pub plan_name: String,                        // Tên PAKD
    pub status: PlanStatus,                       // Trạng thái hiện tại
    pub totals_snapshot: Option<FinancialTotals>, // Bản chốt tổng hợp tài chính
    pub created_by: String,                       // Người tạo
    pub created_at: NaiveDateTime,                // Thời điểm tạo
    pub updated_at: NaiveDateTime,                // Thời điểm cập nhật
    pub submitted_at: Option<NaiveDateTime>,      // Thời điểm trình duyệt
    pub approved_by: Option<String>,              // Người phê duyệt cuối
    pub approved_at: Option<NaiveDateTime>,       // Thời điểm phê duyệt
}

impl BusinessPlan {
    /// Tạo PAKD mới ở trạng thái Draft
    pub fn new(
        plan_id: String,
        contract_id: String,
        plan_name: String,
        created_by: String,
    ) -> Self {
        let now = chrono::Local::now().naive_local();
        Self {
            plan_id,
            contract_id,
            plan_name,
            status: PlanStatus::Draft,
            totals_snapshot: None,
            created_by,
            created_at: now,
            updated_at: now,
            submitted_at: None,
            approved_by: None,
            approved_at: None,
        }
    }

    /// PAKD đã kết thúc (Approved/Rejected), không nhận chuyển đổi nữa
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Chỉ bản nháp mới được sửa nội dung
    pub fn is_editable(&self) -> bool {
        self.status == PlanStatus::Draft
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_plan_is_draft() {
        let plan = BusinessPlan::new(
            "P001".to_string(),
            "HD001".to_string(),
            "PAKD thi công nhà xưởng".to_string(),
            "user01".to_string(),
        );
        assert_eq!(plan.status, PlanStatus::Draft);
        assert!(plan.totals_snapshot.is_none());
        assert!(plan.is_editable());
        assert!(!plan.is_terminal());
    }

    #[test]
    fn test_expert_hiring_flag() {
        let mut totals = FinancialTotals::zero();
        assert!(!totals.has_expert_hiring());
        totals.expert_hiring_amount = 2_000_000.0;
        assert!(totals.has_expert_hiring());
    }
}
