// ==========================================
// Hệ thống quản lý hợp đồng - Engine tính toán tài chính
// ==========================================
// Căn cứ: QuyTrinh_PheDuyet_PAKD_v1.1.md - công thức tổng hợp
// Nguyên tắc: hàm thuần túy, không I/O, không trạng thái chia sẻ;
//             tính lại trên cùng đầu vào phải cho kết quả giống hệt
//             (ApprovalPolicy rẽ nhánh theo profit_margin)
// ==========================================
// Đầu vào: hạng mục hợp đồng + chi phí triển khai + % chiết khấu
// Đầu ra: FinancialTotals
// ==========================================

use crate::domain::contract::{ExecutionCost, LineItem};
use crate::domain::plan::FinancialTotals;
use tracing::instrument;

/// Thuế suất VAT mặc định (10%), có thể cấu hình qua config_kv
pub const DEFAULT_VAT_RATE: f64 = 0.10;

/// Ép giá trị số về miền hợp lệ.
///
/// Đầu vào hỏng (NaN, vô cực, số âm) quy về 0 thay vì báo lỗi,
/// để hàm tính tổng luôn toàn phần và không có điều kiện lỗi.
fn sanitize(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

// ==========================================
// FinancialEngine - Engine tổng hợp tài chính
// ==========================================
#[derive(Debug, Default)]
pub struct FinancialEngine;

impl FinancialEngine {
    /// Tạo engine mới (không trạng thái, gọi đồng thời an toàn)
    pub fn new() -> Self {
        Self
    }

    /// Tính bản tổng hợp tài chính của một hợp đồng
    ///
    /// Công thức:
    /// - signing_value  = Σ(số lượng × đơn giá đầu ra)
    /// - total_input    = Σ(số lượng × đơn giá đầu vào)
    /// - total_costs    = đầu vào + trực tiếp + triển khai − chiết khấu
    /// - profit_margin  = lợi nhuận gộp / giá trị ký × 100 (bằng 0 khi
    ///   giá trị ký bằng 0)
    /// - estimated_revenue = giá trị ký / (1 + VAT)
    ///
    /// Engine không tự đối soát cặp (số tiền, %) của chi phí triển khai,
    /// chỉ cộng trường `amount`; việc giữ đồng bộ là của màn hình sửa
    /// hợp đồng.
    #[instrument(skip_all, fields(items = line_items.len(), costs = execution_costs.len()))]
    pub fn compute_totals(
        &self,
        line_items: &[LineItem],
        execution_costs: &[ExecutionCost],
        supplier_discount_percent: f64,
        vat_rate: f64,
    ) -> FinancialTotals {
        let mut signing_value = 0.0;
        let mut total_input = 0.0;
        let mut total_direct_costs = 0.0;

        for item in line_items {
            let quantity = sanitize(item.quantity);
            signing_value += quantity * sanitize(item.unit_output_price);
            total_input += quantity * sanitize(item.unit_input_price);
            total_direct_costs += sanitize(item.direct_cost_total);
        }

        let mut execution_costs_sum = 0.0;
        let mut expert_hiring_amount = 0.0;
        for cost in execution_costs {
            let amount = sanitize(cost.amount);
            execution_costs_sum += amount;
            if cost.requires_expert {
                expert_hiring_amount += amount;
            }
        }

        let discount_percent = sanitize(supplier_discount_percent);
        let supplier_discount_amount = total_input * discount_percent / 100.0;

        let total_costs =
            total_input + total_direct_costs + execution_costs_sum - supplier_discount_amount;
        let gross_profit = signing_value - total_costs;

        // Giá trị ký bằng 0 thì biên lợi nhuận quy ước bằng 0
        let profit_margin = if signing_value > 0.0 {
            gross_profit / signing_value * 100.0
        } else {
            0.0
        };

        let estimated_revenue = signing_value / (1.0 + sanitize(vat_rate));

        FinancialTotals {
            signing_value,
            total_input,
            total_direct_costs,
            execution_costs_sum,
            supplier_discount_amount,
            total_costs,
            gross_profit,
            profit_margin,
            estimated_revenue,
            expert_hiring_amount,
        }
    }
}
