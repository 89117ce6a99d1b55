// ==========================================
// Hệ thống quản lý hợp đồng - Mô hình hợp đồng
// ==========================================
// Căn cứ: QuyTrinh_PheDuyet_PAKD_v1.1.md - cấu trúc hợp đồng
// Nguyên tắc: hạng mục và chi phí chỉ được sửa qua màn hình hợp đồng,
//             lõi tính toán không bao giờ ghi ngược vào hợp đồng
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Danh sách từ khóa nhận diện chi phí thuê chuyên gia bên ngoài.
///
/// Chỉ dùng để suy ra cờ `requires_expert` cho các dòng dữ liệu cũ
/// chưa có thuộc tính tường minh. Dữ liệu mới luôn lưu cờ trực tiếp.
pub const EXPERT_COST_KEYWORDS: [&str; 2] = ["chuyên gia", "expert"];

/// Nhận diện tên chi phí có phải thuê chuyên gia bên ngoài hay không
pub fn is_expert_hiring_name(name: &str) -> bool {
    let lowered = name.to_lowercase();
    EXPERT_COST_KEYWORDS
        .iter()
        .any(|keyword| lowered.contains(keyword))
}

// ==========================================
// Contract - Hợp đồng
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contract {
    pub contract_id: String,               // ID hợp đồng
    pub contract_no: String,               // Số hợp đồng
    pub customer_name: Option<String>,     // Tên khách hàng
    pub supplier_discount_percent: f64,    // % chiết khấu nhà cung cấp
    pub created_by: String,                // Người tạo
    pub created_at: NaiveDateTime,         // Thời điểm tạo
    pub updated_at: NaiveDateTime,         // Thời điểm cập nhật
}

// ==========================================
// LineItem - Hạng mục hợp đồng
// ==========================================
// Thuộc về đúng một hợp đồng
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub item_id: String,           // ID hạng mục
    pub contract_id: String,       // Hợp đồng sở hữu
    pub name: String,              // Tên hạng mục
    pub unit: Option<String>,      // Đơn vị tính
    pub quantity: f64,             // Số lượng
    pub unit_input_price: f64,     // Đơn giá đầu vào
    pub unit_output_price: f64,    // Đơn giá đầu ra (ký với khách)
    pub direct_cost_total: f64,    // Tổng chi phí trực tiếp của hạng mục
}

// ==========================================
// ExecutionCost - Chi phí triển khai
// ==========================================
// Số tiền và % trên tổng đầu vào luôn được giữ đồng bộ:
// đặt giá trị này sẽ tính lại giá trị kia
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionCost {
    pub cost_id: String,           // ID chi phí
    pub contract_id: String,       // Hợp đồng sở hữu
    pub name: String,              // Tên khoản chi phí
    pub amount: f64,               // Số tiền
    pub percent_of_input: f64,     // % trên tổng chi phí đầu vào
    pub requires_expert: bool,     // Cần thuê chuyên gia bên ngoài
}

impl ExecutionCost {
    /// Tạo khoản chi phí mới
    ///
    /// Cờ `requires_expert` được suy ra từ tên khoản chi phí; lớp gọi
    /// có thể ghi đè bằng cách gán trực tiếp sau khi tạo.
    pub fn new(
        cost_id: String,
        contract_id: String,
        name: String,
        amount: f64,
    ) -> Self {
        let requires_expert = is_expert_hiring_name(&name);
        Self {
            cost_id,
            contract_id,
            name,
            amount,
            percent_of_input: 0.0,
            requires_expert,
        }
    }

    /// Đặt số tiền, tính lại % trên tổng đầu vào
    pub fn set_amount(&mut self, amount: f64, total_input: f64) {
        self.amount = amount;
        self.percent_of_input = if total_input > 0.0 {
            amount / total_input * 100.0
        } else {
            0.0
        };
    }

    /// Đặt %, tính lại số tiền trên tổng đầu vào
    pub fn set_percent(&mut self, percent: f64, total_input: f64) {
        self.percent_of_input = percent;
        self.amount = total_input * percent / 100.0;
    }
}
