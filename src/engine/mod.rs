// ==========================================
// Hệ thống quản lý hợp đồng - Tầng engine
// ==========================================
// Căn cứ: QuyTrinh_PheDuyet_PAKD_v1.1.md - quy tắc nghiệp vụ
// ==========================================
// Trách nhiệm: hiện thực quy tắc nghiệp vụ, không ghép SQL
// Nguyên tắc: mọi quyết định phải kèm cơ sở có thể giải thích
// ==========================================

pub mod approval;
pub mod error;
pub mod financial;
pub mod workflow;

// Tái xuất các engine chính
pub use approval::{ApprovalPolicy, PolicyDecision, DEFAULT_AUTO_MARGIN_THRESHOLD};
pub use error::{TransitionWarning, WorkflowError, WorkflowResult};
pub use financial::{FinancialEngine, DEFAULT_VAT_RATE};
pub use workflow::{TransitionOutcome, TransitionRequest, WorkflowEngine};
