// ==========================================
// Hệ thống quản lý hợp đồng - Engine luồng phê duyệt
// ==========================================
// Căn cứ: QuyTrinh_PheDuyet_PAKD_v1.1.md - trình tự chuyển trạng thái
// Nguyên tắc:
// - Mỗi PAKD chỉ có MỘT chuyển đổi đang xử lý tại một thời điểm
//   (khóa trong bộ nhớ theo plan_id quanh trình tự đọc-quyết-ghi)
// - Mỗi chuyển đổi thành công ghi đúng một bản ghi nhật ký
// - Ghi nhật ký thất bại sau khi trạng thái đã lưu: cảnh báo,
//   không rollback
// ==========================================

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::NaiveDateTime;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::config::ConfigManager;
use crate::domain::plan::{BusinessPlan, FinancialTotals};
use crate::domain::review_log::ReviewLogEntry;
use crate::domain::types::{ActorRole, PlanStatus, ReviewAction};
use crate::engine::approval::ApprovalPolicy;
use crate::engine::error::{TransitionWarning, WorkflowError, WorkflowResult};
use crate::engine::financial::FinancialEngine;
use crate::repository::contract_store::ContractStore;
use crate::repository::error::RepositoryError;
use crate::repository::plan_store::PlanStore;
use crate::repository::review_log_store::ReviewLogStore;

// ==========================================
// TransitionRequest - Yêu cầu chuyển trạng thái
// ==========================================
#[derive(Debug, Clone)]
pub struct TransitionRequest {
    pub plan_id: String,         // PAKD cần thao tác
    pub actor_id: String,        // Định danh người thao tác
    pub actor_role: ActorRole,   // Vai trò do lớp gọi cung cấp
    pub action: ReviewAction,    // Trình / duyệt / từ chối
    pub comment: Option<String>, // Ý kiến; bắt buộc khi từ chối
}

// ==========================================
// TransitionOutcome - Kết quả chuyển trạng thái
// ==========================================
#[derive(Debug)]
pub struct TransitionOutcome {
    pub plan: BusinessPlan,                    // PAKD sau khi cập nhật
    pub auto_approved: bool,                   // Đi theo lối tắt tự động
    pub log_warning: Option<TransitionWarning>, // Cảnh báo ghi nhật ký (nếu có)
}

// ==========================================
// PlanLockRegistry - Sổ khóa theo PAKD
// ==========================================
// Bảo đảm kỷ luật một-người-ghi trên từng plan_id
struct PlanLockRegistry {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl PlanLockRegistry {
    fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Lấy (hoặc tạo) khóa gắn với một plan_id
    fn handle(&self, plan_id: &str) -> WorkflowResult<Arc<Mutex<()>>> {
        let mut map = self
            .locks
            .lock()
            .map_err(|e| WorkflowError::LockError(e.to_string()))?;
        Ok(map
            .entry(plan_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone())
    }
}

// ==========================================
// WorkflowEngine - Engine luồng phê duyệt
// ==========================================
pub struct WorkflowEngine {
    contract_store: Arc<dyn ContractStore>,
    plan_store: Arc<dyn PlanStore>,
    review_log_store: Arc<dyn ReviewLogStore>,
    config_manager: Arc<ConfigManager>,
    financial_engine: FinancialEngine,
    locks: PlanLockRegistry,
}

impl WorkflowEngine {
    /// Tạo engine luồng phê duyệt mới
    pub fn new(
        contract_store: Arc<dyn ContractStore>,
        plan_store: Arc<dyn PlanStore>,
        review_log_store: Arc<dyn ReviewLogStore>,
        config_manager: Arc<ConfigManager>,
    ) -> Self {
        Self {
            contract_store,
            plan_store,
            review_log_store,
            config_manager,
            financial_engine: FinancialEngine::new(),
            locks: PlanLockRegistry::new(),
        }
    }

    /// Thực hiện một chuyển đổi trạng thái trên PAKD
    ///
    /// Trình tự: khóa theo PAKD → đọc PAKD → kiểm tra kết thúc →
    /// quyết định theo chính sách → lưu trạng thái → ghi nhật ký.
    /// Mọi lỗi trước bước lưu đều giữ nguyên trạng thái PAKD.
    #[instrument(skip(self, request), fields(plan_id = %request.plan_id, action = %request.action))]
    pub fn transition(&self, request: TransitionRequest) -> WorkflowResult<TransitionOutcome> {
        let lock = self.locks.handle(&request.plan_id)?;
        let _guard = lock
            .lock()
            .map_err(|e| WorkflowError::LockError(e.to_string()))?;

        let mut plan = self
            .plan_store
            .get(&request.plan_id)?
            .ok_or_else(|| WorkflowError::PlanNotFound(request.plan_id.clone()))?;

        if plan.status.is_terminal() {
            return Err(WorkflowError::PlanClosed {
                status: plan.status,
            });
        }

        let is_admin_override = request.actor_role.is_admin();
        let from_status = plan.status;
        let now = chrono::Local::now().naive_local();
        let policy = self.policy()?;

        let mut auto_approved = false;
        let mut basis: Option<serde_json::Value> = None;

        match request.action {
            ReviewAction::Submit => {
                if plan.status != PlanStatus::Draft {
                    return Err(WorkflowError::InvalidTransition {
                        status: plan.status,
                        role: request.actor_role,
                    });
                }

                // Trình duyệt luôn tính mới và chốt bản tổng hợp cho
                // chu kỳ xét duyệt này
                let totals = self.compute_contract_totals(&plan.contract_id)?;
                let decision = policy.next_status(
                    plan.status,
                    request.actor_role,
                    &totals,
                    is_admin_override,
                )?;

                plan.totals_snapshot = Some(totals);
                plan.submitted_at = Some(now);
                plan.status = decision.next_status;
            }
            ReviewAction::Approve => {
                if !plan.status.is_pending() {
                    return Err(WorkflowError::InvalidTransition {
                        status: plan.status,
                        role: request.actor_role,
                    });
                }

                // Dùng bản chốt đã đóng băng; chỉ tính lại khi PAKD cũ
                // chưa từng có bản chốt (và chốt luôn kết quả đó)
                let totals = match plan.totals_snapshot.clone() {
                    Some(totals) => totals,
                    None => {
                        let totals = self.compute_contract_totals(&plan.contract_id)?;
                        plan.totals_snapshot = Some(totals.clone());
                        totals
                    }
                };

                let decision = policy.next_status(
                    plan.status,
                    request.actor_role,
                    &totals,
                    is_admin_override,
                )?;
                auto_approved = decision.auto_approved;
                basis = Some(decision_basis(&totals, &policy, auto_approved));
                plan.status = decision.next_status;
            }
            ReviewAction::Reject => {
                let has_reason = request
                    .comment
                    .as_deref()
                    .map(str::trim)
                    .is_some_and(|c| !c.is_empty());
                if !has_reason {
                    return Err(WorkflowError::MissingRejectionReason);
                }

                policy.authorize_reject(plan.status, request.actor_role, is_admin_override)?;
                plan.status = PlanStatus::Rejected;
            }
        }

        if plan.status == PlanStatus::Approved {
            plan.approved_by = Some(request.actor_id.clone());
            plan.approved_at = Some(now);
        }
        plan.updated_at = now;

        self.plan_store.save(&plan)?;

        let entry = build_log_entry(&plan, &request, from_status, auto_approved, basis, now);
        let log_warning = match self.review_log_store.append(&entry) {
            Ok(_) => None,
            Err(e) => {
                warn!(
                    plan_id = %plan.plan_id,
                    error = %e,
                    "ghi nhật ký xét duyệt thất bại, trạng thái PAKD đã được lưu"
                );
                Some(TransitionWarning::LogAppendFailed(e.to_string()))
            }
        };

        info!(
            plan_id = %plan.plan_id,
            from = %from_status,
            to = %plan.status,
            auto = auto_approved,
            "chuyển trạng thái PAKD"
        );

        Ok(TransitionOutcome {
            plan,
            auto_approved,
            log_warning,
        })
    }

    /// Tính bản tổng hợp tài chính hiện hành của một hợp đồng
    pub fn compute_contract_totals(&self, contract_id: &str) -> WorkflowResult<FinancialTotals> {
        let contract = self
            .contract_store
            .get_contract(contract_id)?
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "Contract".to_string(),
                id: contract_id.to_string(),
            })?;
        let line_items = self.contract_store.get_line_items(contract_id)?;
        let execution_costs = self.contract_store.get_execution_costs(contract_id)?;
        let vat_rate = self.config_manager.vat_rate()?;

        Ok(self.financial_engine.compute_totals(
            &line_items,
            &execution_costs,
            contract.supplier_discount_percent,
            vat_rate,
        ))
    }

    /// Dựng chính sách phê duyệt theo cấu hình hiện hành
    fn policy(&self) -> WorkflowResult<ApprovalPolicy> {
        let threshold = self.config_manager.auto_margin_threshold()?;
        Ok(ApprovalPolicy::with_margin_threshold(threshold))
    }
}

/// Cơ sở quyết định lưu kèm bản ghi nhật ký
fn decision_basis(
    totals: &FinancialTotals,
    policy: &ApprovalPolicy,
    auto_approved: bool,
) -> serde_json::Value {
    json!({
        "profit_margin": totals.profit_margin,
        "margin_threshold": policy.auto_margin_threshold(),
        "expert_hiring_amount": totals.expert_hiring_amount,
        "auto_approved": auto_approved,
    })
}

/// Dựng bản ghi nhật ký cho một chuyển đổi
///
/// Lối tắt tự động được ghi nhận dưới vai trò kế toán đã kích hoạt nó,
/// kèm chú thích do hệ thống tạo.
fn build_log_entry(
    plan: &BusinessPlan,
    request: &TransitionRequest,
    from_status: PlanStatus,
    auto_approved: bool,
    basis: Option<serde_json::Value>,
    now: NaiveDateTime,
) -> ReviewLogEntry {
    let recorded_role = if auto_approved {
        ActorRole::Accountant
    } else {
        request.actor_role
    };

    let comment = if auto_approved {
        let note = crate::i18n::t("workflow.auto_approved");
        match request.comment.as_deref().map(str::trim) {
            Some(c) if !c.is_empty() => Some(format!("[{}] {}", note, c)),
            _ => Some(format!("[{}]", note)),
        }
    } else {
        request.comment.clone()
    };

    let mut entry = ReviewLogEntry::new(
        plan.plan_id.clone(),
        plan.contract_id.clone(),
        request.actor_id.clone(),
        recorded_role,
        request.action,
        from_status,
        plan.status,
    );
    if let Some(c) = comment {
        entry = entry.with_comment(c);
    }
    if let Some(b) = &basis {
        entry = entry.with_basis(b);
    }
    if auto_approved {
        entry = entry.mark_auto_approved();
    }
    entry.created_at = now;
    entry
}
