// ==========================================
// Hệ thống quản lý hợp đồng - API PAKD
// ==========================================
// Trách nhiệm: quản lý PAKD, chuyển trạng thái, tra cứu tổng hợp
//              tài chính và lịch sử xét duyệt
// ==========================================

use std::sync::Arc;

use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::domain::plan::{BusinessPlan, FinancialTotals};
use crate::domain::review_log::ReviewLogEntry;
use crate::domain::types::{ActorRole, ReviewAction};
use crate::engine::workflow::{TransitionOutcome, TransitionRequest, WorkflowEngine};
use crate::repository::contract_store::ContractStore;
use crate::repository::plan_store::PlanStore;
use crate::repository::review_log_store::ReviewLogStore;

// ==========================================
// PlanApi - API PAKD
// ==========================================

/// API phương án kinh doanh
///
/// Trách nhiệm:
/// 1. Quản lý PAKD (tạo bản nháp, tra cứu)
/// 2. Chuyển trạng thái qua WorkflowEngine
/// 3. Tính tổng hợp tài chính theo yêu cầu hiển thị
/// 4. Tra cứu lịch sử xét duyệt
pub struct PlanApi {
    contract_store: Arc<dyn ContractStore>,
    plan_store: Arc<dyn PlanStore>,
    review_log_store: Arc<dyn ReviewLogStore>,
    workflow_engine: WorkflowEngine,
}

impl PlanApi {
    /// Tạo PlanApi mới
    pub fn new(
        contract_store: Arc<dyn ContractStore>,
        plan_store: Arc<dyn PlanStore>,
        review_log_store: Arc<dyn ReviewLogStore>,
        config_manager: Arc<ConfigManager>,
    ) -> Self {
        let workflow_engine = WorkflowEngine::new(
            contract_store.clone(),
            plan_store.clone(),
            review_log_store.clone(),
            config_manager,
        );

        Self {
            contract_store,
            plan_store,
            review_log_store,
            workflow_engine,
        }
    }

    // ==========================================
    // Quản lý PAKD
    // ==========================================

    /// Tạo PAKD mới ở trạng thái bản nháp
    ///
    /// # Tham số
    /// - contract_id: hợp đồng gắn kèm (phải tồn tại)
    /// - plan_name: tên PAKD
    /// - created_by: người tạo
    ///
    /// # Trả về
    /// - Ok(String): ID PAKD mới
    /// - Err(ApiError): lỗi kiểm tra đầu vào hoặc CSDL
    pub fn create_plan(
        &self,
        contract_id: &str,
        plan_name: String,
        created_by: String,
    ) -> ApiResult<String> {
        if plan_name.trim().is_empty() {
            return Err(ApiError::InvalidInput("tên PAKD không được rỗng".to_string()));
        }
        if created_by.trim().is_empty() {
            return Err(ApiError::InvalidInput("người tạo không được rỗng".to_string()));
        }

        let contract = self.contract_store.get_contract(contract_id)?;
        if contract.is_none() {
            return Err(ApiError::NotFound(format!(
                "hợp đồng (id={}) không tồn tại",
                contract_id
            )));
        }

        let plan = BusinessPlan::new(
            uuid::Uuid::new_v4().to_string(),
            contract_id.to_string(),
            plan_name,
            created_by,
        );
        self.plan_store.create(&plan)?;

        info!(plan_id = %plan.plan_id, contract_id, "tạo PAKD mới");
        Ok(plan.plan_id)
    }

    /// Đọc PAKD theo id
    pub fn get_plan(&self, plan_id: &str) -> ApiResult<BusinessPlan> {
        self.plan_store
            .get(plan_id)?
            .ok_or_else(|| ApiError::NotFound(format!("PAKD (id={}) không tồn tại", plan_id)))
    }

    // ==========================================
    // Chuyển trạng thái
    // ==========================================

    /// Thực hiện một hành động xét duyệt trên PAKD
    ///
    /// # Tham số
    /// - plan_id: PAKD cần thao tác
    /// - actor_id / actor_role: định danh và vai trò người thao tác
    /// - action: Submit / Approve / Reject
    /// - comment: ý kiến; bắt buộc khi Reject
    ///
    /// # Trả về
    /// - Ok(TransitionOutcome): PAKD sau cập nhật + cờ tự động +
    ///   cảnh báo ghi nhật ký (nếu có)
    /// - Err(ApiError): chuyển đổi bị từ chối, trạng thái giữ nguyên
    pub fn transition(
        &self,
        plan_id: &str,
        actor_id: &str,
        actor_role: ActorRole,
        action: ReviewAction,
        comment: Option<String>,
    ) -> ApiResult<TransitionOutcome> {
        let outcome = self.workflow_engine.transition(TransitionRequest {
            plan_id: plan_id.to_string(),
            actor_id: actor_id.to_string(),
            actor_role,
            action,
            comment,
        })?;

        Ok(outcome)
    }

    // ==========================================
    // Tra cứu
    // ==========================================

    /// Tính tổng hợp tài chính hiện hành của hợp đồng (phục vụ hiển thị)
    ///
    /// Không đụng tới bản chốt của PAKD đang xét duyệt.
    pub fn compute_totals(&self, contract_id: &str) -> ApiResult<FinancialTotals> {
        Ok(self.workflow_engine.compute_contract_totals(contract_id)?)
    }

    /// Lịch sử xét duyệt của PAKD, cũ nhất trước
    pub fn review_history(&self, plan_id: &str) -> ApiResult<Vec<ReviewLogEntry>> {
        Ok(self.review_log_store.list_by_plan(plan_id)?)
    }

    /// Danh sách PAKD của một hợp đồng, mới nhất trước
    pub fn list_plans(&self, contract_id: &str) -> ApiResult<Vec<BusinessPlan>> {
        Ok(self.plan_store.list_by_contract(contract_id)?)
    }
}
