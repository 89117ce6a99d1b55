// ==========================================
// Test WorkflowEngine với kho dữ liệu giả lập
// ==========================================
// Trách nhiệm: kiểm tra ngữ nghĩa nỗ-lực-tốt-nhất của việc ghi nhật ký
//              (trạng thái là chính, nhật ký không rollback)
// ==========================================

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use contract_pakd::config::ConfigManager;
use contract_pakd::domain::contract::{Contract, ExecutionCost, LineItem};
use contract_pakd::domain::plan::BusinessPlan;
use contract_pakd::domain::review_log::ReviewLogEntry;
use contract_pakd::domain::types::{ActorRole, PlanStatus, ReviewAction};
use contract_pakd::engine::workflow::{TransitionRequest, WorkflowEngine};
use contract_pakd::engine::TransitionWarning;
use contract_pakd::repository::error::{RepositoryError, RepositoryResult};
use contract_pakd::repository::{ContractStore, PlanStore, ReviewLogStore};

// ==========================================
// Kho giả lập trong bộ nhớ
// ==========================================

struct MemContractStore {
    contract: Contract,
    line_items: Vec<LineItem>,
}

impl ContractStore for MemContractStore {
    fn get_contract(&self, contract_id: &str) -> RepositoryResult<Option<Contract>> {
        Ok((contract_id == self.contract.contract_id).then(|| self.contract.clone()))
    }

    fn get_line_items(&self, _contract_id: &str) -> RepositoryResult<Vec<LineItem>> {
        Ok(self.line_items.clone())
    }

    fn get_execution_costs(&self, _contract_id: &str) -> RepositoryResult<Vec<ExecutionCost>> {
        Ok(vec![])
    }
}

#[derive(Default)]
struct MemPlanStore {
    plans: Mutex<HashMap<String, BusinessPlan>>,
}

impl PlanStore for MemPlanStore {
    fn get(&self, plan_id: &str) -> RepositoryResult<Option<BusinessPlan>> {
        Ok(self.plans.lock().unwrap().get(plan_id).cloned())
    }

    fn create(&self, plan: &BusinessPlan) -> RepositoryResult<String> {
        self.plans
            .lock()
            .unwrap()
            .insert(plan.plan_id.clone(), plan.clone());
        Ok(plan.plan_id.clone())
    }

    fn save(&self, plan: &BusinessPlan) -> RepositoryResult<()> {
        self.plans
            .lock()
            .unwrap()
            .insert(plan.plan_id.clone(), plan.clone());
        Ok(())
    }

    fn list_by_contract(&self, _contract_id: &str) -> RepositoryResult<Vec<BusinessPlan>> {
        Ok(self.plans.lock().unwrap().values().cloned().collect())
    }
}

/// Kho nhật ký luôn ghi thất bại
struct FailingReviewLogStore;

impl ReviewLogStore for FailingReviewLogStore {
    fn append(&self, _entry: &ReviewLogEntry) -> RepositoryResult<String> {
        Err(RepositoryError::DatabaseQueryError(
            "disk I/O error".to_string(),
        ))
    }

    fn list_by_plan(&self, _plan_id: &str) -> RepositoryResult<Vec<ReviewLogEntry>> {
        Ok(vec![])
    }
}

fn mem_contract(contract_id: &str) -> MemContractStore {
    let now = chrono::Local::now().naive_local();
    MemContractStore {
        contract: Contract {
            contract_id: contract_id.to_string(),
            contract_no: format!("HD-{}", contract_id),
            customer_name: None,
            supplier_discount_percent: 0.0,
            created_by: "test_user".to_string(),
            created_at: now,
            updated_at: now,
        },
        line_items: vec![LineItem {
            item_id: "I001".to_string(),
            contract_id: contract_id.to_string(),
            name: "Hạng mục thi công".to_string(),
            unit: None,
            quantity: 1.0,
            unit_input_price: 20_000_000.0,
            unit_output_price: 24_000_000.0,
            direct_cost_total: 0.0,
        }],
    }
}

// ==========================================
// Test: ghi nhật ký thất bại không rollback trạng thái
// ==========================================

#[test]
fn test_log_append_failure_is_surfaced_not_rolled_back() {
    let plan_store = Arc::new(MemPlanStore::default());
    let plan = BusinessPlan::new(
        "P001".to_string(),
        "HD001".to_string(),
        "PAKD thi công".to_string(),
        "sale01".to_string(),
    );
    plan_store.create(&plan).unwrap();

    let engine = WorkflowEngine::new(
        Arc::new(mem_contract("HD001")),
        plan_store.clone(),
        Arc::new(FailingReviewLogStore),
        Arc::new(ConfigManager::in_memory().unwrap()),
    );

    let outcome = engine
        .transition(TransitionRequest {
            plan_id: "P001".to_string(),
            actor_id: "sale01".to_string(),
            actor_role: ActorRole::Sales,
            action: ReviewAction::Submit,
            comment: None,
        })
        .unwrap();

    // Chuyển đổi vẫn thành công, kèm cảnh báo ghi nhật ký
    assert_eq!(outcome.plan.status, PlanStatus::PendingUnit);
    assert!(matches!(
        outcome.log_warning,
        Some(TransitionWarning::LogAppendFailed(_))
    ));

    // Trạng thái đã được lưu thật sự
    let stored = plan_store.get("P001").unwrap().unwrap();
    assert_eq!(stored.status, PlanStatus::PendingUnit);
}

// ==========================================
// Test: lỗi chính sách xảy ra trước khi ghi, kho không bị đụng tới
// ==========================================

#[test]
fn test_failed_transition_does_not_touch_plan_store() {
    let plan_store = Arc::new(MemPlanStore::default());
    let plan = BusinessPlan::new(
        "P002".to_string(),
        "HD001".to_string(),
        "PAKD thi công".to_string(),
        "sale01".to_string(),
    );
    plan_store.create(&plan).unwrap();

    let engine = WorkflowEngine::new(
        Arc::new(mem_contract("HD001")),
        plan_store.clone(),
        Arc::new(FailingReviewLogStore),
        Arc::new(ConfigManager::in_memory().unwrap()),
    );

    // Kế toán không có quyền trình bản nháp
    let err = engine
        .transition(TransitionRequest {
            plan_id: "P002".to_string(),
            actor_id: "ketoan01".to_string(),
            actor_role: ActorRole::Accountant,
            action: ReviewAction::Submit,
            comment: None,
        })
        .unwrap_err();
    assert!(matches!(
        err,
        contract_pakd::WorkflowError::InvalidTransition { .. }
    ));

    let stored = plan_store.get("P002").unwrap().unwrap();
    assert_eq!(stored.status, PlanStatus::Draft);
    assert!(stored.totals_snapshot.is_none());
}
