// ==========================================
// Test engine tính toán tài chính qua dữ liệu kho thật
// ==========================================
// Trách nhiệm: kiểm tra tổng hợp tài chính tính từ dữ liệu hợp đồng
//              đã lưu, và tính tất định khi tính lại
// ==========================================


#[path = "helpers/test_data_builder.rs"]
mod test_data_builder;

use std::sync::{Arc, Mutex};

use tempfile::NamedTempFile;

use contract_pakd::api::PlanApi;
use contract_pakd::config::{config_keys, ConfigManager};
use contract_pakd::repository::{
    SqliteContractStore, SqlitePlanStore, SqliteReviewLogStore,
};

use test_data_builder::{ContractBuilder, ExecutionCostBuilder, LineItemBuilder};
use test_helpers::create_test_db;

fn setup_api() -> (NamedTempFile, Arc<SqliteContractStore>, Arc<ConfigManager>, PlanApi) {
    let (temp_file, db_path) = create_test_db().unwrap();

    let conn = Arc::new(Mutex::new(
        contract_pakd::db::open_sqlite_connection(&db_path).unwrap(),
    ));
    let contract_store = Arc::new(SqliteContractStore::new(conn.clone()));
    let plan_store = Arc::new(SqlitePlanStore::new(conn.clone()));
    let review_log_store = Arc::new(SqliteReviewLogStore::new(conn.clone()));
    let config_manager = Arc::new(ConfigManager::from_connection(conn).unwrap());

    let api = PlanApi::new(
        contract_store.clone(),
        plan_store,
        review_log_store,
        config_manager.clone(),
    );

    (temp_file, contract_store, config_manager, api)
}

// ==========================================
// Test 1: tổng hợp đầy đủ từ dữ liệu đã lưu
// ==========================================

#[test]
fn test_totals_from_stored_contract() {
    let (_tmp, contract_store, _config, api) = setup_api();

    contract_store
        .create_contract(
            &ContractBuilder::new("HD001")
                .supplier_discount(5.0)
                .build(),
        )
        .unwrap();
    contract_store
        .save_line_item(
            &LineItemBuilder::new("I001", "HD001")
                .name("Tư vấn thiết kế")
                .quantity(1.0)
                .input_price(20_000_000.0)
                .output_price(30_000_000.0)
                .build(),
        )
        .unwrap();
    contract_store
        .save_execution_cost(
            &ExecutionCostBuilder::new("C001", "HD001")
                .name("Chi phí vận chuyển")
                .amount(300_000.0)
                .build(),
        )
        .unwrap();

    let totals = api.compute_totals("HD001").unwrap();

    assert_eq!(totals.signing_value, 30_000_000.0);
    assert_eq!(totals.total_input, 20_000_000.0);
    assert_eq!(totals.execution_costs_sum, 300_000.0);
    assert_eq!(totals.supplier_discount_amount, 1_000_000.0);
    assert_eq!(totals.total_costs, 19_300_000.0);
    assert_eq!(totals.gross_profit, 10_700_000.0);
    assert!((totals.profit_margin - 35.666_666_666_666_664).abs() < 1e-6);
    assert!(!totals.has_expert_hiring());
}

// ==========================================
// Test 2: tính lại nhiều lần cho kết quả giống hệt
// ==========================================

#[test]
fn test_recompute_is_deterministic() {
    let (_tmp, contract_store, _config, api) = setup_api();

    contract_store
        .create_contract(
            &ContractBuilder::new("HD002")
                .supplier_discount(2.5)
                .build(),
        )
        .unwrap();
    for (i, (qty, input, output, direct)) in [
        (3.0, 1_250_000.0, 1_900_000.0, 120_000.0),
        (7.5, 480_000.0, 650_000.0, 0.0),
        (2.0, 5_400_000.0, 7_150_000.0, 350_000.0),
    ]
    .iter()
    .enumerate()
    {
        contract_store
            .save_line_item(
                &LineItemBuilder::new(&format!("I{:03}", i), "HD002")
                    .quantity(*qty)
                    .input_price(*input)
                    .output_price(*output)
                    .direct_cost(*direct)
                    .build(),
            )
            .unwrap();
    }
    contract_store
        .save_execution_cost(
            &ExecutionCostBuilder::new("C001", "HD002")
                .name("Phí thuê chuyên gia")
                .amount(2_000_000.0)
                .build(),
        )
        .unwrap();

    let first = api.compute_totals("HD002").unwrap();
    let second = api.compute_totals("HD002").unwrap();

    assert_eq!(first, second);
    assert_eq!(
        first.profit_margin.to_bits(),
        second.profit_margin.to_bits()
    );
    assert!(first.has_expert_hiring());
}

// ==========================================
// Test 3: thuế suất VAT đọc từ cấu hình
// ==========================================

#[test]
fn test_vat_rate_from_config() {
    let (_tmp, contract_store, config, api) = setup_api();

    contract_store
        .create_contract(&ContractBuilder::new("HD003").build())
        .unwrap();
    contract_store
        .save_line_item(
            &LineItemBuilder::new("I001", "HD003")
                .quantity(1.0)
                .output_price(10_800_000.0)
                .build(),
        )
        .unwrap();

    // Mặc định VAT 10%
    let totals = api.compute_totals("HD003").unwrap();
    assert!((totals.estimated_revenue - 10_800_000.0 / 1.10).abs() < 1e-6);

    // Cấu hình VAT 8%
    config
        .set_config_value(config_keys::VAT_RATE, "0.08")
        .unwrap();
    let totals = api.compute_totals("HD003").unwrap();
    assert!((totals.estimated_revenue - 10_000_000.0).abs() < 1e-6);
}
