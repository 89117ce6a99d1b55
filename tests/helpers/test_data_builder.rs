// ==========================================
// Bộ dựng dữ liệu test - dùng cho test tích hợp
// ==========================================

use chrono::Local;
use contract_pakd::domain::contract::{Contract, ExecutionCost, LineItem};

// ==========================================
// Bộ dựng Contract
// ==========================================

pub struct ContractBuilder {
    contract_id: String,
    contract_no: String,
    customer_name: Option<String>,
    supplier_discount_percent: f64,
    created_by: String,
}

impl ContractBuilder {
    pub fn new(contract_id: &str) -> Self {
        Self {
            contract_id: contract_id.to_string(),
            contract_no: format!("HD-{}", contract_id),
            customer_name: None,
            supplier_discount_percent: 0.0,
            created_by: "test_user".to_string(),
        }
    }

    pub fn contract_no(mut self, no: &str) -> Self {
        self.contract_no = no.to_string();
        self
    }

    pub fn customer(mut self, name: &str) -> Self {
        self.customer_name = Some(name.to_string());
        self
    }

    pub fn supplier_discount(mut self, percent: f64) -> Self {
        self.supplier_discount_percent = percent;
        self
    }

    pub fn created_by(mut self, user: &str) -> Self {
        self.created_by = user.to_string();
        self
    }

    pub fn build(self) -> Contract {
        let now = Local::now().naive_local();
        Contract {
            contract_id: self.contract_id,
            contract_no: self.contract_no,
            customer_name: self.customer_name,
            supplier_discount_percent: self.supplier_discount_percent,
            created_by: self.created_by,
            created_at: now,
            updated_at: now,
        }
    }
}

// ==========================================
// Bộ dựng LineItem
// ==========================================

pub struct LineItemBuilder {
    item_id: String,
    contract_id: String,
    name: String,
    quantity: f64,
    unit_input_price: f64,
    unit_output_price: f64,
    direct_cost_total: f64,
}

impl LineItemBuilder {
    pub fn new(item_id: &str, contract_id: &str) -> Self {
        Self {
            item_id: item_id.to_string(),
            contract_id: contract_id.to_string(),
            name: "Hạng mục thi công".to_string(),
            quantity: 1.0,
            unit_input_price: 0.0,
            unit_output_price: 0.0,
            direct_cost_total: 0.0,
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn quantity(mut self, quantity: f64) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn input_price(mut self, price: f64) -> Self {
        self.unit_input_price = price;
        self
    }

    pub fn output_price(mut self, price: f64) -> Self {
        self.unit_output_price = price;
        self
    }

    pub fn direct_cost(mut self, total: f64) -> Self {
        self.direct_cost_total = total;
        self
    }

    pub fn build(self) -> LineItem {
        LineItem {
            item_id: self.item_id,
            contract_id: self.contract_id,
            name: self.name,
            unit: Some("gói".to_string()),
            quantity: self.quantity,
            unit_input_price: self.unit_input_price,
            unit_output_price: self.unit_output_price,
            direct_cost_total: self.direct_cost_total,
        }
    }
}

// ==========================================
// Bộ dựng ExecutionCost
// ==========================================

pub struct ExecutionCostBuilder {
    cost_id: String,
    contract_id: String,
    name: String,
    amount: f64,
    requires_expert: Option<bool>,
}

impl ExecutionCostBuilder {
    pub fn new(cost_id: &str, contract_id: &str) -> Self {
        Self {
            cost_id: cost_id.to_string(),
            contract_id: contract_id.to_string(),
            name: "Chi phí triển khai".to_string(),
            amount: 0.0,
            requires_expert: None,
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn amount(mut self, amount: f64) -> Self {
        self.amount = amount;
        self
    }

    pub fn requires_expert(mut self, flag: bool) -> Self {
        self.requires_expert = Some(flag);
        self
    }

    pub fn build(self) -> ExecutionCost {
        let mut cost = ExecutionCost::new(
            self.cost_id,
            self.contract_id,
            self.name,
            self.amount,
        );
        if let Some(flag) = self.requires_expert {
            cost.requires_expert = flag;
        }
        cost
    }
}
