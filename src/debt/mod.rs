//! Debts owed to banks and the plan for paying them off.

mod core;
mod create_endpoint;
mod dashboard_page;
mod delete_endpoint;
mod form;
mod plan;

pub use core::{
    Debt, DebtId, NewDebt, create_debt, create_debt_table, delete_debt, get_debts_for_user,
};
pub use create_endpoint::create_debt_endpoint;
pub use dashboard_page::get_dashboard_page;
pub use delete_endpoint::delete_debt_endpoint;
pub use form::{DebtForm, DebtFormErrors, debt_form_view};
pub use plan::{PaymentPlan, PayoffStrategy, generate_plan};
