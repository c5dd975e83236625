//! Recording expenses and summarising spending.

mod core;
mod create_endpoint;
mod delete_endpoint;
mod expenses_page;
mod form;
mod totals;

pub use core::{
    Expense, ExpenseCategory, ExpenseId, NewExpense, create_expense, create_expense_table,
    delete_expense, get_expenses_for_user,
};
pub use create_endpoint::create_expense_endpoint;
pub use delete_endpoint::delete_expense_endpoint;
pub use expenses_page::get_expenses_page;
pub use form::{ExpenseForm, ExpenseFormErrors, expense_form_view};
pub use totals::{ExpenseTotals, expenses_by_category_chart};
