//! The dashboard: the debt form and the user's payoff plan.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    alert::Alert,
    auth::{User, UserID, get_user_by_id},
    bank::{Bank, get_lending_banks},
    debt::{
        DebtForm, DebtFormErrors, PaymentPlan, debt_form_view, generate_plan, get_debts_for_user,
    },
    endpoints::{self, format_endpoint},
    flash::take_flash,
    html::{
        CARD_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE,
        TABLE_ROW_STYLE, base_with_alert, delete_button, format_currency, format_percentage,
    },
    navigation::NavBar,
};

/// The state needed for the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the dashboard with an empty debt form and the payoff plan.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
    jar: PrivateCookieJar,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let user = get_user_by_id(user_id, &connection)
        .inspect_err(|error| tracing::error!("Could not get user {user_id}: {error}"))?;
    let banks = get_lending_banks(&connection)
        .inspect_err(|error| tracing::error!("Could not get lending banks: {error}"))?;
    let debts = get_debts_for_user(user_id, &connection)
        .inspect_err(|error| tracing::error!("Could not get debts for user {user_id}: {error}"))?;

    let plan = generate_plan(debts, user.preferred_strategy);
    let (jar, flash) = take_flash(jar);

    Ok((jar, dashboard_view(&user, &plan, &banks, flash.as_ref())).into_response())
}

fn dashboard_view(user: &User, plan: &PaymentPlan, banks: &[Bank], flash: Option<&Alert>) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();
    let form = debt_form_view(&DebtForm::default(), &DebtFormErrors::default(), banks);

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-6xl space-y-6"
            {
                header
                {
                    h1 class="text-2xl font-bold" { "Hello, " (user.first_name) }
                    p class="text-gray-600 dark:text-gray-400"
                    {
                        "Register your credit cards and loans to get a plan for paying them off."
                    }
                }

                div class="grid grid-cols-1 lg:grid-cols-3 gap-6"
                {
                    section class=(CARD_STYLE)
                    {
                        h2 class="text-lg font-semibold mb-4" { "Register a credit" }
                        (form)
                    }

                    section class="lg:col-span-2 space-y-4"
                    {
                        (plan_summary_view(user, plan))
                        (plan_table_view(plan))
                    }
                }
            }
        }
    };

    base_with_alert("Dashboard", &[], &content, flash)
}

fn plan_summary_view(user: &User, plan: &PaymentPlan) -> Markup {
    let has_income = user.monthly_income > 0.0;
    let surplus = plan.monthly_surplus(user.monthly_income, user.fixed_expenses);
    let surplus_style = if surplus < 0.0 {
        "text-2xl font-bold text-red-600"
    } else {
        "text-2xl font-bold text-green-600"
    };

    html! {
        div class="grid grid-cols-1 sm:grid-cols-3 gap-4"
        {
            div class=(CARD_STYLE)
            {
                p class="text-sm text-gray-500 dark:text-gray-400" { "Total debt" }
                p id="total-balance" class="text-2xl font-bold" { (format_currency(plan.total_balance)) }
            }

            div class=(CARD_STYLE)
            {
                p class="text-sm text-gray-500 dark:text-gray-400" { "Minimum payments" }
                p id="total-minimum-payment" class="text-2xl font-bold"
                {
                    (format_currency(plan.total_minimum_payment))
                }
            }

            div class=(CARD_STYLE)
            {
                p class="text-sm text-gray-500 dark:text-gray-400" { "Left over each month" }
                @if has_income {
                    p id="monthly-surplus" class=(surplus_style)
                    {
                        (format_currency(surplus))
                    }
                } @else {
                    p class="text-sm"
                    {
                        "Add your income in your "
                        a href=(endpoints::PROFILE_VIEW) class=(LINK_STYLE) { "profile" }
                        " to see this."
                    }
                }
            }
        }

        p id="plan-strategy" class="text-sm text-gray-600 dark:text-gray-400"
        {
            "Strategy: " strong { (plan.strategy.label()) } ". "
            a href=(endpoints::PROFILE_VIEW) class=(LINK_STYLE) { "Change strategy" }
        }
    }
}

fn plan_table_view(plan: &PaymentPlan) -> Markup {
    html! {
        div class="overflow-x-auto rounded-lg shadow-md"
        {
            table id="payment-plan" class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Priority" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Institution" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Balance" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Limit" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Rate" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Minimum" }
                        th scope="col" class=(TABLE_CELL_STYLE) { span class="sr-only" { "Actions" } }
                    }
                }

                tbody
                {
                    @for (index, debt) in plan.debts.iter().enumerate() {
                        tr class=(TABLE_ROW_STYLE) data-debt-id=(debt.id)
                        {
                            td class=(TABLE_CELL_STYLE) { (index + 1) }
                            td class=(TABLE_CELL_STYLE) { (debt.bank_name) }
                            td class=(TABLE_CELL_STYLE) { (format_currency(debt.balance)) }
                            td class=(TABLE_CELL_STYLE) { (format_currency(debt.credit_limit)) }
                            td class=(TABLE_CELL_STYLE) { (format_percentage(debt.annual_rate)) }
                            td class=(TABLE_CELL_STYLE) { (format_currency(debt.minimum_payment)) }
                            td class=(TABLE_CELL_STYLE)
                            {
                                (delete_button(
                                    &format_endpoint(endpoints::DELETE_DEBT, debt.id),
                                    &format!("Delete the credit with {}?", debt.bank_name),
                                    "closest tr",
                                ))
                            }
                        }
                    }

                    @if plan.debts.is_empty() {
                        tr
                        {
                            td colspan="7" class="px-6 py-4 text-center"
                            {
                                "You have no registered credits. Use the form to add one."
                            }
                        }
                    }
                }
            }
        }
    }
}
