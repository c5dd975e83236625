//! The expenses page: the expense form, spending totals and the list of expenses.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;
use maud::{Markup, html};
use rusqlite::Connection;
use time::{UtcOffset, format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    AppState, Error,
    alert::Alert,
    auth::UserID,
    charts::{PageChart, charts_head_elements, charts_view},
    endpoints::{self, format_endpoint},
    expense::{
        Expense, ExpenseCategory, ExpenseForm, ExpenseFormErrors, ExpenseTotals,
        expense_form_view, expenses_by_category_chart, get_expenses_for_user,
    },
    flash::take_flash,
    html::{
        CARD_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base_with_alert, delete_button, format_currency,
    },
    navigation::NavBar,
    timezone::get_local_offset,
};

const CREATED_AT_FORMAT: &[BorrowedFormatItem] =
    format_description!("[year]-[month]-[day] [hour]:[minute]");

/// The state needed for the expenses page.
#[derive(Debug, Clone)]
pub struct ExpensesPageState {
    /// The local timezone as a canonical timezone name, e.g. "America/Mexico_City".
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ExpensesPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the expenses page for the logged in user.
pub async fn get_expenses_page(
    State(state): State<ExpensesPageState>,
    Extension(user_id): Extension<UserID>,
    jar: PrivateCookieJar,
) -> Result<Response, Error> {
    let local_offset = get_local_offset(&state.local_timezone)
        .ok_or_else(|| Error::InvalidTimezoneError(state.local_timezone.clone()))?;

    let expenses = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_expenses_for_user(user_id, &connection).inspect_err(|error| {
            tracing::error!("Could not get expenses for user {user_id}: {error}")
        })?
    };

    let (jar, flash) = take_flash(jar);

    Ok((jar, expenses_view(&expenses, local_offset, flash.as_ref())).into_response())
}

fn expenses_view(expenses: &[Expense], local_offset: UtcOffset, flash: Option<&Alert>) -> Markup {
    let nav_bar = NavBar::new(endpoints::EXPENSES_VIEW).into_html();
    let form = expense_form_view(&ExpenseForm::default(), &ExpenseFormErrors::default());
    let totals = ExpenseTotals::from_expenses(expenses);
    let charts = [PageChart::new(
        "expenses-by-category-chart",
        &expenses_by_category_chart(&totals),
    )];

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-6xl space-y-6"
            {
                header
                {
                    h1 class="text-2xl font-bold" { "Expenses" }
                    p class="text-gray-600 dark:text-gray-400"
                    {
                        "Small everyday purchases add up. Record what you spend to see where your money goes."
                    }
                }

                div class="grid grid-cols-1 lg:grid-cols-3 gap-6"
                {
                    section class=(CARD_STYLE)
                    {
                        h2 class="text-lg font-semibold mb-4" { "Record an expense" }
                        (form)
                    }

                    section class="lg:col-span-2 space-y-4"
                    {
                        (totals_view(&totals))

                        @if !expenses.is_empty() {
                            (charts_view(&charts))
                        }

                        (expenses_table_view(expenses, local_offset))
                    }
                }
            }
        }
    };

    let head_elements = if expenses.is_empty() {
        Vec::new()
    } else {
        charts_head_elements(&charts)
    };

    base_with_alert("Expenses", &head_elements, &content, flash)
}

fn totals_view(totals: &ExpenseTotals) -> Markup {
    html! {
        div class="grid grid-cols-1 sm:grid-cols-2 gap-4"
        {
            div class=(CARD_STYLE)
            {
                p class="text-sm text-gray-500 dark:text-gray-400" { "Ant expenses" }
                p id="ant-total" class="text-2xl font-bold text-amber-600"
                {
                    (format_currency(totals.ant))
                }
            }

            div class=(CARD_STYLE)
            {
                p class="text-sm text-gray-500 dark:text-gray-400" { "Total spent" }
                p id="overall-total" class="text-2xl font-bold" { (format_currency(totals.overall())) }
            }
        }

        ul id="category-totals" class="grid grid-cols-1 sm:grid-cols-3 gap-2 text-sm"
        {
            @for category in ExpenseCategory::ALL {
                li data-category=(category.as_str())
                {
                    (category.label()) ": "
                    span class="font-semibold" { (format_currency(totals.for_category(category))) }
                }
            }
        }
    }
}

fn expenses_table_view(expenses: &[Expense], local_offset: UtcOffset) -> Markup {
    html! {
        div class="overflow-x-auto rounded-lg shadow-md"
        {
            table id="expenses" class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                        th scope="col" class=(TABLE_CELL_STYLE) { span class="sr-only" { "Actions" } }
                    }
                }

                tbody
                {
                    @for expense in expenses {
                        @let created_at = expense
                            .created_at
                            .to_offset(local_offset)
                            .format(CREATED_AT_FORMAT)
                            .unwrap_or_else(|_| expense.created_at.to_string());

                        tr class=(TABLE_ROW_STYLE) data-expense-id=(expense.id)
                        {
                            td class=(TABLE_CELL_STYLE) { (created_at) }
                            td class=(TABLE_CELL_STYLE) { (expense.description) }
                            td class=(TABLE_CELL_STYLE) { (expense.category.label()) }
                            td class=(TABLE_CELL_STYLE) { (format_currency(expense.amount)) }
                            td class=(TABLE_CELL_STYLE)
                            {
                                (delete_button(
                                    &format_endpoint(endpoints::DELETE_EXPENSE, expense.id),
                                    &format!("Delete the expense \"{}\"?", expense.description),
                                    "closest tr",
                                ))
                            }
                        }
                    }

                    @if expenses.is_empty() {
                        tr
                        {
                            td colspan="5" class="px-6 py-4 text-center"
                            {
                                "No expenses recorded yet."
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod expenses_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use axum_extra::extract::PrivateCookieJar;
    use rusqlite::Connection;
    use scraper::Selector;

    use crate::{
        Error,
        app_state::create_cookie_key,
        auth::{UserID, create_user, test_user},
        db::initialize,
        endpoints,
        expense::{ExpenseCategory, NewExpense, create_expense},
        test_utils::{
            assert_hx_endpoint, assert_valid_html, must_get_form, must_select_text,
            parse_html_document,
        },
    };

    use super::{ExpensesPageState, get_expenses_page};

    fn get_state() -> (ExpensesPageState, UserID) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = create_user(test_user("ana@example.com"), &connection).unwrap();

        (
            ExpensesPageState {
                local_timezone: "Etc/UTC".to_owned(),
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user.id,
        )
    }

    fn get_jar() -> PrivateCookieJar {
        PrivateCookieJar::new(create_cookie_key("expenses"))
    }

    fn add_expense(state: &ExpensesPageState, user_id: UserID, amount: f64, category: ExpenseCategory) {
        create_expense(
            user_id,
            NewExpense {
                description: format!("{} purchase", category.as_str()),
                amount,
                category,
            },
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();
    }

    #[tokio::test]
    async fn renders_form_and_empty_list() {
        let (state, user_id) = get_state();

        let response = get_expenses_page(State(state), Extension(user_id), get_jar())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::EXPENSES_API, "hx-post");
        assert_eq!(must_select_text(&html, "#ant-total"), "$0.00");
        assert_eq!(
            must_select_text(&html, "#expenses tbody td"),
            "No expenses recorded yet."
        );
        assert!(
            html.select(&Selector::parse("#expenses-by-category-chart").unwrap())
                .next()
                .is_none(),
            "the chart should be hidden when there are no expenses"
        );
    }

    #[tokio::test]
    async fn shows_totals_and_chart() {
        let (state, user_id) = get_state();
        add_expense(&state, user_id, 35.5, ExpenseCategory::Ant);
        add_expense(&state, user_id, 64.5, ExpenseCategory::Ant);
        add_expense(&state, user_id, 7500.0, ExpenseCategory::Fixed);

        let response = get_expenses_page(State(state), Extension(user_id), get_jar())
            .await
            .unwrap();

        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        assert_eq!(must_select_text(&html, "#ant-total"), "$100.00");
        assert_eq!(must_select_text(&html, "#overall-total"), "$7,600.00");
        assert_eq!(
            html.select(&Selector::parse("#expenses tbody tr").unwrap())
                .count(),
            3
        );
        assert!(
            html.select(&Selector::parse("#expenses-by-category-chart").unwrap())
                .next()
                .is_some()
        );
    }

    #[tokio::test]
    async fn invalid_timezone_is_an_error() {
        let (mut state, user_id) = get_state();
        state.local_timezone = "Mars/Olympus_Mons".to_owned();

        let result = get_expenses_page(State(state), Extension(user_id), get_jar()).await;

        assert!(matches!(result, Err(Error::InvalidTimezoneError(_))));
    }
}
