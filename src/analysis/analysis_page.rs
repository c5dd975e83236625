//! The credit analysis page.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    analysis::{CreditAnalysis, score_gauge_chart},
    auth::UserID,
    charts::{PageChart, charts_head_elements, charts_view},
    debt::{Debt, get_debts_for_user},
    endpoints,
    html::{
        CARD_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE,
        TABLE_ROW_STYLE, base, format_currency, format_percentage,
    },
    navigation::NavBar,
};

/// The state needed for the analysis page.
#[derive(Debug, Clone)]
pub struct AnalysisState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AnalysisState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the credit score and utilization of the logged in user.
pub async fn get_analysis_page(
    State(state): State<AnalysisState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let debts = get_debts_for_user(user_id, &connection)
        .inspect_err(|error| tracing::error!("Could not get debts for user {user_id}: {error}"))?;

    Ok(analysis_view(&debts).into_response())
}

fn analysis_view(debts: &[Debt]) -> Markup {
    let nav_bar = NavBar::new(endpoints::ANALYSIS_VIEW).into_html();
    let analysis = CreditAnalysis::new(debts);
    let rating = analysis.rating();
    let score_style = format!("text-5xl font-extrabold {}", rating.text_style());
    let charts = [PageChart::new("score-chart", &score_gauge_chart(analysis.score))];

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-5xl space-y-6"
            {
                header
                {
                    h1 class="text-2xl font-bold" { "Credit analysis" }
                    p class="text-gray-600 dark:text-gray-400"
                    {
                        "An estimate based on how much of your available credit you are using. "
                        "It is not a score from a credit bureau."
                    }
                }

                div class="grid grid-cols-1 md:grid-cols-2 gap-6"
                {
                    section class=(CARD_STYLE)
                    {
                        p class="text-sm text-gray-500 dark:text-gray-400" { "Estimated score" }
                        p id="score" class=(score_style) { (analysis.score) }
                        p id="score-rating" class="text-lg font-semibold" { (rating.label()) }
                        p class="mt-2 text-sm" { (rating.advice()) }
                    }

                    section class=(CARD_STYLE)
                    {
                        dl class="grid grid-cols-2 gap-4"
                        {
                            dt class="text-sm text-gray-500 dark:text-gray-400" { "Credit usage" }
                            dd id="utilization" class="font-bold" { (format_percentage(analysis.utilization)) }

                            dt class="text-sm text-gray-500 dark:text-gray-400" { "Total debt" }
                            dd id="total-debt" class="font-bold" { (format_currency(analysis.total_debt)) }

                            dt class="text-sm text-gray-500 dark:text-gray-400" { "Total credit limit" }
                            dd id="total-limit" class="font-bold" { (format_currency(analysis.total_limit)) }
                        }
                    }
                }

                (charts_view(&charts))

                @if debts.is_empty() {
                    p class="text-center"
                    {
                        "You have no registered credits. "
                        a href=(endpoints::DASHBOARD_VIEW) class=(LINK_STYLE) { "Add one on the dashboard" }
                        "."
                    }
                } @else {
                    (debts_usage_table(debts))
                }
            }
        }
    };

    base("Credit Analysis", &charts_head_elements(&charts), &content)
}

fn debts_usage_table(debts: &[Debt]) -> Markup {
    html! {
        div class="overflow-x-auto rounded-lg shadow-md"
        {
            table id="credit-usage" class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Institution" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Balance" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Limit" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Usage" }
                    }
                }

                tbody
                {
                    @for debt in debts {
                        @let usage = if debt.credit_limit > 0.0 {
                            format_percentage(debt.balance / debt.credit_limit * 100.0)
                        } else {
                            "-".to_owned()
                        };

                        tr class=(TABLE_ROW_STYLE)
                        {
                            td class=(TABLE_CELL_STYLE) { (debt.bank_name) }
                            td class=(TABLE_CELL_STYLE) { (format_currency(debt.balance)) }
                            td class=(TABLE_CELL_STYLE) { (format_currency(debt.credit_limit)) }
                            td class=(TABLE_CELL_STYLE) { (usage) }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod analysis_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use rusqlite::Connection;
    use crate::{
        auth::{UserID, create_user, test_user},
        db::initialize,
        debt::{NewDebt, create_debt},
        test_utils::{assert_valid_html, must_select_text, parse_html_document},
    };

    use super::{AnalysisState, get_analysis_page};

    fn get_state() -> (AnalysisState, UserID) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = create_user(test_user("ana@example.com"), &connection).unwrap();

        (
            AnalysisState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user.id,
        )
    }

    #[tokio::test]
    async fn user_without_debts_has_no_history() {
        let (state, user_id) = get_state();

        let response = get_analysis_page(State(state), Extension(user_id))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        assert_eq!(must_select_text(&html, "#score"), "0");
        assert_eq!(must_select_text(&html, "#score-rating"), "No credit history");
        assert_eq!(must_select_text(&html, "#utilization"), "0.0%");
    }

    #[tokio::test]
    async fn high_utilization_lowers_score() {
        let (state, user_id) = get_state();
        create_debt(
            user_id,
            NewDebt {
                bank_id: 1,
                balance: 9000.0,
                credit_limit: 10_000.0,
                annual_rate: 55.0,
                minimum_payment: 900.0,
            },
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();

        let response = get_analysis_page(State(state), Extension(user_id))
            .await
            .unwrap();

        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        assert_eq!(must_select_text(&html, "#score"), "600");
        assert_eq!(must_select_text(&html, "#score-rating"), "Poor");
        assert_eq!(must_select_text(&html, "#utilization"), "90.0%");
        assert_eq!(must_select_text(&html, "#total-debt"), "$9,000.00");
        assert_eq!(must_select_text(&html, "#credit-usage tbody td:nth-child(4)"), "90.0%");
    }
}
