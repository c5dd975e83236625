//! Debt deletion endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    alert::Alert,
    auth::UserID,
    debt::{DebtId, delete_debt},
};

/// The state needed for deleting a debt.
#[derive(Debug, Clone)]
pub struct DeleteDebtState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteDebtState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handle debt deletion. Returns success alert or error.
pub async fn delete_debt_endpoint(
    Path(debt_id): Path<DebtId>,
    State(state): State<DeleteDebtState>,
    Extension(user_id): Extension<UserID>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_debt(user_id, debt_id, &connection) {
        Ok(()) => Alert::SuccessSimple {
            message: "Credit deleted successfully".to_owned(),
        }
        .into_response(),
        Err(Error::DeleteMissingDebt) => Error::DeleteMissingDebt.into_alert_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while deleting debt {debt_id}: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod delete_debt_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
    };
    use rusqlite::Connection;
    use scraper::Selector;

    use crate::{
        auth::{UserID, create_user, test_user},
        db::initialize,
        debt::{NewDebt, create_debt, get_debts_for_user},
        test_utils::{assert_valid_html, get_header, parse_html_fragment},
    };

    use super::{DeleteDebtState, delete_debt_endpoint};

    fn get_state() -> (DeleteDebtState, UserID, UserID) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let ana = create_user(test_user("ana@example.com"), &connection).unwrap();
        let luis = create_user(test_user("luis@example.com"), &connection).unwrap();

        (
            DeleteDebtState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            ana.id,
            luis.id,
        )
    }

    fn add_debt(state: &DeleteDebtState, user_id: UserID) -> i64 {
        create_debt(
            user_id,
            NewDebt {
                bank_id: 2,
                balance: 800.0,
                credit_limit: 5000.0,
                annual_rate: 38.0,
                minimum_payment: 90.0,
            },
            &state.db_connection.lock().unwrap(),
        )
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn deletes_own_debt() {
        let (state, ana, _) = get_state();
        let debt_id = add_debt(&state, ana);

        let response =
            delete_debt_endpoint(Path(debt_id), State(state.clone()), Extension(ana)).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            get_debts_for_user(ana, &state.db_connection.lock().unwrap())
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn cannot_delete_another_users_debt() {
        let (state, ana, luis) = get_state();
        let debt_id = add_debt(&state, ana);

        let response =
            delete_debt_endpoint(Path(debt_id), State(state.clone()), Extension(luis)).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            get_debts_for_user(ana, &state.db_connection.lock().unwrap())
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn missing_debt_returns_error_alert() {
        let (state, ana, _) = get_state();

        let response = delete_debt_endpoint(Path(999), State(state), Extension(ana)).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            get_header(&response, "content-type"),
            "text/html; charset=utf-8"
        );
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        let message = html
            .select(&Selector::parse("[role=alert] p").unwrap())
            .next()
            .expect("No error message found");
        assert_eq!(message.text().collect::<String>(), "Could not delete credit");
    }
}
