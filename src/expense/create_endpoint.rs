//! The endpoint for recording an expense.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    alert::Alert,
    auth::UserID,
    endpoints,
    expense::{ExpenseForm, create_expense, expense_form_view},
    flash::set_flash,
};

/// The message shown on the expenses page after an expense is saved.
pub const EXPENSE_CREATED_MESSAGE: &str = "Expense recorded. Keep your money under control!";

/// The state needed for recording an expense.
#[derive(Debug, Clone)]
pub struct CreateExpenseState {
    pub cookie_key: Key,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

impl FromRef<CreateExpenseState> for Key {
    fn from_ref(state: &CreateExpenseState) -> Self {
        state.cookie_key.clone()
    }
}

/// Handle the expense form submission.
pub async fn create_expense_endpoint(
    State(state): State<CreateExpenseState>,
    Extension(user_id): Extension<UserID>,
    jar: PrivateCookieJar,
    Form(form): Form<ExpenseForm>,
) -> Response {
    let new_expense = match form.validate() {
        Ok(new_expense) => new_expense,
        Err(errors) => return expense_form_view(&form, &errors).into_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    if let Err(error) = create_expense(user_id, new_expense, &connection) {
        tracing::error!("An unexpected error occurred while creating an expense: {error}");
        return error.into_alert_response();
    }

    let alert = Alert::SuccessSimple {
        message: EXPENSE_CREATED_MESSAGE.to_owned(),
    };

    match set_flash(jar, &alert) {
        Ok(jar) => (
            jar,
            HxRedirect(endpoints::EXPENSES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Could not set flash message: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod create_expense_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Router,
        extract::Request,
        http::StatusCode,
        middleware::{self, Next},
        routing::post,
    };
    use axum_test::TestServer;
    use rusqlite::Connection;

    use crate::{
        app_state::create_cookie_key,
        auth::{UserID, create_user, test_user},
        db::initialize,
        endpoints,
        expense::{ExpenseCategory, get_expenses_for_user},
        flash::COOKIE_FLASH,
    };

    use super::{CreateExpenseState, create_expense_endpoint};

    fn get_state() -> (CreateExpenseState, UserID) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = create_user(test_user("ana@example.com"), &connection).unwrap();

        (
            CreateExpenseState {
                cookie_key: create_cookie_key("expenses"),
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user.id,
        )
    }

    fn get_server(state: CreateExpenseState, user_id: UserID) -> TestServer {
        let app = Router::new()
            .route(endpoints::EXPENSES_API, post(create_expense_endpoint))
            .layer(middleware::from_fn(
                move |mut request: Request, next: Next| async move {
                    request.extensions_mut().insert(user_id);
                    next.run(request).await
                },
            ))
            .with_state(state);

        TestServer::try_new(app).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn valid_expense_is_saved_and_redirects() {
        let (state, user_id) = get_state();
        let server = get_server(state.clone(), user_id);

        let response = server
            .post(endpoints::EXPENSES_API)
            .form(&[
                ("description", "Bubble tea"),
                ("amount", "75"),
                ("category", "ant"),
            ])
            .await;

        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("hx-redirect"), endpoints::EXPENSES_VIEW);
        assert_eq!(response.cookie(COOKIE_FLASH).name(), COOKIE_FLASH);

        let expenses = get_expenses_for_user(user_id, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0].description, "Bubble tea");
        assert_eq!(expenses[0].category, ExpenseCategory::Ant);
    }

    #[tokio::test]
    async fn invalid_expense_returns_form_with_errors() {
        let (state, user_id) = get_state();
        let server = get_server(state.clone(), user_id);

        let response = server
            .post(endpoints::EXPENSES_API)
            .form(&[("description", "Rent"), ("amount", "0"), ("category", "fixed")])
            .await;

        response.assert_status_ok();
        let text = response.text();
        assert!(text.contains("Number must be at least 0.1."));
        assert!(text.contains(r#"value="Rent""#));

        let expenses = get_expenses_for_user(user_id, &state.db_connection.lock().unwrap()).unwrap();
        assert!(expenses.is_empty());
    }

    #[tokio::test]
    async fn missing_fields_are_reported_instead_of_rejected() {
        let (state, user_id) = get_state();
        let server = get_server(state, user_id);

        let response = server
            .post(endpoints::EXPENSES_API)
            .form(&[("description", "Rent")])
            .await;

        response.assert_status_ok();
        assert!(response.text().contains("This field is required."));
    }
}
