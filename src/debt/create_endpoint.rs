//! The endpoint for registering a debt from the dashboard form.

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
    bank::get_lending_banks,
    debt::{DebtForm, create_debt, debt_form_view},
    endpoints,
    flash::set_flash,
};

/// The message shown on the dashboard after a debt is saved.
pub const DEBT_CREATED_MESSAGE: &str = "Credit registered successfully.";

/// The state needed for creating a debt.
#[derive(Debug, Clone)]
pub struct CreateDebtState {
    pub cookie_key: Key,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateDebtState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

impl FromRef<CreateDebtState> for Key {
    fn from_ref(state: &CreateDebtState) -> Self {
        state.cookie_key.clone()
    }
}

/// Handle the debt form submission.
///
/// Invalid input returns the form with the errors next to their fields.
/// On success the client is redirected to the dashboard, which shows a confirmation.
pub async fn create_debt_endpoint(
    State(state): State<CreateDebtState>,
    Extension(user_id): Extension<UserID>,
    jar: PrivateCookieJar,
    Form(form): Form<DebtForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let banks = match get_lending_banks(&connection) {
        Ok(banks) => banks,
        Err(error) => {
            tracing::error!("Could not get lending banks: {error}");
            return error.into_alert_response();
        }
    };

    let new_debt = match form.validate(&banks) {
        Ok(new_debt) => new_debt,
        Err(errors) => return debt_form_view(&form, &errors, &banks).into_response(),
    };

    if let Err(error) = create_debt(user_id, new_debt, &connection) {
        tracing::error!("An unexpected error occurred while creating a debt: {error}");
        return error.into_alert_response();
    }

    let alert = Alert::SuccessSimple {
        message: DEBT_CREATED_MESSAGE.to_owned(),
    };

    match set_flash(jar, &alert) {
        Ok(jar) => (
            jar,
            HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Could not set flash message: {error}");
            error.into_alert_response()
        }
    }
}
