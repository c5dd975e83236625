//! The endpoint for saving a user's financial profile.

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
    auth::{UserID, update_financial_profile},
    endpoints,
    flash::set_flash,
    profile::{ProfileForm, profile_form_view},
};

/// The state needed for updating the profile.
#[derive(Debug, Clone)]
pub struct UpdateProfileState {
    pub cookie_key: Key,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for UpdateProfileState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

impl FromRef<UpdateProfileState> for Key {
    fn from_ref(state: &UpdateProfileState) -> Self {
        state.cookie_key.clone()
    }
}

/// Handle the profile form submission, redirecting back to the profile page on success.
pub async fn update_profile_endpoint(
    State(state): State<UpdateProfileState>,
    Extension(user_id): Extension<UserID>,
    jar: PrivateCookieJar,
    Form(form): Form<ProfileForm>,
) -> Response {
    let profile = match form.validate() {
        Ok(profile) => profile,
        Err(errors) => return profile_form_view(&form, &errors).into_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    if let Err(error) = update_financial_profile(user_id, profile, &connection) {
        tracing::error!("Could not update the profile of user {user_id}: {error}");
        return error.into_alert_response();
    }

    let alert = Alert::SuccessSimple {
        message: "Profile updated.".to_owned(),
    };

    match set_flash(jar, &alert) {
        Ok(jar) => (
            jar,
            HxRedirect(endpoints::PROFILE_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Could not set flash message: {error}");
            error.into_alert_response()
        }
    }
}
