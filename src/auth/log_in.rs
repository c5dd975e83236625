//! This file defines the routes for displaying the log-in page and handling log-in requests.
//! The auth module handles the lower level authentication and cookie auth logic.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Error,
    app_state::create_cookie_key,
    auth::{
        DEFAULT_COOKIE_DURATION, User, get_user_by_email, invalidate_auth_cookie,
        normalize_redirect_url, set_auth_cookie,
    },
    endpoints,
    flash::take_flash,
    html::{
        FORM_ERROR_STYLE, InputKind, LINK_STYLE, base_with_alert, form_input, log_in_register,
        password_input, submit_button,
    },
    timezone::get_local_offset,
    validation::{REQUIRED_MESSAGE, parse_email},
};

/// Shown for an unknown email and for a wrong password alike.
pub const LOG_IN_FAILED_MESSAGE: &str = "Login unsuccessful. Please check your email and password.";

const INTERNAL_ERROR_MESSAGE: &str = "An internal error occurred. Please try again later.";

/// The error messages shown on the log-in form.
#[derive(Debug, Default)]
struct LogInErrors<'a> {
    email: Option<String>,
    password: Option<String>,
    form: Option<&'a str>,
}

fn log_in_form(email: &str, errors: &LogInErrors, redirect_url: Option<&str>) -> Markup {
    html! {
        form
            hx-post=(endpoints::LOG_IN_API)
            hx-target="this"
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            hx-indicator="#indicator"
            hx-disabled-elt="#email, #password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            @if let Some(redirect_url) = redirect_url {
                input type="hidden" name="redirect_url" value=(redirect_url);
            }

            (form_input("email", "Email", InputKind::Email, email, errors.email.as_deref()))
            (password_input("", 0, errors.password.as_deref()))

            div class="flex items-center gap-x-3"
            {
                input
                    type="checkbox"
                    name="remember_me"
                    id="remember_me"
                    tabindex="0"
                    class="rounded-xs";

                label
                    for="remember_me"
                    class="block text-sm font-medium text-gray-900 dark:text-white"
                {
                    "Keep me logged in for one week"
                }
            }

            @if let Some(message) = errors.form {
                p class=(FORM_ERROR_STYLE) { (message) }
            }

            (submit_button("Log in"))

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Forgot your password? "
                a href=(endpoints::FORGOT_PASSWORD_VIEW) tabindex="0" class=(LINK_STYLE)
                {
                  "Reset it here"
                }
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400" {
                "Don't have an account? "
                a href=(endpoints::REGISTER_VIEW) tabindex="0" class=(LINK_STYLE)
                {
                  "Register here"
                }
            }
        }
    }
}

fn parse_redirect_url(raw_url: Option<&str>, source: &str) -> Option<String> {
    match raw_url.and_then(normalize_redirect_url) {
        Some(redirect_url) => Some(redirect_url),
        None => {
            if let Some(redirect_url) = raw_url {
                tracing::warn!("Invalid redirect URL from {source}: {redirect_url}");
            }
            None
        }
    }
}

/// Display the log-in page along with any pending flash message, e.g. after registering.
pub async fn get_log_in_page(
    jar: PrivateCookieJar,
    Query(query): Query<RedirectQuery>,
) -> Response {
    let redirect_url = parse_redirect_url(query.redirect_url.as_deref(), "log-in query");
    let log_in_form = log_in_form("", &LogInErrors::default(), redirect_url.as_deref());
    let content = log_in_register("Log in to your account", &log_in_form);
    let (jar, flash) = take_flash(jar);

    (jar, base_with_alert("Log In", &[], &content, flash.as_ref())).into_response()
}

/// How long the auth cookie should last if the user selects "remember me" at log-in.
const REMEMBER_ME_COOKIE_DURATION: Duration = Duration::days(7);

/// The state needed to perform a login.
#[derive(Debug, Clone)]
pub struct LoginState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The local timezone as a canonical timezone name, e.g. "America/Mexico_City".
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl LoginState {
    /// Create the cookie key from a string and set the default cookie duration.
    pub fn new(
        cookie_secret: &str,
        local_timezone: &str,
        db_connection: Arc<Mutex<Connection>>,
    ) -> Self {
        Self {
            cookie_key: create_cookie_key(cookie_secret),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            local_timezone: local_timezone.to_owned(),
            db_connection,
        }
    }
}

impl FromRef<AppState> for LoginState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LoginState> for Key {
    fn from_ref(state: &LoginState) -> Self {
        state.cookie_key.clone()
    }
}

/// Handler for log-in requests via the POST method.
///
/// On a successful log-in request, the auth cookie set and the client is redirected to
/// the page they originally asked for, or the dashboard.
/// Otherwise, the form is returned with an error message explaining the problem.
pub async fn post_log_in(
    State(state): State<LoginState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<LogInData>,
) -> Response {
    let redirect_url = parse_redirect_url(user_data.redirect_url.as_deref(), "log-in form");
    let redirect_url = redirect_url.as_deref();

    let email = parse_email(&user_data.email);
    let password_error = user_data
        .password
        .is_empty()
        .then(|| REQUIRED_MESSAGE.to_owned());

    let email = match (email, password_error) {
        (Ok(email), None) => email,
        (email, password) => {
            let errors = LogInErrors {
                email: email.err(),
                password,
                form: None,
            };
            return log_in_form(&user_data.email, &errors, redirect_url).into_response();
        }
    };

    let show_error = |message: &str| {
        let errors = LogInErrors {
            form: Some(message),
            ..Default::default()
        };
        log_in_form(&user_data.email, &errors, redirect_url).into_response()
    };

    let user: User = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return Error::DatabaseLockError.into_alert_response();
            }
        };

        match get_user_by_email(&email, &connection) {
            Ok(user) => user,
            Err(Error::NotFound) => {
                tracing::debug!("Log-in attempt for unregistered email {email}");
                return show_error(LOG_IN_FAILED_MESSAGE);
            }
            Err(error) => {
                tracing::error!("Unhandled error while verifying credentials: {error}");
                return show_error(INTERNAL_ERROR_MESSAGE);
            }
        }
    };

    match user.password_hash.verify(&user_data.password) {
        Ok(true) => {}
        Ok(false) => return show_error(LOG_IN_FAILED_MESSAGE),
        Err(error) => {
            tracing::error!("Unhandled error while verifying credentials: {error}");
            return show_error(INTERNAL_ERROR_MESSAGE);
        }
    }

    let cookie_duration = if user_data.remember_me.is_some() {
        REMEMBER_ME_COOKIE_DURATION
    } else {
        state.cookie_duration
    };

    let local_timezone = match get_local_offset(&state.local_timezone) {
        Some(offset) => offset,
        None => return Error::InvalidTimezoneError(state.local_timezone).into_alert_response(),
    };

    let redirect_url = redirect_url.unwrap_or(endpoints::DASHBOARD_VIEW);

    set_auth_cookie(jar.clone(), user.id, cookie_duration, local_timezone)
        .map(|updated_jar| {
            tracing::info!("User {} logged in", user.id);
            (
                StatusCode::SEE_OTHER,
                HxRedirect(redirect_url.to_owned()),
                updated_jar,
            )
        })
        .map_err(|err| {
            tracing::error!("Error setting auth cookie: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                HxRedirect(endpoints::INTERNAL_ERROR_VIEW.to_owned()),
                invalidate_auth_cookie(jar),
            )
        })
        .into_response()
}

#[derive(Deserialize)]
pub struct RedirectQuery {
    pub redirect_url: Option<String>,
}

/// The raw data entered by the user in the log-in form.
///
/// The password is stored as a plain string. There is no need for validation here since
/// it will be compared against the password in the database, which has been verified.
#[derive(Clone, Serialize, Deserialize)]
pub struct LogInData {
    /// Email address entered during log-in.
    #[serde(default)]
    pub email: String,

    /// Password entered during log-in.
    #[serde(default)]
    pub password: String,

    /// Whether to extend the initial auth cookie duration.
    ///
    /// This value comes from a checkbox, so it either has a string value or is not set
    /// (see the [MDN docs](https://developer.mozilla.org/en-US/docs/Web/HTML/Element/input/checkbox#value_2)).
    /// The `Some` variant should be interpreted as `true` irregardless of the
    /// string value, and the `None` variant should be interpreted as `false`.
    pub remember_me: Option<String>,

    /// Optional URL to redirect to after logging in.
    /// Only accepted from the log-in form submission.
    pub redirect_url: Option<String>,
}

#[cfg(test)]
mod log_in_page_tests {
    use std::iter::zip;

    use axum::{extract::Query, http::StatusCode};
    use axum_extra::extract::PrivateCookieJar;
    use scraper::Selector;

    use crate::{
        alert::Alert,
        app_state::create_cookie_key,
        endpoints,
        flash::set_flash,
        test_utils::{
            assert_content_type, assert_form_input, assert_form_submit_button,
            assert_hx_endpoint, assert_valid_html, must_get_form, parse_html_document,
        },
    };

    use super::{RedirectQuery, get_log_in_page};

    fn get_jar() -> PrivateCookieJar {
        PrivateCookieJar::new(create_cookie_key("log in"))
    }

    #[tokio::test]
    async fn log_in_page_displays_form() {
        let response =
            get_log_in_page(get_jar(), Query(RedirectQuery { redirect_url: None })).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_content_type(&response, "text/html; charset=utf-8");

        let document = parse_html_document(response).await;
        assert_valid_html(&document);

        let form = must_get_form(&document);
        assert_hx_endpoint(&form, endpoints::LOG_IN_API, "hx-post");
        assert_form_input(&form, "email", "email");
        assert_form_input(&form, "password", "password");
        assert_form_submit_button(&form);

        let links = form
            .select(&Selector::parse("a[href]").unwrap())
            .collect::<Vec<_>>();
        assert_eq!(links.len(), 2, "want 2 links, got {}", links.len());
        let want_endpoints = [endpoints::FORGOT_PASSWORD_VIEW, endpoints::REGISTER_VIEW];

        for (link, endpoint) in zip(links, want_endpoints) {
            assert_eq!(link.value().attr("href"), Some(endpoint));
        }
    }

    #[tokio::test]
    async fn log_in_page_keeps_safe_redirect_url() {
        let response = get_log_in_page(
            get_jar(),
            Query(RedirectQuery {
                redirect_url: Some(endpoints::EXPENSES_VIEW.to_owned()),
            }),
        )
        .await;

        let document = parse_html_document(response).await;
        let redirect_input = document
            .select(&Selector::parse("input[name=redirect_url]").unwrap())
            .next()
            .expect("want hidden redirect_url input");
        assert_eq!(
            redirect_input.value().attr("value"),
            Some(endpoints::EXPENSES_VIEW)
        );
    }

    #[tokio::test]
    async fn log_in_page_drops_external_redirect_url() {
        let response = get_log_in_page(
            get_jar(),
            Query(RedirectQuery {
                redirect_url: Some("https://example.com/phish".to_owned()),
            }),
        )
        .await;

        let document = parse_html_document(response).await;
        let redirect_inputs = document
            .select(&Selector::parse("input[name=redirect_url]").unwrap())
            .count();
        assert_eq!(redirect_inputs, 0);
    }

    #[tokio::test]
    async fn log_in_page_shows_flash_message() {
        let jar = set_flash(
            get_jar(),
            &Alert::SuccessSimple {
                message: "Account created".to_owned(),
            },
        )
        .unwrap();

        let response = get_log_in_page(jar, Query(RedirectQuery { redirect_url: None })).await;

        let document = parse_html_document(response).await;
        let alert_text = document
            .select(&Selector::parse("#alert-container").unwrap())
            .next()
            .unwrap()
            .text()
            .collect::<String>();
        assert!(alert_text.contains("Account created"));
    }
}
