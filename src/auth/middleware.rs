//! Middleware that admits logged in users, keeps their session alive and sends everyone else to
//! the log-in page.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{StatusCode, header::SET_COOKIE},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use time::Duration;

use crate::{
    AppState, Error,
    auth::{
        UserID,
        cookie::{extend_auth_cookie_duration_if_needed, get_token_from_cookies},
        get_user_by_id, invalidate_auth_cookie,
        redirect::{build_log_in_redirect_url, build_log_in_redirect_url_from_target},
    },
    endpoints,
    timezone::get_local_offset,
};

/// The state needed for the auth middleware
#[derive(Debug, Clone)]
pub struct AuthState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// How long a session lasts after the user's most recent request.
    pub cookie_duration: Duration,
    /// The local timezone as a canonical timezone name, e.g. "America/Mexico_City".
    pub local_timezone: String,
    /// Used to check the user in the auth cookie is still registered.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

/// Get the ID of the registered user the auth cookie in `jar` belongs to.
///
/// # Errors
///
/// Returns [Error::NotFound] if the token is valid but its user no longer exists, otherwise the
/// errors of [get_token_from_cookies] or [Error::DatabaseLockError].
fn find_session_user(
    jar: &PrivateCookieJar,
    db_connection: &Mutex<Connection>,
) -> Result<UserID, Error> {
    let token = get_token_from_cookies(jar)?;
    let connection = db_connection.lock().map_err(|_| Error::DatabaseLockError)?;

    get_user_by_id(token.user_id, &connection).map(|user| user.id)
}

/// The log-in page URL that returns the user to what they requested, or to the dashboard if the
/// request does not say where they came from.
fn log_in_url_for(request: &Request) -> String {
    build_log_in_redirect_url(request).unwrap_or_else(|| {
        tracing::warn!(
            "Could not work out where to return {} to after log-in. Falling back to dashboard.",
            request.uri().path()
        );

        build_log_in_redirect_url_from_target(endpoints::DASHBOARD_VIEW)
            .unwrap_or_else(|| endpoints::LOG_IN_VIEW.to_owned())
    })
}

/// Copy the `Set-Cookie` headers of `jar` onto `response`.
fn append_cookies(response: Response, jar: PrivateCookieJar) -> Response {
    let (mut parts, body) = response.into_parts();

    for value in jar.into_response().headers().get_all(SET_COOKIE) {
        parts.headers.append(SET_COOKIE, value.to_owned());
    }

    Response::from_parts(parts, body)
}

async fn guard(
    state: AuthState,
    request: Request,
    next: Next,
    redirect: fn(String) -> Response,
) -> Response {
    let log_in_url = log_in_url_for(&request);
    let Some(local_offset) = get_local_offset(&state.local_timezone) else {
        tracing::error!(
            "Unknown timezone {:?}. Redirecting to log in page.",
            state.local_timezone
        );
        return redirect(log_in_url);
    };

    let (mut parts, body) = request.into_parts();
    let jar = match PrivateCookieJar::from_request_parts(&mut parts, &state).await {
        Ok(jar) => jar,
        Err(error) => {
            tracing::error!("Error getting cookie jar: {error:?}. Redirecting to log in page.");
            return redirect(log_in_url);
        }
    };

    let user_id = match find_session_user(&jar, &state.db_connection) {
        Ok(user_id) => user_id,
        Err(Error::NotFound) => {
            tracing::warn!("Session belongs to a user that no longer exists. Logging out.");
            return (invalidate_auth_cookie(jar), redirect(log_in_url)).into_response();
        }
        Err(error) => {
            tracing::debug!("Rejected request to {}: {error}", parts.uri.path());
            return redirect(log_in_url);
        }
    };

    parts.extensions.insert(user_id);
    let response = next.run(Request::from_parts(parts, body)).await;

    let jar =
        extend_auth_cookie_duration_if_needed(jar.clone(), state.cookie_duration, local_offset)
            .unwrap_or_else(|error| {
                tracing::error!(
                    "Error extending cookie duration: {error:?}. Rolling back cookie jar."
                );
                jar
            });

    append_cookies(response, jar)
}

/// Middleware that only lets requests with a valid auth cookie through to page handlers.
///
/// Other requests are redirected to the log-in page, which sends the user back to the page they
/// asked for once they log in. Each successful request pushes the session expiry back.
///
/// **Note**: Route handlers can use the function argument `Extension(user_id): Extension<UserID>` to receive the user ID.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    guard(state, request, next, |log_in_url| {
        Redirect::to(&log_in_url).into_response()
    })
    .await
}

/// The same as [auth_guard], but redirects with the `HX-Redirect` header so HTMX requests
/// navigate the whole page instead of swapping the log-in page into a form.
pub async fn auth_guard_hx(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Response {
    guard(state, request, next, |log_in_url| {
        (HxRedirect(log_in_url), StatusCode::OK).into_response()
    })
    .await
}

/// Middleware function that sends users who are already logged in to the dashboard.
///
/// Used for the log-in and registration pages, which make no sense for an authenticated user.
pub async fn redirect_authenticated_user(
    State(state): State<AuthState>,
    jar: PrivateCookieJar,
    request: Request,
    next: Next,
) -> Response {
    match find_session_user(&jar, &state.db_connection) {
        Ok(user_id) => {
            tracing::debug!("User {user_id} is already logged in, redirecting to the dashboard.");
            Redirect::to(endpoints::DASHBOARD_VIEW).into_response()
        }
        Err(_) => next.run(request).await,
    }
}

#[cfg(test)]
mod auth_guard_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension, Router,
        extract::Path,
        middleware,
        routing::{get, post},
    };
    use axum_extra::extract::{
        PrivateCookieJar,
        cookie::{Cookie, SameSite},
    };
    use axum_test::{TestResponse, TestServer};
    use rusqlite::Connection;
    use time::{Duration, OffsetDateTime, UtcOffset};

    use crate::{
        Error,
        app_state::create_cookie_key,
        auth::{
            AuthState, COOKIE_TOKEN, DEFAULT_COOKIE_DURATION, UserID, auth_guard, auth_guard_hx,
            create_user, redirect_authenticated_user, set_auth_cookie, test_user,
        },
        db::initialize,
        endpoints::{self, format_endpoint},
    };

    async fn whoami(Extension(user_id): Extension<UserID>) -> String {
        user_id.to_string()
    }

    /// Logs in as any user ID, registered or not, for a few seconds.
    async fn stub_log_in_route(
        Path(user_id): Path<i64>,
        jar: PrivateCookieJar,
    ) -> Result<PrivateCookieJar, Error> {
        set_auth_cookie(jar, UserID::new(user_id), SHORT_SESSION, UtcOffset::UTC)
    }

    const SHORT_SESSION: Duration = Duration::seconds(5);
    const TEST_LOG_IN_ROUTE_PATH: &str = "/log_in/{user_id}";
    const TEST_PROTECTED_ROUTE: &str = "/protected";
    const TEST_API_ROUTE: &str = "/api/protected";
    const TEST_GUEST_ROUTE: &str = "/register";

    fn get_state() -> (AuthState, UserID) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = create_user(test_user("ana@example.com"), &connection).unwrap();

        let state = AuthState {
            cookie_key: create_cookie_key("nafstenoas"),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            local_timezone: "Etc/UTC".to_owned(),
            db_connection: Arc::new(Mutex::new(connection)),
        };

        (state, user.id)
    }

    fn get_test_server(state: AuthState) -> TestServer {
        let guest_routes = Router::new()
            .route(TEST_GUEST_ROUTE, get(|| async { "Create your account" }))
            .route_layer(middleware::from_fn_with_state(
                state.clone(),
                redirect_authenticated_user,
            ));

        let hx_routes = Router::new()
            .route(TEST_API_ROUTE, post(whoami))
            .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard_hx));

        let app = Router::new()
            .route(TEST_PROTECTED_ROUTE, get(whoami))
            .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard))
            .route(TEST_LOG_IN_ROUTE_PATH, post(stub_log_in_route))
            .merge(guest_routes)
            .merge(hx_routes)
            .with_state(state);

        TestServer::try_new(app).expect("Could not create test server.")
    }

    async fn log_in(server: &TestServer, user_id: UserID) -> Cookie<'static> {
        let response = server
            .post(&format_endpoint(TEST_LOG_IN_ROUTE_PATH, user_id.as_i64()))
            .await;
        response.assert_status_ok();

        response.cookie(COOKIE_TOKEN)
    }

    #[track_caller]
    fn assert_redirects_to_log_in(response: &TestResponse, header: &str, from: &str) {
        let expected_query = serde_urlencoded::to_string([("redirect_url", from)]).unwrap();
        let expected_location = format!("{}?{}", endpoints::LOG_IN_VIEW, expected_query);

        assert_eq!(response.header(header), expected_location);
    }

    #[track_caller]
    fn assert_date_time_close(left: OffsetDateTime, right: OffsetDateTime) {
        assert!(
            (left - right).abs() < Duration::seconds(1),
            "got date time {left:?}, want {right:?}"
        );
    }

    #[tokio::test]
    async fn passes_user_id_to_handler() {
        let (state, user_id) = get_state();
        let server = get_test_server(state);
        let token_cookie = log_in(&server, user_id).await;

        let response = server
            .get(TEST_PROTECTED_ROUTE)
            .add_cookie(token_cookie)
            .await;

        response.assert_status_ok();
        response.assert_text(user_id.to_string());
    }

    #[tokio::test]
    async fn extends_session_on_each_request() {
        let (state, user_id) = get_state();
        let server = get_test_server(state);
        let token_cookie = log_in(&server, user_id).await;
        let logged_in_at = OffsetDateTime::now_utc();
        assert_date_time_close(
            token_cookie.expires_datetime().unwrap(),
            logged_in_at + SHORT_SESSION,
        );

        let response = server
            .get(TEST_PROTECTED_ROUTE)
            .add_cookie(token_cookie)
            .await;

        let auth_cookie = response.cookie(COOKIE_TOKEN);
        assert_date_time_close(
            auth_cookie.expires_datetime().unwrap(),
            logged_in_at + DEFAULT_COOKIE_DURATION,
        );
        assert_eq!(auth_cookie.secure(), Some(true));
        assert_eq!(auth_cookie.http_only(), Some(true));
        assert_eq!(auth_cookie.same_site(), Some(SameSite::Strict));
    }

    #[tokio::test]
    async fn missing_cookie_redirects_to_log_in() {
        let (state, _) = get_state();
        let server = get_test_server(state);

        let response = server.get(TEST_PROTECTED_ROUTE).await;

        response.assert_status_see_other();
        assert_redirects_to_log_in(&response, "location", TEST_PROTECTED_ROUTE);
    }

    #[tokio::test]
    async fn tampered_cookie_redirects_to_log_in() {
        let (state, _) = get_state();
        let server = get_test_server(state);

        let response = server
            .get(TEST_PROTECTED_ROUTE)
            .add_cookie(Cookie::build((COOKIE_TOKEN, "FOOBAR")).build())
            .await;

        response.assert_status_see_other();
        assert_redirects_to_log_in(&response, "location", TEST_PROTECTED_ROUTE);
    }

    #[tokio::test]
    async fn expired_cookie_redirects_to_log_in() {
        let (state, user_id) = get_state();
        let server = get_test_server(state);
        let mut token_cookie = log_in(&server, user_id).await;
        token_cookie.set_expires(OffsetDateTime::UNIX_EPOCH);

        let response = server
            .get(TEST_PROTECTED_ROUTE)
            .add_cookie(token_cookie)
            .await;

        response.assert_status_see_other();
        assert_redirects_to_log_in(&response, "location", TEST_PROTECTED_ROUTE);
    }

    #[tokio::test]
    async fn deleted_user_is_logged_out() {
        let (state, user_id) = get_state();
        let server = get_test_server(state.clone());
        let token_cookie = log_in(&server, user_id).await;
        state
            .db_connection
            .lock()
            .unwrap()
            .execute("DELETE FROM user WHERE id = ?1", (user_id.as_i64(),))
            .unwrap();

        let response = server
            .get(TEST_PROTECTED_ROUTE)
            .add_cookie(token_cookie)
            .await;

        response.assert_status_see_other();
        assert_redirects_to_log_in(&response, "location", TEST_PROTECTED_ROUTE);
        let cleared_cookie = response.cookie(COOKIE_TOKEN);
        assert_eq!(cleared_cookie.max_age(), Some(Duration::ZERO));
    }

    #[tokio::test]
    async fn htmx_request_is_sent_back_to_current_page() {
        let (state, _) = get_state();
        let server = get_test_server(state);
        let current_url = "/expenses?category=ant";

        let response = server
            .post(TEST_API_ROUTE)
            .add_header("HX-Request", "true")
            .add_header("HX-Current-URL", current_url)
            .await;

        response.assert_status_ok();
        assert_redirects_to_log_in(&response, "hx-redirect", current_url);
    }

    #[tokio::test]
    async fn guest_page_is_shown_to_anonymous_users() {
        let (state, _) = get_state();
        let server = get_test_server(state);

        server.get(TEST_GUEST_ROUTE).await.assert_status_ok();
    }

    #[tokio::test]
    async fn guest_page_redirects_logged_in_users_to_dashboard() {
        let (state, user_id) = get_state();
        let server = get_test_server(state);
        let token_cookie = log_in(&server, user_id).await;

        let response = server
            .get(TEST_GUEST_ROUTE)
            .add_cookie(token_cookie)
            .await;

        response.assert_status_see_other();
        assert_eq!(response.header("location"), endpoints::DASHBOARD_VIEW);
    }

    #[tokio::test]
    async fn guest_page_is_shown_when_session_user_is_unknown() {
        let (state, _) = get_state();
        let server = get_test_server(state);
        let token_cookie = log_in(&server, UserID::new(999)).await;

        let response = server
            .get(TEST_GUEST_ROUTE)
            .add_cookie(token_cookie)
            .await;

        response.assert_status_ok();
    }
}
