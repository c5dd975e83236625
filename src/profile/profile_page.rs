//! The profile page, where users set their income, fixed expenses and payoff strategy.

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
    auth::{FinancialProfile, User, UserID, get_user_by_id},
    endpoints,
    flash::take_flash,
    html::{CARD_STYLE, PAGE_CONTAINER_STYLE, base_with_alert},
    navigation::NavBar,
    profile::{ProfileForm, ProfileFormErrors, profile_form_view},
};

/// The state needed for the profile page.
#[derive(Debug, Clone)]
pub struct ProfilePageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ProfilePageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

pub async fn get_profile_page(
    State(state): State<ProfilePageState>,
    Extension(user_id): Extension<UserID>,
    jar: PrivateCookieJar,
) -> Result<Response, Error> {
    let user = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_user_by_id(user_id, &connection)
            .inspect_err(|error| tracing::error!("Could not get user {user_id}: {error}"))?
    };

    let (jar, flash) = take_flash(jar);

    Ok((jar, profile_view(&user, flash.as_ref())).into_response())
}

fn profile_view(user: &User, flash: Option<&Alert>) -> Markup {
    let nav_bar = NavBar::new(endpoints::PROFILE_VIEW).into_html();
    let form = ProfileForm::from_profile(FinancialProfile {
        monthly_income: user.monthly_income,
        fixed_expenses: user.fixed_expenses,
        preferred_strategy: user.preferred_strategy,
    });

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-xl space-y-6"
            {
                section id="account-details" class=(CARD_STYLE)
                {
                    h1 class="text-2xl font-bold mb-2" { (user.first_name) " " (user.last_name) }
                    p { (user.email.as_str()) }
                    p { "Phone: " (user.phone) }
                    p { "Age: " (user.age) }
                }

                section class=(CARD_STYLE)
                {
                    h2 class="text-lg font-semibold mb-4" { "Financial profile" }
                    p class="text-sm text-gray-600 dark:text-gray-400 mb-4"
                    {
                        "Your income and fixed expenses are used to work out how much you can put "
                        "towards your debts each month."
                    }
                    (profile_form_view(&form, &ProfileFormErrors::default()))
                }
            }
        }
    };

    base_with_alert("Profile", &[], &content, flash)
}

#[cfg(test)]
mod profile_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use axum_extra::extract::PrivateCookieJar;
    use rusqlite::Connection;
    use scraper::Selector;

    use crate::{
        app_state::create_cookie_key,
        auth::{create_user, test_user},
        db::initialize,
        endpoints,
        test_utils::{
            assert_form_input_with_value, assert_hx_endpoint, assert_valid_html, must_get_form,
            parse_html_document,
        },
    };

    use super::{ProfilePageState, get_profile_page};

    #[tokio::test]
    async fn shows_user_details_and_form() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = create_user(test_user("ana@example.com"), &connection).unwrap();
        let state = ProfilePageState {
            db_connection: Arc::new(Mutex::new(connection)),
        };
        let jar = PrivateCookieJar::new(create_cookie_key("profile"));

        let response = get_profile_page(State(state), Extension(user.id), jar)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let details = html
            .select(&Selector::parse("#account-details").unwrap())
            .next()
            .unwrap()
            .text()
            .collect::<String>();
        assert!(details.contains("ana@example.com"));

        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::PROFILE_API, "hx-post");
        assert_form_input_with_value(&form, "monthly_income", "number", "0");
    }
}
