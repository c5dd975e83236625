//! The registration page and the endpoint that creates new accounts.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use email_address::EmailAddress;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error, PasswordHash, ValidatedPassword,
    alert::Alert,
    auth::{NewUser, create_user},
    endpoints,
    flash::set_flash,
    html::{
        FORM_ERROR_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, InputKind, LINK_STYLE, base,
        form_input, log_in_register, password_input, submit_button,
    },
    validation::{
        REQUIRED_MESSAGE, is_name, length_between, number_in_range, parse_email, parse_integer,
        required,
    },
};

/// The flash message shown on the log-in page after registering.
pub const REGISTRATION_SUCCESS_MESSAGE: &str =
    "Account created successfully. You can now log in to Widata.";

pub const DUPLICATE_EMAIL_MESSAGE: &str = "This email is already registered. Please use another.";
pub const PASSWORDS_DO_NOT_MATCH_MESSAGE: &str = "Passwords must match.";
pub const INVALID_NAME_MESSAGE: &str = "Name can only contain letters and spaces.";
pub const INVALID_PHONE_MESSAGE: &str = "Phone number must be exactly 10 digits.";

const MIN_AGE: i64 = 18;
const MAX_AGE: i64 = 120;

/// The raw data entered by the user in the registration form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub age: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

/// The error message for each field of a [RegisterForm], if any.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegisterFormErrors {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub age: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
}

/// The registration details once every field has passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidRegistration {
    pub first_name: String,
    pub last_name: String,
    pub age: u8,
    pub phone: String,
    pub email: EmailAddress,
    pub password: ValidatedPassword,
}

fn validate_name(value: &str, max_length: usize) -> Result<String, String> {
    let value = required(value)?;
    length_between(value, 2, max_length)?;

    if !is_name(value) {
        return Err(INVALID_NAME_MESSAGE.to_owned());
    }

    Ok(value.to_owned())
}

fn validate_age(value: &str) -> Result<u8, String> {
    let age = parse_integer(value).and_then(|age| number_in_range(age, MIN_AGE, Some(MAX_AGE)))?;

    u8::try_from(age).map_err(|_| format!("Number must be between {MIN_AGE} and {MAX_AGE}."))
}

fn validate_phone(value: &str) -> Result<String, String> {
    let value = required(value)?;

    if value.len() == 10 && value.chars().all(|c| c.is_ascii_digit()) {
        Ok(value.to_owned())
    } else {
        Err(INVALID_PHONE_MESSAGE.to_owned())
    }
}

fn validate_password(value: &str) -> Result<ValidatedPassword, String> {
    if value.is_empty() {
        return Err(REQUIRED_MESSAGE.to_owned());
    }

    ValidatedPassword::new(value).map_err(|error| match error {
        Error::TooWeak(feedback) if feedback.is_empty() => {
            "Password is too weak. Try a longer password with uncommon words.".to_owned()
        }
        Error::TooWeak(feedback) => format!("Password is too weak: {feedback}"),
        Error::PasswordLength { min, max } => {
            format!("Password must be between {min} and {max} characters.")
        }
        error => error.to_string(),
    })
}

fn validate_confirm_password(password: &str, confirm_password: &str) -> Result<(), String> {
    if confirm_password.is_empty() {
        return Err(REQUIRED_MESSAGE.to_owned());
    }

    if password != confirm_password {
        return Err(PASSWORDS_DO_NOT_MATCH_MESSAGE.to_owned());
    }

    Ok(())
}

impl RegisterForm {
    /// Check every field and collect all of the errors at once.
    ///
    /// Whether the email is already registered is only known once the user is inserted,
    /// see [register_user].
    pub fn validate(&self) -> Result<ValidRegistration, RegisterFormErrors> {
        let first_name = validate_name(&self.first_name, 50);
        let last_name = validate_name(&self.last_name, 100);
        let age = validate_age(&self.age);
        let phone = validate_phone(&self.phone);
        let email = parse_email(&self.email);
        let password = validate_password(&self.password);
        let confirm_password = validate_confirm_password(&self.password, &self.confirm_password);

        match (
            first_name,
            last_name,
            age,
            phone,
            email,
            password,
            confirm_password,
        ) {
            (
                Ok(first_name),
                Ok(last_name),
                Ok(age),
                Ok(phone),
                Ok(email),
                Ok(password),
                Ok(()),
            ) => Ok(ValidRegistration {
                first_name,
                last_name,
                age,
                phone,
                email,
                password,
            }),
            (first_name, last_name, age, phone, email, password, confirm_password) => {
                Err(RegisterFormErrors {
                    first_name: first_name.err(),
                    last_name: last_name.err(),
                    age: age.err(),
                    phone: phone.err(),
                    email: email.err(),
                    password: password.err(),
                    confirm_password: confirm_password.err(),
                })
            }
        }
    }
}

fn confirm_password_input(error_message: Option<&str>) -> Markup {
    html! {
        div
        {
            label
                for="confirm-password"
                class=(FORM_LABEL_STYLE)
            {
                "Confirm Password"
            }

            input
                type="password"
                name="confirm_password"
                id="confirm-password"
                placeholder="••••••••"
                class=(FORM_TEXT_INPUT_STYLE)
                required
                minlength=(ValidatedPassword::MIN_LENGTH)
                autofocus[error_message.is_some()]
            ;

            @if let Some(error_message) = error_message
            {
                p class=(FORM_ERROR_STYLE) { (error_message) }
            }
        }
    }
}

/// Render the registration form, filled in with `form` except for the passwords.
fn registration_form(form: &RegisterForm, errors: &RegisterFormErrors) -> Markup {
    html! {
        form
            hx-post=(endpoints::USERS)
            hx-target="this"
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            hx-indicator="#indicator"
            hx-disabled-elt="#submit-button"
            class="space-y-4 md:space-y-6"
        {
            div class="grid grid-cols-1 sm:grid-cols-2 gap-4"
            {
                (form_input("first_name", "First name", InputKind::Text, &form.first_name, errors.first_name.as_deref()))
                (form_input("last_name", "Last name", InputKind::Text, &form.last_name, errors.last_name.as_deref()))
            }

            div class="grid grid-cols-1 sm:grid-cols-2 gap-4"
            {
                (form_input(
                    "age",
                    "Age",
                    InputKind::Number { min: "18", step: "1" },
                    &form.age,
                    errors.age.as_deref(),
                ))
                (form_input("phone", "Phone", InputKind::Tel, &form.phone, errors.phone.as_deref()))
            }

            (form_input("email", "Email", InputKind::Email, &form.email, errors.email.as_deref()))
            (password_input("", ValidatedPassword::MIN_LENGTH as u8, errors.password.as_deref()))
            (confirm_password_input(errors.confirm_password.as_deref()))

            (submit_button("Create account"))

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Already have an account? "
                a href=(endpoints::LOG_IN_VIEW) tabindex="0" class=(LINK_STYLE)
                {
                  "Log in here"
                }
            }
        }
    }
}

/// Display the registration page.
pub async fn get_register_page() -> Response {
    let registration_form =
        registration_form(&RegisterForm::default(), &RegisterFormErrors::default());
    let content = log_in_register("Create your account", &registration_form);
    base("Register", &[], &content).into_response()
}

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The cost used when hashing new passwords.
    pub hash_cost: u32,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            hash_cost: PasswordHash::DEFAULT_COST,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<RegistrationState> for Key {
    fn from_ref(state: &RegistrationState) -> Self {
        state.cookie_key.clone()
    }
}

/// Create a new user from the registration form.
///
/// On success the client is sent to the log-in page with a flash message.
/// Otherwise the form is returned with an error message under each invalid field.
pub async fn register_user(
    State(state): State<RegistrationState>,
    jar: PrivateCookieJar,
    Form(form): Form<RegisterForm>,
) -> Response {
    let registration = match form.validate() {
        Ok(registration) => registration,
        Err(errors) => return registration_form(&form, &errors).into_response(),
    };

    let password_hash = match PasswordHash::new(registration.password, state.hash_cost) {
        Ok(hash) => hash,
        Err(error) => {
            tracing::error!("an error occurred while hashing a password: {error}");
            return error.into_alert_response();
        }
    };

    let new_user = NewUser {
        first_name: registration.first_name,
        last_name: registration.last_name,
        age: registration.age,
        phone: registration.phone,
        email: registration.email,
        password_hash,
    };

    let result = match state.db_connection.lock() {
        Ok(connection) => create_user(new_user, &connection),
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let user = match result {
        Ok(user) => user,
        Err(Error::DuplicateEmail) => {
            let errors = RegisterFormErrors {
                email: Some(DUPLICATE_EMAIL_MESSAGE.to_owned()),
                ..Default::default()
            };
            return registration_form(&form, &errors).into_response();
        }
        Err(error) => {
            tracing::error!("An unhandled error occurred while inserting a new user: {error}");
            return error.into_alert_response();
        }
    };

    tracing::info!("Registered user {}", user.id);

    let alert = Alert::SuccessSimple {
        message: REGISTRATION_SUCCESS_MESSAGE.to_owned(),
    };

    match set_flash(jar, &alert) {
        Ok(jar) => (
            jar,
            HxRedirect(endpoints::LOG_IN_VIEW.to_owned()),
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
mod get_register_page_tests {
    use axum::http::StatusCode;
    use scraper::Selector;

    use crate::{
        endpoints,
        test_utils::{
            assert_content_type, assert_form_input, assert_hx_endpoint, assert_valid_html,
            must_get_form, parse_html_document,
        },
    };

    use super::get_register_page;

    #[tokio::test]
    async fn render_register_page() {
        let response = get_register_page().await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_content_type(&response, "text/html; charset=utf-8");

        let document = parse_html_document(response).await;
        assert_valid_html(&document);

        let title = document
            .select(&Selector::parse("h1").unwrap())
            .next()
            .unwrap()
            .text()
            .collect::<String>();
        assert_eq!(title.trim(), "Create your account");

        let form = must_get_form(&document);
        assert_hx_endpoint(&form, endpoints::USERS, "hx-post");
        assert_form_input(&form, "first_name", "text");
        assert_form_input(&form, "last_name", "text");
        assert_form_input(&form, "age", "number");
        assert_form_input(&form, "phone", "tel");
        assert_form_input(&form, "email", "email");
        assert_form_input(&form, "password", "password");
        assert_form_input(&form, "confirm_password", "password");

        let links = form
            .select(&Selector::parse("a[href]").unwrap())
            .filter_map(|link| link.value().attr("href"))
            .collect::<Vec<_>>();
        assert_eq!(links, vec![endpoints::LOG_IN_VIEW]);
    }
}
