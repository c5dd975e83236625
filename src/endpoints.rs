//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/debts/{debt_id}', use [format_endpoint].

/// The public home page.
pub const ROOT: &str = "/";
/// The financial education page.
pub const EDUCATION_VIEW: &str = "/education";
/// The landing page for logged in users with the debt form and payoff plan.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page for recording and reviewing expenses.
pub const EXPENSES_VIEW: &str = "/expenses";
/// The page showing the credit utilization score.
pub const ANALYSIS_VIEW: &str = "/analysis";
/// The page for editing the user's financial profile.
pub const PROFILE_VIEW: &str = "/profile";
/// The route for getting the registration page.
pub const REGISTER_VIEW: &str = "/register";
/// The route for getting the log in page.
pub const LOG_IN_VIEW: &str = "/log_in";
/// The route for instructions for resetting the user's password.
pub const FORGOT_PASSWORD_VIEW: &str = "/forgot_password";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route for logging in a user.
pub const LOG_IN_API: &str = "/api/log_in";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/log_out";
/// The route to register users.
pub const USERS: &str = "/api/users";
/// The route to create a debt.
pub const DEBTS_API: &str = "/api/debts";
/// The route to delete a debt.
pub const DELETE_DEBT: &str = "/api/debts/{debt_id}";
/// The route to create an expense.
pub const EXPENSES_API: &str = "/api/expenses";
/// The route to delete an expense.
pub const DELETE_EXPENSE: &str = "/api/expenses/{expense_id}";
/// The route to update the financial profile.
pub const PROFILE_API: &str = "/api/profile";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/users/{user_id}', '{user_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|offset| param_start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
