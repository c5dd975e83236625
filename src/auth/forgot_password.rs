use axum::response::{IntoResponse, Response};
use maud::{Markup, html};

use crate::{
    endpoints,
    html::{LINK_STYLE, base, log_in_register},
};

fn forgot_password_view() -> Markup {
    let instructions = html! {
        div class="space-y-4 text-gray-900 dark:text-white"
        {
            p class="text-justify"
            {
                "Widata does not send emails, so passwords are reset by whoever runs the server. "
                "Ask them to run the "
                code { "reset_password" }
                " program next to the server, pointing it at the database file and your email address:"
            }

            pre class="p-2 overflow-x-auto text-sm rounded bg-gray-100 dark:bg-gray-700"
            {
                "reset_password --db-path widata.db --email you@example.com"
            }

            p class="text-sm"
            {
                "Remembered it? "
                a href=(endpoints::LOG_IN_VIEW) class=(LINK_STYLE) { "Log in" }
            }
        }
    };

    let content = log_in_register("Forgot your password?", &instructions);

    base("Forgot Password", &[], &content)
}

/// Renders a page describing how the user's password can be reset.
pub async fn get_forgot_password_page() -> Response {
    forgot_password_view().into_response()
}
