//! Alert system for displaying success and error messages to users.
//!
//! Alerts are rendered into the `#alert-container` element of the base page,
//! either as the target of an HTMX error response or inline from a flash message.

use axum::response::{Html, IntoResponse, Response};
use maud::{Markup, html};
use serde::{Deserialize, Serialize};

/// A message to show the user after an action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Alert {
    /// The action succeeded, with extra details.
    Success { message: String, details: String },
    /// The action succeeded.
    SuccessSimple { message: String },
    /// The action failed, with details explaining how to fix it.
    Error { message: String, details: String },
    /// The action failed.
    ErrorSimple { message: String },
}

impl Alert {
    fn is_success(&self) -> bool {
        matches!(self, Alert::Success { .. } | Alert::SuccessSimple { .. })
    }

    /// The headline of the alert.
    pub fn message(&self) -> &str {
        match self {
            Alert::Success { message, .. }
            | Alert::SuccessSimple { message }
            | Alert::Error { message, .. }
            | Alert::ErrorSimple { message } => message,
        }
    }

    fn details(&self) -> Option<&str> {
        match self {
            Alert::Success { details, .. } | Alert::Error { details, .. } => Some(details),
            Alert::SuccessSimple { .. } | Alert::ErrorSimple { .. } => None,
        }
    }

    /// Render the alert as a dismissable box.
    pub fn view(&self) -> Markup {
        let style = if self.is_success() {
            "flex items-start justify-between gap-3 p-4 mb-4 text-sm rounded-lg \
            text-green-800 bg-green-50 border border-green-300 \
            dark:bg-gray-800 dark:text-green-400 dark:border-green-800"
        } else {
            "flex items-start justify-between gap-3 p-4 mb-4 text-sm rounded-lg \
            text-red-800 bg-red-50 border border-red-300 \
            dark:bg-gray-800 dark:text-red-400 dark:border-red-800"
        };
        let role = if self.is_success() { "status" } else { "alert" };

        html! {
            div class=(style) role=(role) data-alert="true"
            {
                div
                {
                    p class="font-medium" { (self.message()) }

                    @if let Some(details) = self.details() {
                        @if !details.is_empty() {
                            p class="mt-1" { (details) }
                        }
                    }
                }

                button
                    type="button"
                    aria-label="Dismiss"
                    class="font-bold"
                    onclick="this.closest('[data-alert]').remove()"
                {
                    "×"
                }
            }
        }
    }

    /// Render the alert as a fragment for the alert container.
    pub fn into_html(self) -> Html<String> {
        Html(self.view().into_string())
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        self.into_html().into_response()
    }
}
