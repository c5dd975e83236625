//! The landing page.

use axum::response::{IntoResponse, Response};
use maud::{Markup, html};

use crate::{
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, CARD_STYLE, LINK_STYLE, base},
    navigation::public_header,
};

struct Pillar {
    title: &'static str,
    description: &'static str,
    url: &'static str,
}

const PILLARS: [Pillar; 3] = [
    Pillar {
        title: "Pillar 1: Strategies",
        description: "Register your credit cards and loans and get a plan that pays off the \
            most expensive debt first.",
        url: endpoints::DASHBOARD_VIEW,
    },
    Pillar {
        title: "Pillar 2: Leaks",
        description: "Record your expenses and find the small purchases that quietly drain \
            your wallet.",
        url: endpoints::EXPENSES_VIEW,
    },
    Pillar {
        title: "Pillar 3: Score",
        description: "See how much of your credit you are using and what that means for your \
            credit score.",
        url: endpoints::ANALYSIS_VIEW,
    },
];

pub async fn get_home_page() -> Response {
    home_view().into_response()
}

fn home_view() -> Markup {
    let content = html! {
        (public_header(endpoints::ROOT))

        main class="flex flex-col items-center px-6 py-12 mx-auto max-w-screen-lg space-y-10"
        {
            section class="text-center space-y-4"
            {
                h1 class="text-4xl font-extrabold tracking-tight text-gray-900 dark:text-white md:text-5xl"
                {
                    "Take back control of your money"
                }
                p class="text-lg text-gray-600 dark:text-gray-400"
                {
                    "Widata helps you get out of debt, plug the leaks in your budget and understand your credit."
                }

                div class="flex justify-center gap-4"
                {
                    a href=(endpoints::REGISTER_VIEW) class=(BUTTON_PRIMARY_STYLE) { "Create an account" }
                }

                p class="text-sm"
                {
                    "Already have an account? "
                    a href=(endpoints::LOG_IN_VIEW) class=(LINK_STYLE) { "Log in" }
                }
            }

            section id="pillars" class="grid grid-cols-1 md:grid-cols-3 gap-6 w-full"
            {
                @for pillar in &PILLARS {
                    a href=(pillar.url) class=(CARD_STYLE)
                    {
                        h2 class="text-xl font-bold mb-2" { (pillar.title) }
                        p class="text-gray-600 dark:text-gray-400" { (pillar.description) }
                    }
                }
            }
        }
    };

    base("Home", &[], &content)
}
