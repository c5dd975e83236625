//! The financial academy: short lessons on the ideas behind each part of the app.

use axum::response::{IntoResponse, Response};
use maud::{Markup, html};

use crate::{
    endpoints,
    html::{CARD_STYLE, LINK_STYLE, base},
    navigation::public_header,
};

struct Lesson {
    id: &'static str,
    title: &'static str,
    paragraphs: &'static [&'static str],
    link: (&'static str, &'static str),
}

const LESSONS: [Lesson; 4] = [
    Lesson {
        id: "avalanche",
        title: "The avalanche method",
        paragraphs: &[
            "Pay the minimum on every debt, then put every extra peso towards the debt with the \
            highest interest rate. When it is paid off, move on to the next highest.",
            "This is the order that costs you the least interest overall, which is why Widata \
            uses it for your payment plan by default.",
        ],
        link: (endpoints::DASHBOARD_VIEW, "Build your payment plan"),
    },
    Lesson {
        id: "snowball",
        title: "The snowball method",
        paragraphs: &[
            "Pay off the smallest balance first. You may pay a little more interest, but closing \
            accounts quickly keeps many people motivated.",
            "You can switch your plan to this method on your profile.",
        ],
        link: (endpoints::PROFILE_VIEW, "Choose your strategy"),
    },
    Lesson {
        id: "ant-expenses",
        title: "Ant expenses",
        paragraphs: &[
            "Ant expenses are small purchases you barely notice: a coffee, a snack, an app \
            subscription. On their own they seem harmless, but over a month they can add up to \
            a large share of your income.",
            "Recording them is the first step to cutting them back.",
        ],
        link: (endpoints::EXPENSES_VIEW, "Track your expenses"),
    },
    Lesson {
        id: "credit-utilization",
        title: "Credit utilization",
        paragraphs: &[
            "Credit utilization is how much you owe compared to the total limit of your credit \
            cards and loans. Lenders see high utilization as a sign of risk.",
            "Keeping it below 30% is a good rule of thumb. Above 50%, and especially above 80%, \
            your score suffers.",
        ],
        link: (endpoints::ANALYSIS_VIEW, "Check your utilization"),
    },
];

pub async fn get_education_page() -> Response {
    education_view().into_response()
}

fn education_view() -> Markup {
    let content = html! {
        (public_header(endpoints::EDUCATION_VIEW))

        main class="flex flex-col items-center px-6 py-8 mx-auto max-w-screen-md space-y-6"
        {
            header class="text-center"
            {
                h1 class="text-3xl font-bold text-gray-900 dark:text-white" { "Financial Academy" }
                p class="text-gray-600 dark:text-gray-400"
                {
                    "The ideas behind getting out of debt and staying out."
                }
            }

            @for lesson in &LESSONS {
                article id=(lesson.id) class=(format!("w-full {CARD_STYLE}"))
                {
                    h2 class="text-xl font-semibold mb-2" { (lesson.title) }

                    @for paragraph in lesson.paragraphs {
                        p class="mb-2" { (paragraph) }
                    }

                    a href=(lesson.link.0) class=(LINK_STYLE) { (lesson.link.1) }
                }
            }
        }
    };

    base("Financial Academy", &[], &content)
}
