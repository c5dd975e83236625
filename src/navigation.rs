//! The navigation bar for logged in users and the header for public pages.

use maud::{Markup, html};

use crate::endpoints;

/// Where a link appears on small screens.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Placement {
    /// Always visible in the bar at the bottom of the screen.
    Bar,
    /// Tucked away in the "More" menu.
    Menu,
}

const LINKS: [(&str, &str, Placement); 6] = [
    (endpoints::DASHBOARD_VIEW, "Dashboard", Placement::Bar),
    (endpoints::EXPENSES_VIEW, "Expenses", Placement::Bar),
    (endpoints::ANALYSIS_VIEW, "Analysis", Placement::Bar),
    (endpoints::EDUCATION_VIEW, "Academy", Placement::Menu),
    (endpoints::PROFILE_VIEW, "Profile", Placement::Menu),
    (endpoints::LOG_OUT, "Log out", Placement::Menu),
];

#[derive(Debug, Clone)]
struct Link<'a> {
    url: &'a str,
    title: &'a str,
    placement: Placement,
    is_current: bool,
}

impl Link<'_> {
    fn into_desktop_html(self) -> Markup {
        let style = if self.is_current {
            "block py-2 px-3 text-white bg-blue-700 rounded-sm lg:bg-transparent
        lg:text-blue-700 lg:p-0 dark:text-white lg:dark:text-blue-500"
        } else {
            "block py-2 px-3 text-gray-900 rounded-sm hover:bg-gray-100
        lg:hover:bg-transparent lg:border-0 lg:hover:text-blue-700 lg:p-0
        dark:text-white lg:dark:hover:text-blue-500 dark:hover:bg-gray-700
        dark:hover:text-white lg:dark:hover:bg-transparent"
        };

        html!( a href=(self.url) class=(style) { (self.title) } )
    }

    fn bar_html(&self) -> Markup {
        let style = if self.is_current {
            "flex w-full min-w-0 items-center justify-center rounded-lg bg-blue-50 px-2.5 py-2 \
            text-xs font-semibold text-blue-700 shadow-sm sm:px-4 sm:text-sm \
            dark:bg-blue-900/30 dark:text-blue-200"
        } else {
            "flex w-full min-w-0 items-center justify-center rounded-lg px-2.5 py-2 text-xs \
            font-semibold text-gray-600 sm:px-4 sm:text-sm hover:bg-blue-50/70 \
            hover:text-blue-700 dark:text-gray-300 dark:hover:text-blue-200"
        };

        html! {
            li class="min-w-0" {
                a href=(self.url) class=(style) aria-current=[self.is_current.then_some("page")]
                {
                    span class="truncate" { (self.title) }
                }
            }
        }
    }

    fn menu_html(&self) -> Markup {
        let style = if self.is_current {
            "block rounded-lg bg-blue-50 px-3 py-2 text-blue-700 dark:bg-blue-900/30 \
            dark:text-blue-200"
        } else {
            "block rounded-lg px-3 py-2 text-gray-700 hover:bg-gray-100 hover:text-blue-700 \
            dark:text-gray-200 dark:hover:bg-gray-800/80"
        };

        html! {
            li {
                a href=(self.url) class=(style) aria-current=[self.is_current.then_some("page")]
                {
                    (self.title)
                }
            }
        }
    }
}

/// The navigation bar shown at the top of every page for logged in users, and at the bottom of
/// the screen on phones.
pub struct NavBar<'a> {
    links: Vec<Link<'a>>,
}

impl NavBar<'_> {
    /// Get the navigation bar.
    ///
    /// If a link matches `active_endpoint`, then that link will be
    /// marked as active and displayed differently in the HTML.
    pub fn new(active_endpoint: &str) -> NavBar<'_> {
        let links = LINKS
            .iter()
            .map(|&(url, title, placement)| Link {
                url,
                title,
                placement,
                is_current: url == active_endpoint,
            })
            .collect();

        NavBar { links }
    }

    pub fn into_html(self) -> Markup {
        let (bar_links, menu_links): (Vec<_>, Vec<_>) = self
            .links
            .iter()
            .partition(|link| link.placement == Placement::Bar);
        let menu_is_active = menu_links.iter().any(|link| link.is_current);
        let menu_style = if menu_is_active {
            "list-none [&::-webkit-details-marker]:hidden flex w-full min-w-0 items-center \
            justify-center rounded-lg bg-blue-50 px-2.5 py-2 text-xs font-semibold sm:px-4 \
            sm:text-sm text-blue-700 shadow-sm cursor-pointer dark:bg-blue-900/30 \
            dark:text-blue-200"
        } else {
            "list-none [&::-webkit-details-marker]:hidden flex w-full min-w-0 items-center \
            justify-center rounded-lg px-2.5 py-2 text-xs font-semibold sm:px-4 sm:text-sm \
            text-gray-600 cursor-pointer hover:bg-blue-50/70 hover:text-blue-700 \
            dark:text-gray-300 dark:hover:text-blue-200"
        };

        // Template adapted from https://flowbite.com/docs/components/navbar/#default-navbar
        html!(
            nav class="bg-white border-gray-200 dark:bg-gray-900"
            {
                div
                    class="max-w-screen-xl flex flex-wrap items-center justify-between mx-auto p-4"
                {
                    a href=(endpoints::ROOT) class="flex items-center space-x-3 rtl:space-x-reverse"
                    {
                        (brand())
                    }

                    div class="hidden w-full lg:block lg:w-auto"
                    {
                        ul
                            class="font-medium flex flex-col p-4 lg:p-0 mt-4
                            border border-gray-100 rounded bg-gray-50
                            lg:flex-row lg:space-x-8 rtl:space-x-reverse lg:mt-0
                            lg:border-0 lg:bg-white dark:bg-gray-800
                            lg:dark:bg-gray-900 dark:border-gray-700"
                        {
                            @for link in self.links.iter().cloned() {
                                li { (link.into_desktop_html()) }
                            }
                        }
                    }
                }
            }

            nav id="bottom-nav" class="fixed inset-x-0 bottom-0 z-40 lg:hidden"
            {
                div class="mx-auto max-w-screen-xl px-4 pb-4"
                {
                    ul
                        class="grid grid-cols-4 gap-2 px-4 py-3 rounded-xl border
                        border-gray-200 bg-white/95 shadow-lg backdrop-blur
                        dark:border-gray-700 dark:bg-gray-900/95"
                        aria-label="Primary"
                    {
                        @for link in &bar_links {
                            (link.bar_html())
                        }

                        li class="min-w-0" {
                            details class="group relative"
                            {
                                summary
                                    class=(menu_style)
                                    aria-current=[menu_is_active.then_some("page")]
                                {
                                    span class="truncate" { "More" }
                                }

                                ul
                                    class="absolute bottom-full right-0 mb-3 w-40 flex flex-col
                                    gap-1 rounded-xl border border-gray-200 bg-white/95 p-2
                                    text-sm font-medium shadow-xl dark:border-gray-700
                                    dark:bg-gray-900/95"
                                {
                                    @for link in &menu_links {
                                        (link.menu_html())
                                    }
                                }
                            }
                        }
                    }
                }
            }
        )
    }
}

fn brand() -> Markup {
    html! {
        img src="/static/favicon-128x128.png" alt="Widata Logo" class="h-8";

        span class="self-center text-2xl font-semibold whitespace-nowrap dark:text-white"
        {
            "Widata"
        }
    }
}

/// The header shown on pages that visitors can see without logging in.
pub fn public_header(active_endpoint: &str) -> Markup {
    let link_style = |endpoint: &str| -> &'static str {
        if endpoint == active_endpoint {
            "font-medium text-blue-700 dark:text-blue-500"
        } else {
            "font-medium text-gray-900 hover:text-blue-700 dark:text-white dark:hover:text-blue-500"
        }
    };

    html! {
        nav class="bg-white border-gray-200 dark:bg-gray-900"
        {
            div class="max-w-screen-xl flex flex-wrap items-center justify-between mx-auto p-4"
            {
                a href=(endpoints::ROOT) class="flex items-center space-x-3 rtl:space-x-reverse"
                {
                    (brand())
                }

                ul class="flex flex-row items-center gap-x-6"
                {
                    li
                    {
                        a href=(endpoints::EDUCATION_VIEW) class=(link_style(endpoints::EDUCATION_VIEW))
                        {
                            "Academy"
                        }
                    }
                    li
                    {
                        a href=(endpoints::LOG_IN_VIEW) class=(link_style(endpoints::LOG_IN_VIEW))
                        {
                            "Log in"
                        }
                    }
                    li
                    {
                        a
                            href=(endpoints::REGISTER_VIEW)
                            class="px-4 py-2 bg-blue-500 hover:bg-blue-600 text-white rounded"
                        {
                            "Register"
                        }
                    }
                }
            }
        }
    }
}
