//! The navigation bar shown at the top of every page behind log in.
//!
//! Wide screens get a bar across the top, narrow screens a tab bar pinned to the bottom.

use maud::{Markup, html};

use crate::endpoints;

/// The pages linked from the navigation bar, in display order.
const PAGES: [(&str, &str); 5] = [
    (endpoints::DASHBOARD_VIEW, "Dashboard"),
    (endpoints::NEW_TRANSACTION_VIEW, "New entry"),
    (endpoints::PREFERENCES_VIEW, "Preferences"),
    (endpoints::ACCOUNT_VIEW, "Account"),
    (endpoints::LOG_OUT, "Log out"),
];

const TOP_LINK_STYLE: &str = "block py-2 px-3 text-gray-900 rounded-sm hover:bg-gray-100 \
    lg:hover:bg-transparent lg:border-0 lg:hover:text-blue-700 lg:p-0 dark:text-white \
    lg:dark:hover:text-blue-500 dark:hover:bg-gray-700 dark:hover:text-white \
    lg:dark:hover:bg-transparent";
const TOP_LINK_CURRENT_STYLE: &str = "block py-2 px-3 text-white bg-blue-700 rounded-sm \
    lg:bg-transparent lg:text-blue-700 lg:p-0 dark:text-white lg:dark:text-blue-500";
const TAB_STYLE: &str = "flex w-full min-w-0 items-center justify-center rounded-lg \
    px-2 py-2 text-xs font-semibold leading-tight text-gray-600 sm:text-sm \
    hover:bg-blue-50/70 hover:text-blue-700 dark:text-gray-300 \
    dark:hover:bg-blue-900/20 dark:hover:text-blue-200";
const TAB_CURRENT_STYLE: &str = "flex w-full min-w-0 items-center justify-center rounded-lg \
    bg-blue-50 px-2 py-2 text-xs font-semibold leading-tight text-blue-700 shadow-sm \
    sm:text-sm dark:bg-blue-900/30 dark:text-blue-200";

#[derive(Debug, Clone, Copy)]
struct NavLink {
    url: &'static str,
    title: &'static str,
    is_current: bool,
}

/// The links of the navigation bar with the link to the current page highlighted.
pub struct NavBar {
    links: Vec<NavLink>,
}

impl NavBar {
    /// Build the navigation bar for the page at `current_endpoint`.
    ///
    /// Log out is never shown as the current page.
    pub fn new(current_endpoint: &str) -> Self {
        let links = PAGES
            .iter()
            .map(|&(url, title)| NavLink {
                url,
                title,
                is_current: url == current_endpoint && url != endpoints::LOG_OUT,
            })
            .collect();

        Self { links }
    }

    pub fn into_html(self) -> Markup {
        html!(
            nav class="bg-white border-gray-200 dark:bg-gray-900"
            {
                div class="max-w-screen-xl flex flex-wrap items-center justify-between mx-auto p-4"
                {
                    a href=(endpoints::ROOT) class="flex items-center space-x-3"
                    {
                        img src="/static/favicon-128x128.png" alt="Wallet Logo" class="h-8";

                        span class="self-center text-2xl font-semibold whitespace-nowrap dark:text-white"
                        {
                            "Wallet"
                        }
                    }

                    ul
                        class="hidden lg:flex font-medium flex-row space-x-8
                        bg-white dark:bg-gray-900"
                    {
                        @for link in &self.links {
                            li
                            {
                                a
                                    href=(link.url)
                                    class=(if link.is_current { TOP_LINK_CURRENT_STYLE } else { TOP_LINK_STYLE })
                                {
                                    (link.title)
                                }
                            }
                        }
                    }
                }
            }

            nav class="fixed inset-x-0 bottom-0 z-40 lg:hidden"
            {
                ul
                    class="mx-4 mb-4 grid grid-cols-5 gap-1 rounded-xl border border-gray-200
                    bg-white/95 px-2 py-3 shadow-lg dark:border-gray-700 dark:bg-gray-900/95"
                    aria-label="Primary"
                {
                    @for link in &self.links {
                        li class="min-w-0"
                        {
                            a
                                href=(link.url)
                                class=(if link.is_current { TAB_CURRENT_STYLE } else { TAB_STYLE })
                                aria-current=[link.is_current.then_some("page")]
                            {
                                span class="truncate" { (link.title) }
                            }
                        }
                    }
                }
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};

    use crate::endpoints;

    use super::NavBar;

    fn current_links(endpoint: &str) -> Vec<&'static str> {
        NavBar::new(endpoint)
            .links
            .into_iter()
            .filter(|link| link.is_current)
            .map(|link| link.url)
            .collect()
    }

    #[test]
    fn highlights_only_the_current_page() {
        for endpoint in [
            endpoints::DASHBOARD_VIEW,
            endpoints::NEW_TRANSACTION_VIEW,
            endpoints::PREFERENCES_VIEW,
            endpoints::ACCOUNT_VIEW,
        ] {
            assert_eq!(current_links(endpoint), vec![endpoint]);
        }
    }

    #[test]
    fn pages_outside_the_bar_highlight_nothing() {
        for endpoint in [
            endpoints::ROOT,
            endpoints::SETUP_VIEW,
            endpoints::LOG_IN_VIEW,
            endpoints::LOG_OUT,
            endpoints::TRANSACTIONS_API,
        ] {
            assert!(current_links(endpoint).is_empty(), "{endpoint} was highlighted");
        }
    }

    #[test]
    fn marks_current_tab_for_screen_readers() {
        let html = Html::parse_fragment(&NavBar::new(endpoints::ACCOUNT_VIEW).into_html().into_string());

        let current = html
            .select(&Selector::parse("a[aria-current=page]").unwrap())
            .map(|link| link.value().attr("href").unwrap_or_default().to_owned())
            .collect::<Vec<_>>();
        assert_eq!(current, vec![endpoints::ACCOUNT_VIEW]);
    }
}
