//! Alert messages that HTMX swaps into the `#alert-container` element of the base page.
//!
//! Handlers return these for HTMX requests so that the user gets feedback
//! without a full page reload.

use maud::{Markup, PreEscaped, html};

const SHOW_ALERT_CONTAINER_SCRIPT: &str =
    "document.getElementById('alert-container').classList.remove('hidden');";

/// A dismissable message shown at the bottom of the screen.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// A success message without details.
    SuccessSimple { message: String },
    /// An error message with details on what went wrong and how to fix it.
    Error { message: String, details: String },
}

impl Alert {
    /// Render the alert as an HTML fragment.
    ///
    /// The fragment carries a script that un-hides the alert container once swapped in.
    pub fn into_html(self) -> Markup {
        let (is_error, message, details) = match self {
            Alert::SuccessSimple { message } => (false, message, None),
            Alert::Error { message, details } => (true, message, Some(details)),
        };

        let container_style = if is_error {
            "flex items-start p-4 mb-4 text-red-800 border border-red-300 rounded-lg \
            bg-red-50 dark:bg-gray-800 dark:text-red-400 dark:border-red-800"
        } else {
            "flex items-start p-4 mb-4 text-green-800 border border-green-300 rounded-lg \
            bg-green-50 dark:bg-gray-800 dark:text-green-400 dark:border-green-800"
        };

        html! {
            div
                class=(container_style)
                role="alert"
                data-alert-kind=(if is_error { "error" } else { "success" })
            {
                div class="flex-1"
                {
                    p class="font-semibold" { (message) }

                    @if let Some(details) = details.filter(|details| !details.is_empty())
                    {
                        p class="text-sm mt-1" { (details) }
                    }
                }

                button
                    type="button"
                    class="ms-3 text-sm font-medium underline"
                    aria-label="Dismiss"
                    onclick="this.parentElement.remove(); document.getElementById('alert-container').classList.add('hidden')"
                {
                    "Dismiss"
                }
            }

            script { (PreEscaped(SHOW_ALERT_CONTAINER_SCRIPT)) }
        }
    }
}
