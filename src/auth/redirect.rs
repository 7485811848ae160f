//! Where to send a visitor after they log in.

use axum::{
    extract::Request,
    http::{HeaderMap, Uri},
};

use crate::endpoints;

/// The path and query of `raw_url` if it is a page on this site other than the log-in page.
///
/// Absolute URLs are accepted only when `allow_absolute` is set, e.g. for the
/// `HX-Current-URL` header that HTMX fills in with the full address.
fn local_page(raw_url: &str, allow_absolute: bool) -> Option<String> {
    let uri = raw_url.parse::<Uri>().ok()?;
    if !allow_absolute && (uri.scheme().is_some() || uri.authority().is_some()) {
        return None;
    }

    let path_and_query = uri.path_and_query()?.as_str();
    let is_local = path_and_query.starts_with('/') && !path_and_query.starts_with("//");

    (is_local && uri.path() != endpoints::LOG_IN_VIEW).then(|| path_and_query.to_owned())
}

/// Accept `raw_url` as a redirect target only if it is a local path other than the log-in page.
pub fn normalize_redirect_url(raw_url: &str) -> Option<String> {
    local_page(raw_url, false)
}

/// The page an HTMX request was sent from.
fn current_page(headers: &HeaderMap) -> Option<String> {
    let header = |name: &str| headers.get(name).and_then(|value| value.to_str().ok());

    if !header("hx-request").is_some_and(|value| value.eq_ignore_ascii_case("true")) {
        tracing::warn!("API request without the HX-Request header");
        return None;
    }

    let Some(current_url) = header("hx-current-url") else {
        tracing::warn!("API request without the HX-Current-URL header");
        return None;
    };

    let page = local_page(current_url, true);
    if page.is_none() {
        tracing::warn!("ignoring HX-Current-URL {current_url:?}");
    }

    page
}

/// The page to return to after logging in, for a `request` that needs a session.
///
/// For `/api` routes this is the page that made the HTMX request, otherwise it
/// is the requested page itself.
pub fn return_address(request: &Request) -> Option<String> {
    if request.uri().path().starts_with("/api") {
        current_page(request.headers())
    } else {
        normalize_redirect_url(request.uri().path_and_query()?.as_str())
    }
}

/// The log-in page URL that leads on to `target`.
pub fn log_in_url_returning_to(target: &str) -> Option<String> {
    serde_urlencoded::to_string([("redirect_url", target)])
        .inspect_err(|error| tracing::error!("could not encode redirect URL {target}: {error}"))
        .ok()
        .map(|query| format!("{}?{query}", endpoints::LOG_IN_VIEW))
}
