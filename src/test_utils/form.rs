//! Assertions over the forms rendered by the app's pages and endpoints.

use scraper::{ElementRef, Html, Selector};

fn select_one<'a>(element: ElementRef<'a>, selector: &str) -> Option<ElementRef<'a>> {
    element.select(&Selector::parse(selector).unwrap()).next()
}

#[track_caller]
fn must_get_input<'a>(form: &ElementRef<'a>, name: &str, type_: &str) -> ElementRef<'a> {
    let input = select_one(*form, &format!("input[name='{name}']"))
        .unwrap_or_else(|| panic!("no input named {name:?} in the form"));
    let got_type = input.value().attr("type").unwrap_or_default();
    assert_eq!(got_type, type_, "input {name:?} has the wrong type");

    input
}

#[track_caller]
pub(crate) fn must_get_form(html: &Html) -> ElementRef<'_> {
    html.select(&Selector::parse("form").unwrap())
        .next()
        .expect("No form found")
}

/// Checks that `form` sends its data to `endpoint` with the HTMX `attribute`, e.g. "hx-put".
#[track_caller]
pub(crate) fn assert_hx_endpoint(form: &ElementRef<'_>, endpoint: &str, attribute: &str) {
    assert_eq!(
        form.value().attr(attribute),
        Some(endpoint),
        "form should have {attribute}=\"{endpoint}\""
    );
}

/// Checks that `form` has a required input called `name` of type `type_`.
#[track_caller]
pub(crate) fn assert_form_input(form: &ElementRef<'_>, name: &str, type_: &str) {
    let input = must_get_input(form, name, type_);

    assert!(
        input.value().attr("required").is_some(),
        "input {name:?} should be required"
    );
}

/// Checks that `form` has an input called `name` of type `type_` filled in with `value`.
#[track_caller]
pub(crate) fn assert_form_input_with_value(
    form: &ElementRef<'_>,
    name: &str,
    type_: &str,
    value: &str,
) {
    let input = must_get_input(form, name, type_);

    assert_eq!(
        input.value().attr("value"),
        Some(value),
        "input {name:?} has the wrong value"
    );
}

#[track_caller]
pub(crate) fn assert_form_submit_button(form: &ElementRef<'_>) {
    let button = select_one(*form, "button").expect("No button found");

    assert_eq!(button.value().attr("type"), Some("submit"));
}

/// The values of the selected options of the `select` called `name`.
pub(crate) fn selected_options(html: &Html, name: &str) -> Vec<String> {
    let selector = Selector::parse(&format!("select[name='{name}'] option[selected]")).unwrap();

    html.select(&selector)
        .map(|option| option.value().attr("value").unwrap_or_default().to_owned())
        .collect()
}

/// Checks that the message under the input or select with the ID `field_id` contains `want`.
#[track_caller]
pub(crate) fn assert_field_error(html: &Html, field_id: &str, want: &str) {
    let selector = Selector::parse(&format!(
        "input#{field_id} + p.text-red-500, select#{field_id} + p.text-red-500"
    ))
    .unwrap();
    let message = html
        .select(&selector)
        .next()
        .unwrap_or_else(|| panic!("expected an error message under #{field_id}"))
        .text()
        .collect::<String>();

    assert!(
        message.contains(want),
        "want error message containing {want:?} under #{field_id}, got {message:?}"
    );
}
