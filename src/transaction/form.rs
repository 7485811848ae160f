//! The transaction form shared by the create and edit pages, and its validation.

use maud::{Markup, html};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::{
    Error,
    database_id::TransactionId,
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, format_date_input,
        loading_spinner, parse_date_input,
    },
    taxonomy::{
        Category, CategoryId, TransactionType, TypeId, category_options, get_categories_by_type,
        get_category, get_types,
    },
    transaction::{NewTransaction, Transaction},
};

/// The maximum number of characters in a transaction name.
pub const MAX_NAME_LENGTH: usize = 50;
/// The maximum number of characters in a transaction note.
pub const MAX_NOTE_LENGTH: usize = 255;
/// The maximum number of digits in an amount, including the two decimal places.
pub const MAX_AMOUNT_DIGITS: u32 = 11;
const AMOUNT_DECIMAL_PLACES: u32 = 2;

const TYPE_REQUIRED_MSG: &str = "Select a type";
const CATEGORY_REQUIRED_MSG: &str = "Select a category";
const CATEGORY_TYPE_MISMATCH_MSG: &str = "The category does not belong to the selected type";
const NAME_REQUIRED_MSG: &str = "Enter a name";
const NAME_TOO_LONG_MSG: &str = "The name can be at most 50 characters long";
const AMOUNT_INVALID_MSG: &str = "Enter an amount, e.g. 12.50";
const AMOUNT_NEGATIVE_MSG: &str = "The amount cannot be negative";
const AMOUNT_DECIMAL_PLACES_MSG: &str = "The amount can have at most 2 decimal places";
const AMOUNT_TOO_LARGE_MSG: &str = "The amount can have at most 11 digits";
const DATE_INVALID_MSG: &str = "Enter a date as MM/DD/YYYY";
const NOTE_TOO_LONG_MSG: &str = "The note can be at most 255 characters long";

/// The raw form data for creating or editing a transaction.
///
/// Every field is optional text so that bad input can be shown back to the user
/// with a message rather than rejected by the extractor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionForm {
    #[serde(default)]
    pub type_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub amount: Option<String>,
    /// The date as MM/DD/YYYY.
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

impl From<&Transaction> for TransactionForm {
    fn from(transaction: &Transaction) -> Self {
        Self {
            type_id: Some(transaction.transaction_type.id.to_string()),
            name: Some(transaction.name.clone()),
            amount: Some(transaction.amount.to_string()),
            date: Some(format_date_input(transaction.date)),
            category_id: Some(transaction.category.id.to_string()),
            note: Some(transaction.note.clone()),
        }
    }
}

impl TransactionForm {
    fn type_id(&self) -> Option<TypeId> {
        self.type_id.as_deref()?.trim().parse().ok()
    }

    fn category_id(&self) -> Option<CategoryId> {
        self.category_id.as_deref()?.trim().parse().ok()
    }
}

/// Messages to show under the fields of the transaction form.
#[derive(Debug, Default, PartialEq)]
pub struct FieldErrors {
    pub type_id: Option<&'static str>,
    pub category_id: Option<&'static str>,
    pub name: Option<&'static str>,
    pub amount: Option<&'static str>,
    pub date: Option<&'static str>,
    pub note: Option<&'static str>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self == &FieldErrors::default()
    }
}

/// Check every field of `form` and build the transaction to store.
///
/// `category` is the category the form refers to, or `None` if it does not exist.
///
/// # Errors
/// Returns the messages for every invalid field.
pub fn validate_transaction_form(
    form: &TransactionForm,
    category: Option<&Category>,
) -> Result<NewTransaction, FieldErrors> {
    let mut errors = FieldErrors::default();

    let type_id = form.type_id();
    if type_id.is_none() {
        errors.type_id = Some(TYPE_REQUIRED_MSG);
    }

    match (category, type_id) {
        (None, _) => errors.category_id = Some(CATEGORY_REQUIRED_MSG),
        (Some(category), Some(type_id)) if category.type_id != type_id => {
            errors.category_id = Some(CATEGORY_TYPE_MISMATCH_MSG)
        }
        _ => {}
    }

    let name = form.name.as_deref().unwrap_or_default().trim();
    if name.is_empty() {
        errors.name = Some(NAME_REQUIRED_MSG);
    } else if name.graphemes(true).count() > MAX_NAME_LENGTH {
        errors.name = Some(NAME_TOO_LONG_MSG);
    }

    let amount = match validate_amount(form.amount.as_deref().unwrap_or_default()) {
        Ok(amount) => Some(amount),
        Err(message) => {
            errors.amount = Some(message);
            None
        }
    };

    let date = form.date.as_deref().and_then(parse_date_input);
    if date.is_none() {
        errors.date = Some(DATE_INVALID_MSG);
    }

    let note = form.note.as_deref().unwrap_or_default().trim();
    if note.graphemes(true).count() > MAX_NOTE_LENGTH {
        errors.note = Some(NOTE_TOO_LONG_MSG);
    }

    match (type_id, category, amount, date) {
        (Some(type_id), Some(category), Some(amount), Some(date)) if errors.is_empty() => {
            Ok(NewTransaction {
                date,
                type_id,
                category_id: category.id,
                name: name.to_owned(),
                amount,
                note: note.to_owned(),
            })
        }
        _ => Err(errors),
    }
}

/// Parse a non-negative amount with at most two decimal places and at most
/// [MAX_AMOUNT_DIGITS] digits, rescaled to exactly two decimal places.
fn validate_amount(text: &str) -> Result<Decimal, &'static str> {
    let amount = text
        .trim()
        .parse::<Decimal>()
        .map_err(|_| AMOUNT_INVALID_MSG)?
        .normalize();

    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(AMOUNT_NEGATIVE_MSG);
    }

    if amount.scale() > AMOUNT_DECIMAL_PLACES {
        return Err(AMOUNT_DECIMAL_PLACES_MSG);
    }

    let whole = amount.trunc();
    let whole_digits = if whole.is_zero() {
        0
    } else {
        whole.to_string().len() as u32
    };
    if whole_digits > MAX_AMOUNT_DIGITS - AMOUNT_DECIMAL_PLACES {
        return Err(AMOUNT_TOO_LARGE_MSG);
    }

    let mut amount = amount.abs();
    amount.rescale(AMOUNT_DECIMAL_PLACES);

    Ok(amount)
}

/// Look up the category a form refers to, `None` if the ID is missing or unknown.
pub fn get_form_category(
    form: &TransactionForm,
    connection: &Connection,
) -> Result<Option<Category>, Error> {
    let Some(category_id) = form.category_id() else {
        return Ok(None);
    };

    match get_category(category_id, connection) {
        Ok(category) => Ok(Some(category)),
        Err(Error::NotFound) => Ok(None),
        Err(error) => Err(error),
    }
}

/// The choices for the type and category dropdowns.
///
/// Categories are only listed once a type has been chosen.
pub struct FormOptions {
    pub types: Vec<TransactionType>,
    pub categories: Vec<Category>,
}

impl FormOptions {
    pub fn load(form: &TransactionForm, connection: &Connection) -> Result<Self, Error> {
        let types = get_types(connection)?;
        let categories = match form.type_id() {
            Some(type_id) => get_categories_by_type(type_id, connection)?,
            None => Vec::new(),
        };

        Ok(Self { types, categories })
    }
}

/// Whether the form creates a new transaction or replaces an existing one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FormAction {
    Create,
    Edit(TransactionId),
}

fn error_message(message: Option<&str>) -> Markup {
    html! {
        @if let Some(message) = message {
            p class="text-red-500 text-base" { (message) }
        }
    }
}

/// The transaction form, pre-filled with `values`.
pub fn transaction_form(
    action: FormAction,
    values: &TransactionForm,
    options: &FormOptions,
    errors: &FieldErrors,
) -> Markup {
    let selected_type = values.type_id();
    let selected_category = values.category_id();
    let (title, button_text) = match action {
        FormAction::Create => ("New Entry", "Create Entry"),
        FormAction::Edit(_) => ("Edit Entry", "Save Changes"),
    };
    let edit_endpoint = match action {
        FormAction::Edit(transaction_id) => {
            Some(format_endpoint(endpoints::TRANSACTION, transaction_id))
        }
        FormAction::Create => None,
    };
    let create_endpoint = edit_endpoint
        .is_none()
        .then_some(endpoints::TRANSACTIONS_API);

    html! {
        form
            hx-post=[create_endpoint]
            hx-put=[edit_endpoint.as_deref()]
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            hx-indicator="#indicator"
            class="w-full space-y-4 md:space-y-6"
        {
            h2 class="text-xl font-bold" { (title) }

            div
            {
                label for="type_id" class=(FORM_LABEL_STYLE) { "Type" }

                select
                    name="type_id"
                    id="type_id"
                    required
                    hx-get=(endpoints::CATEGORIES_API)
                    hx-trigger="change"
                    hx-target="#category_id"
                    hx-swap="innerHTML"
                    class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" { "Select type..." }

                    @for transaction_type in &options.types {
                        option
                            value=(transaction_type.id)
                            selected[Some(transaction_type.id) == selected_type]
                        {
                            (transaction_type.name)
                        }
                    }
                }

                (error_message(errors.type_id))
            }

            div
            {
                label for="name" class=(FORM_LABEL_STYLE) { "Name" }

                input
                    name="name"
                    id="name"
                    type="text"
                    placeholder="Name"
                    required
                    maxlength=(MAX_NAME_LENGTH)
                    value=[values.name.as_deref()]
                    class=(FORM_TEXT_INPUT_STYLE);

                (error_message(errors.name))
            }

            div
            {
                label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

                // w-full needed to ensure input takes the full width when prefilled with a value
                div class="input-wrapper w-full"
                {
                    input
                        name="amount"
                        id="amount"
                        type="number"
                        step="0.01"
                        min="0"
                        placeholder="0.00"
                        required
                        value=[values.amount.as_deref()]
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                (error_message(errors.amount))
            }

            div
            {
                label for="date" class=(FORM_LABEL_STYLE) { "Date" }

                input
                    name="date"
                    id="date"
                    type="text"
                    placeholder="MM/DD/YYYY"
                    required
                    value=[values.date.as_deref()]
                    class=(FORM_TEXT_INPUT_STYLE);

                (error_message(errors.date))
            }

            div
            {
                label for="category_id" class=(FORM_LABEL_STYLE) { "Category" }

                select
                    name="category_id"
                    id="category_id"
                    required
                    class=(FORM_TEXT_INPUT_STYLE)
                {
                    (category_options(&options.categories, selected_category))
                }

                (error_message(errors.category_id))
            }

            div
            {
                label for="note" class=(FORM_LABEL_STYLE) { "Note" }

                input
                    name="note"
                    id="note"
                    type="text"
                    placeholder="Note"
                    maxlength=(MAX_NOTE_LENGTH)
                    value=[values.note.as_deref()]
                    class=(FORM_TEXT_INPUT_STYLE);

                (error_message(errors.note))
            }

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                span id="indicator" class="inline htmx-indicator"
                {
                    (loading_spinner())
                }
                " " (button_text)
            }
        }
    }
}
