//! Narrows a user's transactions down to those matching the dashboard filters.

use std::{collections::HashSet, ops::RangeInclusive};

use time::Date;

use crate::{
    Error,
    filter::{
        date_range::parse_date_range,
        params::FilterParams,
        vocabulary::{SearchTarget, SearchVocabulary},
    },
    transaction::Transaction,
};

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn equals_ignore_case(left: &str, right: &str) -> bool {
    left.to_lowercase() == right.to_lowercase()
}

fn retain(
    mut transactions: Vec<Transaction>,
    predicate: impl Fn(&Transaction) -> bool,
) -> Vec<Transaction> {
    transactions.retain(|transaction| predicate(transaction));
    transactions
}

fn in_date_range(transactions: &[Transaction], range: &RangeInclusive<Date>) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|transaction| range.contains(&transaction.date))
        .cloned()
        .collect()
}

/// The transactions of type `type_name`, largest amount first.
fn by_type_largest_first(transactions: &[Transaction], type_name: &str) -> Vec<Transaction> {
    let mut matches = transactions
        .iter()
        .filter(|transaction| equals_ignore_case(&transaction.transaction_type.name, type_name))
        .cloned()
        .collect::<Vec<_>>();
    matches.sort_by(|a, b| b.amount.cmp(&a.amount));
    matches
}

/// The transactions in category `category_name`, largest amount first.
fn by_category_largest_first(
    transactions: &[Transaction],
    category_name: &str,
) -> Vec<Transaction> {
    let mut matches = transactions
        .iter()
        .filter(|transaction| equals_ignore_case(&transaction.category.name, category_name))
        .cloned()
        .collect::<Vec<_>>();
    matches.sort_by(|a, b| b.amount.cmp(&a.amount));
    matches
}

/// The transactions of `left` that are also in `right`, compared by ID, in
/// the order of `left`.
pub fn intersect(left: Vec<Transaction>, right: &[Transaction]) -> Vec<Transaction> {
    let right_ids = right
        .iter()
        .map(|transaction| transaction.id)
        .collect::<HashSet<_>>();

    retain(left, |transaction| right_ids.contains(&transaction.id))
}

/// Keep the transactions that match every filter in `params`.
///
/// `transactions` should be in the base order, see
/// [crate::transaction::compare_base_order]. The simple filters, the date
/// filter and the search keep that order. When an advanced type or category
/// is combined with a date range, the result is ordered by amount descending.
///
/// # Errors
/// Returns [Error::InvalidDateRange] if the date range cannot be parsed.
pub fn apply_filters(
    transactions: Vec<Transaction>,
    params: &FilterParams,
    vocabulary: &SearchVocabulary,
) -> Result<Vec<Transaction>, Error> {
    let date_range = params.date().map(parse_date_range).transpose()?;

    let mut working = transactions;

    if let Some(type_name) = params.type_name() {
        working = retain(working, |transaction| {
            equals_ignore_case(&transaction.transaction_type.name, type_name)
        });
    }

    if let Some(category_search) = params.category_search() {
        working = retain(working, |transaction| {
            contains_ignore_case(&transaction.category.name, category_search)
        });
    }

    if let Some(category) = params.category() {
        working = retain(working, |transaction| {
            equals_ignore_case(&transaction.category.name, category)
        });
    }

    working = match (
        params.type_advanced(),
        params.category_advanced(),
        date_range,
    ) {
        (None, None, Some(range)) => in_date_range(&working, &range),
        // The advanced dropdowns only apply together with a date range.
        (_, _, None) => working,
        (Some(type_name), None, Some(range)) => intersect(
            by_type_largest_first(&working, type_name),
            &in_date_range(&working, &range),
        ),
        (None, Some(category), Some(range)) => intersect(
            by_category_largest_first(&working, category),
            &in_date_range(&working, &range),
        ),
        (Some(type_name), Some(category), Some(range)) => intersect(
            intersect(
                by_type_largest_first(&working, type_name),
                &by_category_largest_first(&working, category),
            ),
            &in_date_range(&working, &range),
        ),
    };

    if let Some(token) = params.search() {
        let target = vocabulary.classify(token);
        tracing::debug!("searching {target:?} for {token:?}");

        working = retain(working, |transaction| match target {
            SearchTarget::Type => contains_ignore_case(&transaction.transaction_type.name, token),
            SearchTarget::Category => contains_ignore_case(&transaction.category.name, token),
            SearchTarget::Note => contains_ignore_case(&transaction.note, token),
            SearchTarget::Name => contains_ignore_case(&transaction.name, token),
        });
    }

    Ok(working)
}
