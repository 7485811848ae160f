//! Table views for the filtered entries.
//!
//! Provides the per-day summary of the filtered entries and the entry list
//! itself, with links to edit or delete each entry.

use maud::{Markup, html};
use rust_decimal::Decimal;

use crate::{
    dashboard::aggregation::DailySummary,
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_DELETE_STYLE, EXPENSE_TEXT_STYLE, INCOME_TEXT_STYLE, LINK_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, format_currency, format_date_input,
    },
    taxonomy::EntryType,
    transaction::Transaction,
};

const TABLE_STYLE: &str = "w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400";
const TABLE_CONTAINER_STYLE: &str = "overflow-x-auto rounded-lg shadow";

fn amount_style(amount: Decimal) -> &'static str {
    if amount.is_sign_negative() && !amount.is_zero() {
        EXPENSE_TEXT_STYLE
    } else {
        INCOME_TEXT_STYLE
    }
}

/// Renders the number of entries and their signed total for each day.
pub(super) fn daily_summary_table(summaries: &[DailySummary], currency_symbol: &str) -> Markup {
    if summaries.is_empty() {
        return html! {};
    }

    html! {
        div class="w-full mb-8"
        {
            h3 class="text-xl font-semibold mb-4" { "Daily Summary" }

            div id="daily-summary-table" class=(TABLE_CONTAINER_STYLE)
            {
                table class=(TABLE_STYLE)
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Entries" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Total" }
                        }
                    }

                    tbody
                    {
                        @for summary in summaries {
                            tr class=(TABLE_ROW_STYLE)
                            {
                                td class=(TABLE_CELL_STYLE) { (format_date_input(summary.date)) }
                                td class=(TABLE_CELL_STYLE) { (summary.count) }
                                td class={ (TABLE_CELL_STYLE) " " (amount_style(summary.total)) }
                                {
                                    (format_currency(summary.total, currency_symbol))
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn entry_row(transaction: &Transaction, currency_symbol: &str) -> Markup {
    let (sign, style) = match transaction.kind() {
        EntryType::Expense => ("-", EXPENSE_TEXT_STYLE),
        EntryType::Income => ("+", INCOME_TEXT_STYLE),
    };
    let edit_url = format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, transaction.id);
    let delete_url = format_endpoint(endpoints::DELETE_TRANSACTION_VIEW, transaction.id);

    html! {
        tr class=(TABLE_ROW_STYLE) data-transaction-id=(transaction.id)
        {
            td class=(TABLE_CELL_STYLE) { (format_date_input(transaction.date)) }
            td class=(TABLE_CELL_STYLE) { (transaction.name) }
            td class=(TABLE_CELL_STYLE) { (transaction.category.display()) }
            td class={ (TABLE_CELL_STYLE) " whitespace-nowrap " (style) }
            {
                (sign) (format_currency(transaction.amount, currency_symbol))
            }
            td class=(TABLE_CELL_STYLE) { (transaction.note) }
            td class={ (TABLE_CELL_STYLE) " whitespace-nowrap" }
            {
                a href=(edit_url) class=(LINK_STYLE) { "Edit" }
                " "
                a href=(delete_url) class=(BUTTON_DELETE_STYLE) { "Delete" }
            }
        }
    }
}

/// Renders the filtered entries in the order given.
pub(super) fn entries_table(transactions: &[Transaction], currency_symbol: &str) -> Markup {
    html! {
        div class="w-full mb-8"
        {
            h3 class="text-xl font-semibold mb-4" { "Entries" }

            @if transactions.is_empty() {
                p class="text-gray-600 dark:text-gray-400"
                {
                    "No entries match these filters."
                }
            } @else {
                div id="entries-table" class=(TABLE_CONTAINER_STYLE)
                {
                    table class=(TABLE_STYLE)
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Note" }
                                th scope="col" class=(TABLE_CELL_STYLE) { span class="sr-only" { "Actions" } }
                            }
                        }

                        tbody
                        {
                            @for transaction in transactions {
                                (entry_row(transaction, currency_symbol))
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use scraper::{Html, Selector};
    use time::macros::date;

    use crate::dashboard::aggregation::DailySummary;

    use super::{daily_summary_table, entries_table};

    #[test]
    fn daily_summary_lists_each_day() {
        let summaries = [
            DailySummary {
                date: date!(2025 - 03 - 02),
                count: 2,
                total: Decimal::new(-1250, 2),
            },
            DailySummary {
                date: date!(2025 - 03 - 01),
                count: 1,
                total: Decimal::new(40, 0),
            },
        ];

        let html =
            Html::parse_fragment(&daily_summary_table(&summaries, "$").into_string());

        let rows = html
            .select(&Selector::parse("#daily-summary-table tbody tr").unwrap())
            .map(|row| row.text().collect::<String>())
            .collect::<Vec<_>>();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].contains("03/02/2025"), "{}", rows[0]);
        assert!(rows[0].contains("-$12.50"), "{}", rows[0]);
        assert!(rows[1].contains("$40.00"), "{}", rows[1]);
    }

    #[test]
    fn empty_summary_renders_nothing() {
        assert_eq!(daily_summary_table(&[], "$").into_string(), "");
    }

    #[test]
    fn empty_entries_show_a_message() {
        let html = entries_table(&[], "$").into_string();

        assert!(html.contains("No entries match these filters."));
        assert!(!html.contains("<table"));
    }
}
