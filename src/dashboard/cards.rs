//! Summary cards at the top of the dashboard.
//!
//! Shows the balance over all entries, plus this month's expenses and income
//! as amounts and as shares of the month's money flow.

use maud::{Markup, html};
use rust_decimal::Decimal;

use crate::{
    dashboard::aggregation::{CurrentMonthTotals, RelativeShares},
    html::{EXPENSE_TEXT_STYLE, INCOME_TEXT_STYLE, format_currency},
};

const CARD_STYLE: &str = "bg-white dark:bg-gray-800 border border-gray-200 \
    dark:border-gray-700 rounded-lg p-4 shadow-md flex flex-col justify-between";
const CARD_TITLE_STYLE: &str = "text-sm text-gray-600 dark:text-gray-400 mb-1";

/// The figures shown in the summary cards.
pub(super) struct SummaryCards<'a> {
    pub balance: Decimal,
    pub current_month: CurrentMonthTotals,
    pub shares: RelativeShares,
    pub currency_symbol: &'a str,
}

/// Formats a whole percentage, e.g. "42%".
fn format_share(share: Decimal) -> String {
    format!("{}%", share.round().normalize())
}

fn balance_style(balance: Decimal) -> &'static str {
    if balance.is_sign_negative() && !balance.is_zero() {
        EXPENSE_TEXT_STYLE
    } else {
        INCOME_TEXT_STYLE
    }
}

fn card(id: &str, title: &str, figure: &str, figure_style: &str, footer: &str) -> Markup {
    html! {
        div id=(id) class=(CARD_STYLE)
        {
            h4 class=(CARD_TITLE_STYLE) { (title) }

            div class={ "text-3xl font-bold mb-1 " (figure_style) }
            {
                (figure)
            }

            div class="text-sm text-gray-600 dark:text-gray-400" { (footer) }
        }
    }
}

pub(super) fn summary_cards_view(cards: &SummaryCards) -> Markup {
    let symbol = cards.currency_symbol;

    html! {
        section class="w-full mx-auto mb-8"
        {
            div class="grid grid-cols-1 sm:grid-cols-3 gap-4"
            {
                (card(
                    "balance-card",
                    "Balance",
                    &format_currency(cards.balance, symbol),
                    balance_style(cards.balance),
                    "Income minus expenses of all entries",
                ))

                (card(
                    "expenses-card",
                    "Expenses this month",
                    &format_currency(cards.current_month.expenses, symbol),
                    EXPENSE_TEXT_STYLE,
                    &format!("{} of this month's money flow", format_share(cards.shares.expenses)),
                ))

                (card(
                    "income-card",
                    "Income this month",
                    &format_currency(cards.current_month.income, symbol),
                    INCOME_TEXT_STYLE,
                    &format!("{} of this month's money flow", format_share(cards.shares.income)),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use scraper::{Html, Selector};

    use crate::dashboard::aggregation::{CurrentMonthTotals, RelativeShares, relative_shares};

    use super::{SummaryCards, format_share, summary_cards_view};

    fn card_text(html: &Html, id: &str) -> String {
        let selector = Selector::parse(&format!("#{id}")).unwrap();
        html.select(&selector)
            .next()
            .unwrap_or_else(|| panic!("could not find #{id}"))
            .text()
            .collect()
    }

    #[test]
    fn shares_are_whole_percentages() {
        assert_eq!(format_share(Decimal::new(4200, 2)), "42%");
        assert_eq!(format_share(Decimal::ZERO), "0%");
        assert_eq!(format_share(Decimal::ONE_HUNDRED), "100%");
        assert_eq!(format_share(Decimal::new(2000, 2)), "20%");
        assert_eq!(format_share(Decimal::new(2800, 2)), "28%");
    }

    #[test]
    fn computed_shares_show_without_decimals() {
        let current_month = CurrentMonthTotals {
            expenses: Decimal::new(57, 0),
            income: Decimal::new(143, 0),
        };
        let cards = SummaryCards {
            balance: Decimal::new(86, 0),
            current_month,
            shares: relative_shares(current_month),
            currency_symbol: "$",
        };

        let html = Html::parse_fragment(&summary_cards_view(&cards).into_string());

        let expenses = card_text(&html, "expenses-card");
        assert!(expenses.contains("28% of"), "{expenses}");
        assert!(!expenses.contains("28.00%"), "{expenses}");
        assert!(card_text(&html, "income-card").contains("72% of"));
    }

    #[test]
    fn renders_all_cards() {
        let cards = SummaryCards {
            balance: Decimal::new(-2550, 2),
            current_month: CurrentMonthTotals {
                expenses: Decimal::new(75, 0),
                income: Decimal::new(25, 0),
            },
            shares: RelativeShares {
                expenses: Decimal::new(75, 0),
                income: Decimal::new(25, 0),
            },
            currency_symbol: "$",
        };

        let html = Html::parse_fragment(&summary_cards_view(&cards).into_string());

        assert!(card_text(&html, "balance-card").contains("-$25.50"));
        let expenses = card_text(&html, "expenses-card");
        assert!(expenses.contains("$75.00"), "{expenses}");
        assert!(expenses.contains("75%"), "{expenses}");
        let income = card_text(&html, "income-card");
        assert!(income.contains("$25.00"), "{income}");
        assert!(income.contains("25%"), "{income}");
    }
}
