//! Turns a user's transactions into the figures shown on the dashboard.
//!
//! Every function here is pure. The current date is always passed in so the
//! results do not depend on when they are computed.

use rust_decimal::{Decimal, RoundingStrategy};
use time::{Date, Month};

use crate::{
    taxonomy::{Category, EntryType},
    transaction::Transaction,
};

const TRAILING_MONTHS: usize = 6;

/// The months that are always attributed to the current year when the
/// trailing months span a new year.
const EARLY_MONTHS: [Month; 5] = [
    Month::January,
    Month::February,
    Month::March,
    Month::April,
    Month::May,
];

/// A user's transactions split by kind, each ordered by amount descending.
#[derive(Debug, Default, PartialEq)]
pub(super) struct Partition {
    pub expenses: Vec<Transaction>,
    pub income: Vec<Transaction>,
}

/// The number of filtered entries on a day and their signed total.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct DailySummary {
    pub date: Date,
    pub count: usize,
    /// Income minus expenses.
    pub total: Decimal,
}

/// The expenses and income of the current calendar month.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct CurrentMonthTotals {
    pub expenses: Decimal,
    pub income: Decimal,
}

/// The percentage of the current month's money flow that is expenses and income.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct RelativeShares {
    pub expenses: Decimal,
    pub income: Decimal,
}

/// The expenses and income of one of the trailing months.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct MonthlyTotals {
    pub month: Month,
    pub year: i32,
    pub expenses: Decimal,
    pub income: Decimal,
}

/// This month's spending per expense category, omitting empty categories.
///
/// `labels` and `values` have the same length and line up by index.
#[derive(Debug, Default, PartialEq)]
pub(super) struct CategoryBreakdown {
    pub labels: Vec<String>,
    pub values: Vec<Decimal>,
}

pub(super) fn partition_by_type(transactions: &[Transaction]) -> Partition {
    let (mut expenses, mut income): (Vec<_>, Vec<_>) = transactions
        .iter()
        .cloned()
        .partition(|transaction| transaction.kind() == EntryType::Expense);

    expenses.sort_by(|a, b| b.amount.cmp(&a.amount));
    income.sort_by(|a, b| b.amount.cmp(&a.amount));

    Partition { expenses, income }
}

fn sum<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> Decimal {
    transactions
        .into_iter()
        .map(|transaction| transaction.amount)
        .sum()
}

/// Total income minus total expenses.
pub(super) fn balance_total(partition: &Partition) -> Decimal {
    sum(&partition.income) - sum(&partition.expenses)
}

/// Count and total the `filtered` transactions per day, in the order each
/// day first appears.
///
/// Each amount is rounded half to even to two decimal places before it is
/// added to its day's total.
pub(super) fn daily_summaries(filtered: &[Transaction]) -> Vec<DailySummary> {
    let mut summaries: Vec<DailySummary> = Vec::new();

    for transaction in filtered {
        let amount = transaction
            .amount
            .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
        let signed_amount = match transaction.kind() {
            EntryType::Expense => -amount,
            EntryType::Income => amount,
        };

        match summaries
            .iter_mut()
            .find(|summary| summary.date == transaction.date)
        {
            Some(summary) => {
                summary.count += 1;
                summary.total += signed_amount;
            }
            None => summaries.push(DailySummary {
                date: transaction.date,
                count: 1,
                total: signed_amount,
            }),
        }
    }

    summaries
}

fn in_month(transaction: &Transaction, month: Month, year: i32) -> bool {
    transaction.date.month() == month && transaction.date.year() == year
}

pub(super) fn current_month_totals(partition: &Partition, today: Date) -> CurrentMonthTotals {
    let (month, year) = (today.month(), today.year());

    CurrentMonthTotals {
        expenses: sum(partition
            .expenses
            .iter()
            .filter(|transaction| in_month(transaction, month, year))),
        income: sum(partition
            .income
            .iter()
            .filter(|transaction| in_month(transaction, month, year))),
    }
}

/// Each side's share of the month as a percentage, rounded to whole percents.
///
/// Both shares are zero when there was no money flow this month.
pub(super) fn relative_shares(totals: CurrentMonthTotals) -> RelativeShares {
    let flow = totals.expenses + totals.income;

    if flow.is_zero() {
        return RelativeShares {
            expenses: Decimal::ZERO,
            income: Decimal::ZERO,
        };
    }

    let share = |part: Decimal| {
        (part / flow).round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
            * Decimal::ONE_HUNDRED
    };

    RelativeShares {
        expenses: share(totals.expenses),
        income: share(totals.income),
    }
}

/// The six months before the month of `today`, most recent first.
pub(super) fn previous_month_names(today: Date) -> Vec<Month> {
    let mut month = today.month();

    (0..TRAILING_MONTHS)
        .map(|_| {
            month = month.previous();
            month
        })
        .collect()
}

/// Pair each of `months` with the year it is assumed to fall in.
///
/// When the months run backwards without wrapping past January they all
/// belong to `current_year`. Otherwise January to May belong to
/// `current_year` and every other month to the year before.
///
/// This is a heuristic with a known blind spot: in January the six previous
/// months are December back to July, which run backwards without wrapping,
/// so they are attributed to the current year instead of the previous one.
pub(super) fn attribute_years(months: &[Month], current_year: i32) -> Vec<(Month, i32)> {
    let in_reverse_calendar_order = months
        .windows(2)
        .all(|pair| u8::from(pair[0]) > u8::from(pair[1]));

    months
        .iter()
        .map(|&month| {
            let year = if in_reverse_calendar_order || EARLY_MONTHS.contains(&month) {
                current_year
            } else {
                current_year - 1
            };

            (month, year)
        })
        .collect()
}

/// The expenses and income of the six months before the month of `today`,
/// most recent first.
pub(super) fn trailing_six_months(partition: &Partition, today: Date) -> Vec<MonthlyTotals> {
    attribute_years(&previous_month_names(today), today.year())
        .into_iter()
        .map(|(month, year)| MonthlyTotals {
            month,
            year,
            expenses: sum(partition
                .expenses
                .iter()
                .filter(|transaction| in_month(transaction, month, year))),
            income: sum(partition
                .income
                .iter()
                .filter(|transaction| in_month(transaction, month, year))),
        })
        .collect()
}

/// The chart label of a category: its display string without spaces and
/// without its first character, the logo.
pub(super) fn category_label(category: &Category) -> String {
    category
        .display()
        .chars()
        .filter(|character| *character != ' ')
        .skip(1)
        .collect()
}

/// Sum this month's expenses per category in `expense_categories`.
///
/// Transactions are matched on the month of `today` regardless of year.
pub(super) fn category_breakdown(
    partition: &Partition,
    expense_categories: &[Category],
    today: Date,
) -> CategoryBreakdown {
    let month = today.month();
    let mut breakdown = CategoryBreakdown::default();

    for category in expense_categories {
        let total = sum(partition.expenses.iter().filter(|transaction| {
            transaction.category.id == category.id && transaction.date.month() == month
        }));

        if total.is_zero() {
            continue;
        }

        breakdown.labels.push(category_label(category));
        breakdown.values.push(total);
    }

    breakdown
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use time::{Date, Month, OffsetDateTime, macros::date};

    use crate::{
        auth::UserID,
        taxonomy::{Category, EntryType, TransactionType},
        transaction::Transaction,
    };

    use super::{
        CurrentMonthTotals, DailySummary, attribute_years, balance_total, category_breakdown,
        category_label, current_month_totals, daily_summaries, partition_by_type,
        previous_month_names, relative_shares, trailing_six_months,
    };

    fn category(id: i64, name: &str, logo: &str, kind: EntryType) -> Category {
        Category {
            id,
            name: name.to_owned(),
            logo: logo.to_owned(),
            type_id: match kind {
                EntryType::Expense => 1,
                EntryType::Income => 2,
            },
        }
    }

    fn food() -> Category {
        category(1, "Food", "🍔", EntryType::Expense)
    }

    fn housing() -> Category {
        category(2, "Housing", "🏠", EntryType::Expense)
    }

    fn transport() -> Category {
        category(3, "Transport", "🚌", EntryType::Expense)
    }

    fn salary() -> Category {
        category(4, "Salary", "💼", EntryType::Income)
    }

    fn transaction(id: i64, category: Category, amount: Decimal, date: Date) -> Transaction {
        let kind = if category.type_id == 1 {
            EntryType::Expense
        } else {
            EntryType::Income
        };

        Transaction {
            id,
            user_id: UserID::new(1),
            created_at: OffsetDateTime::UNIX_EPOCH,
            date,
            transaction_type: TransactionType {
                id: category.type_id,
                name: kind.to_string(),
                kind,
            },
            category,
            name: format!("transaction {id}"),
            amount,
            note: String::new(),
        }
    }

    fn dollars(amount: i64) -> Decimal {
        Decimal::new(amount, 0)
    }

    #[test]
    fn partition_splits_by_kind_largest_first() {
        let transactions = vec![
            transaction(1, food(), dollars(5), date!(2025 - 03 - 01)),
            transaction(2, salary(), dollars(100), date!(2025 - 03 - 02)),
            transaction(3, housing(), dollars(50), date!(2025 - 03 - 03)),
        ];

        let partition = partition_by_type(&transactions);

        fn ids(transactions: &[Transaction]) -> Vec<i64> {
            transactions
                .iter()
                .map(|transaction| transaction.id)
                .collect()
        }
        assert_eq!(ids(&partition.expenses), vec![3, 1]);
        assert_eq!(ids(&partition.income), vec![2]);
    }

    #[test]
    fn balance_is_exact() {
        let transactions = vec![
            transaction(1, food(), Decimal::new(10, 2), date!(2025 - 03 - 01)),
            transaction(2, food(), Decimal::new(20, 2), date!(2025 - 03 - 01)),
            transaction(3, salary(), Decimal::new(30, 2), date!(2025 - 03 - 01)),
        ];

        let balance = balance_total(&partition_by_type(&transactions));

        assert_eq!(balance, Decimal::ZERO);
    }

    #[test]
    fn balance_does_not_depend_on_order() {
        let mut transactions = vec![
            transaction(1, food(), Decimal::new(1999, 2), date!(2025 - 03 - 01)),
            transaction(2, salary(), Decimal::new(100001, 2), date!(2025 - 01 - 01)),
            transaction(3, housing(), Decimal::new(50050, 2), date!(2025 - 02 - 01)),
        ];
        let want = balance_total(&partition_by_type(&transactions));

        transactions.reverse();

        assert_eq!(balance_total(&partition_by_type(&transactions)), want);
        assert_eq!(want, Decimal::new(47952, 2));
    }

    #[test]
    fn daily_summaries_follow_first_appearance() {
        let filtered = vec![
            transaction(1, salary(), dollars(100), date!(2025 - 03 - 05)),
            transaction(2, food(), dollars(10), date!(2025 - 03 - 01)),
            transaction(3, food(), Decimal::new(2525, 3), date!(2025 - 03 - 05)),
        ];

        let summaries = daily_summaries(&filtered);

        assert_eq!(
            summaries,
            vec![
                DailySummary {
                    date: date!(2025 - 03 - 05),
                    count: 2,
                    // 2.525 rounds half to even to 2.52.
                    total: Decimal::new(9748, 2),
                },
                DailySummary {
                    date: date!(2025 - 03 - 01),
                    count: 1,
                    total: dollars(-10),
                },
            ]
        );
        let total_count: usize = summaries.iter().map(|summary| summary.count).sum();
        assert_eq!(total_count, filtered.len());
    }

    #[test]
    fn current_month_scenario() {
        let today = date!(2025 - 03 - 20);
        let transactions = vec![
            transaction(1, food(), dollars(50), date!(2025 - 03 - 02)),
            transaction(2, salary(), dollars(200), date!(2025 - 03 - 15)),
            // Same month in another year is not part of the current month.
            transaction(3, food(), dollars(999), date!(2024 - 03 - 02)),
        ];
        let partition = partition_by_type(&transactions);

        let totals = current_month_totals(&partition, today);
        let shares = relative_shares(totals);

        assert_eq!(balance_total(&partition), dollars(-849));
        assert_eq!(totals.expenses, dollars(50));
        assert_eq!(totals.income, dollars(200));
        assert_eq!(shares.expenses, dollars(20));
        assert_eq!(shares.income, dollars(80));
    }

    #[test]
    fn relative_shares_are_zero_without_money_flow() {
        let shares = relative_shares(CurrentMonthTotals {
            expenses: Decimal::ZERO,
            income: Decimal::ZERO,
        });

        assert_eq!(shares.expenses, Decimal::ZERO);
        assert_eq!(shares.income, Decimal::ZERO);
    }

    #[test]
    fn relative_shares_round_half_to_even() {
        let shares = relative_shares(CurrentMonthTotals {
            expenses: dollars(57),
            income: dollars(143),
        });

        assert_eq!(shares.expenses, Decimal::new(2800, 2));
        assert_eq!(shares.income, Decimal::new(7200, 2));
    }

    #[test]
    fn relative_shares_stay_near_one_hundred() {
        for (expenses, income) in [(1, 2), (1, 1), (2, 1), (1, 6), (123, 4567)] {
            let shares = relative_shares(CurrentMonthTotals {
                expenses: dollars(expenses),
                income: dollars(income),
            });
            let total = shares.expenses + shares.income;

            assert!(shares.expenses >= Decimal::ZERO && shares.income >= Decimal::ZERO);
            assert!(
                (dollars(99)..=dollars(101)).contains(&total),
                "{expenses}/{income} gave {total}"
            );
        }
    }

    #[test]
    fn previous_months_are_most_recent_first() {
        assert_eq!(
            previous_month_names(date!(2025 - 03 - 31)),
            vec![
                Month::February,
                Month::January,
                Month::December,
                Month::November,
                Month::October,
                Month::September,
            ]
        );
    }

    #[test]
    fn months_within_a_year_belong_to_current_year() {
        let attributed = attribute_years(&previous_month_names(date!(2025 - 08 - 15)), 2025);

        assert!(attributed.iter().all(|(_, year)| *year == 2025));
        assert_eq!(attributed[0], (Month::July, 2025));
    }

    #[test]
    fn months_spanning_new_year_split_at_may() {
        let attributed = attribute_years(&previous_month_names(date!(2025 - 03 - 10)), 2025);

        assert_eq!(
            attributed,
            vec![
                (Month::February, 2025),
                (Month::January, 2025),
                (Month::December, 2024),
                (Month::November, 2024),
                (Month::October, 2024),
                (Month::September, 2024),
            ]
        );
    }

    #[test]
    fn january_attributes_last_half_year_to_current_year() {
        let attributed = attribute_years(&previous_month_names(date!(2025 - 01 - 05)), 2025);

        assert_eq!(attributed[0], (Month::December, 2025));
        assert!(attributed.iter().all(|(_, year)| *year == 2025));
    }

    #[test]
    fn trailing_months_sum_matching_month_and_year() {
        let transactions = vec![
            transaction(1, food(), dollars(10), date!(2025 - 02 - 01)),
            transaction(2, food(), dollars(5), date!(2025 - 02 - 28)),
            transaction(3, salary(), dollars(100), date!(2024 - 12 - 24)),
            // Wrong year for December.
            transaction(4, salary(), dollars(1000), date!(2023 - 12 - 24)),
            // The current month is not one of the trailing months.
            transaction(5, food(), dollars(7), date!(2025 - 03 - 01)),
        ];

        let months = trailing_six_months(&partition_by_type(&transactions), date!(2025 - 03 - 10));

        assert_eq!(months.len(), 6);
        assert_eq!(months[0].month, Month::February);
        assert_eq!(months[0].expenses, dollars(15));
        assert_eq!(months[0].income, Decimal::ZERO);
        assert_eq!(months[2].month, Month::December);
        assert_eq!(months[2].year, 2024);
        assert_eq!(months[2].income, dollars(100));
        let total_expenses: Decimal = months.iter().map(|month| month.expenses).sum();
        assert_eq!(total_expenses, dollars(15));
    }

    #[test]
    fn category_label_drops_logo_and_spaces() {
        assert_eq!(category_label(&food()), "Food");
        assert_eq!(
            category_label(&category(9, "Eating Out", "🍜", EntryType::Expense)),
            "EatingOut"
        );
    }

    #[test]
    fn category_breakdown_omits_empty_categories() {
        let today = date!(2025 - 03 - 20);
        let transactions = vec![
            transaction(1, food(), dollars(10), date!(2025 - 03 - 01)),
            // Matched on month only, the year is not checked.
            transaction(2, food(), dollars(5), date!(2024 - 03 - 01)),
            transaction(3, transport(), dollars(3), date!(2025 - 03 - 02)),
            transaction(4, housing(), dollars(900), date!(2025 - 02 - 01)),
            transaction(5, salary(), dollars(2000), date!(2025 - 03 - 01)),
        ];

        let breakdown = category_breakdown(
            &partition_by_type(&transactions),
            &[food(), housing(), transport()],
            today,
        );

        assert_eq!(breakdown.labels, vec!["Food", "Transport"]);
        assert_eq!(breakdown.values, vec![dollars(15), dollars(3)]);
    }
}
