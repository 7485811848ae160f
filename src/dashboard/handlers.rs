//! Dashboard HTTP handlers and view rendering.
//!
//! This module contains:
//! - The route handler for displaying the dashboard
//! - The view model assembled from the filtered entries and the aggregates
//! - HTML view functions for rendering the dashboard UI

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use rust_decimal::Decimal;
use time::Date;

use crate::{
    AppState, Error,
    auth::UserID,
    dashboard::{
        aggregation::{
            CategoryBreakdown, CurrentMonthTotals, DailySummary, MonthlyTotals, RelativeShares,
            balance_total, category_breakdown, current_month_totals, daily_summaries,
            partition_by_type, relative_shares, trailing_six_months,
        },
        cards::{SummaryCards, summary_cards_view},
        charts::{
            DashboardChart, categories_chart, charts_script, charts_view, previous_months_chart,
        },
        filter_form::{FilterOptions, filter_form},
        tables::{daily_summary_table, entries_table},
    },
    endpoints,
    filter::{FilterParams, SearchVocabulary, apply_filters},
    html::{HeadElement, PAGE_CONTAINER_STYLE, base, link},
    navigation::NavBar,
    profile::get_profile,
    taxonomy::{Category, EntryType, TransactionType, get_categories_by_kind, get_types},
    timezone::get_local_today,
    transaction::{Transaction, get_user_transactions},
};

/// The state needed for displaying the dashboard page.
///
/// Contains the database connection and timezone information required
/// by dashboard handlers.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading entries, the taxonomy and the profile.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Everything read from the database for one dashboard request.
struct DashboardData {
    types: Vec<TransactionType>,
    expense_categories: Vec<Category>,
    income_categories: Vec<Category>,
    /// ISO 4217 code of the user's currency, empty if the user has no profile.
    currency_abbreviation: String,
    currency_symbol: String,
    transactions: Vec<Transaction>,
    vocabulary: SearchVocabulary,
}

/// Holds all the data needed to render the dashboard.
struct DashboardViewModel {
    balance: Decimal,
    current_month: CurrentMonthTotals,
    shares: RelativeShares,
    previous_months: Vec<MonthlyTotals>,
    categories: CategoryBreakdown,
    daily_summaries: Vec<DailySummary>,
    filtered: Vec<Transaction>,
}

/// Redirects the site root to the dashboard.
pub async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}

/// Display a page with an overview of the user's entries and the entries
/// matching the filters in the query string.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
    Query(params): Query<FilterParams>,
) -> Result<Response, Error> {
    let Some(today) = get_local_today(&state.local_timezone) else {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        return Err(Error::InvalidTimezoneError(state.local_timezone));
    };

    let data = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        load_dashboard_data(user_id, &connection)?
    };

    let filtered = apply_filters(data.transactions.clone(), &params, &data.vocabulary)?;
    tracing::debug!(
        "{} of {} entries match the dashboard filters",
        filtered.len(),
        data.transactions.len()
    );

    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW);

    if data.transactions.is_empty() {
        return Ok(dashboard_no_data_view(nav_bar).into_response());
    }

    let view_model = build_view_model(&data, filtered, today);

    Ok(dashboard_view(nav_bar, &params, &data, &view_model).into_response())
}

/// Loads the taxonomy, the user's currency, the user's entries in base order
/// and the search vocabulary.
fn load_dashboard_data(user_id: UserID, connection: &Connection) -> Result<DashboardData, Error> {
    let types = get_types(connection)?;
    let expense_categories = get_categories_by_kind(EntryType::Expense, connection)?;
    let income_categories = get_categories_by_kind(EntryType::Income, connection)?;

    let (currency_abbreviation, currency_symbol) = match get_profile(user_id, connection)? {
        Some(profile) => (profile.currency.abbreviation, profile.currency.symbol),
        None => {
            tracing::warn!("user {user_id} has no profile, showing amounts without a currency");
            (String::new(), String::new())
        }
    };

    let transactions = get_user_transactions(user_id, connection)
        .inspect_err(|error| tracing::error!("could not get transactions: {error}"))?;
    let vocabulary = SearchVocabulary::load(connection)?;

    Ok(DashboardData {
        types,
        expense_categories,
        income_categories,
        currency_abbreviation,
        currency_symbol,
        transactions,
        vocabulary,
    })
}

/// Runs the aggregates over all of the user's entries, except for the daily
/// summary which covers the `filtered` entries.
fn build_view_model(
    data: &DashboardData,
    filtered: Vec<Transaction>,
    today: Date,
) -> DashboardViewModel {
    let partition = partition_by_type(&data.transactions);
    let current_month = current_month_totals(&partition, today);

    DashboardViewModel {
        balance: balance_total(&partition),
        current_month,
        shares: relative_shares(current_month),
        previous_months: trailing_six_months(&partition, today),
        categories: category_breakdown(&partition, &data.expense_categories, today),
        daily_summaries: daily_summaries(&filtered),
        filtered,
    }
}

fn build_dashboard_charts(
    view_model: &DashboardViewModel,
    currency_abbreviation: &str,
) -> [DashboardChart; 2] {
    [
        DashboardChart {
            id: "previous-months-chart",
            options: previous_months_chart(&view_model.previous_months, currency_abbreviation)
                .to_string(),
        },
        DashboardChart {
            id: "categories-chart",
            options: categories_chart(&view_model.categories, currency_abbreviation).to_string(),
        },
    ]
}

/// Renders the dashboard page when the user has no entries.
fn dashboard_no_data_view(nav_bar: NavBar) -> Markup {
    let nav_bar = nav_bar.into_html();
    let new_transaction_link = link(endpoints::NEW_TRANSACTION_VIEW, "adding an entry");

    let content = html!(
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            h2 class="text-xl font-bold"
            {
                "Nothing here yet..."
            }

            p
            {
                "Your balance and charts will show up here once you record some expenses or income.
                Get started by " (new_transaction_link) "."
            }
        }
    );

    base("Dashboard", &[], &content)
}

/// Renders the main dashboard page with the cards, charts, filter form and tables.
fn dashboard_view(
    nav_bar: NavBar,
    params: &FilterParams,
    data: &DashboardData,
    view_model: &DashboardViewModel,
) -> Markup {
    let nav_bar = nav_bar.into_html();
    let charts = build_dashboard_charts(view_model, &data.currency_abbreviation);
    let cards = SummaryCards {
        balance: view_model.balance,
        current_month: view_model.current_month,
        shares: view_model.shares,
        currency_symbol: &data.currency_symbol,
    };
    let filter_options = FilterOptions {
        types: &data.types,
        expense_categories: &data.expense_categories,
        income_categories: &data.income_categories,
    };

    let content = html!(
        (nav_bar)

        div
            id="dashboard-content"
            class="flex flex-col items-center px-2 lg:px-6 lg:py-8 mx-auto
                max-w-screen-xl text-gray-900 dark:text-white"
        {
            (summary_cards_view(&cards))
            (charts_view(&charts))
            (filter_form(params, &filter_options))
            (daily_summary_table(&view_model.daily_summaries, &data.currency_symbol))
            (entries_table(&view_model.filtered, &data.currency_symbol))
        }
    );

    let scripts = [
        HeadElement::ScriptLink("/static/echarts.6.0.0.min.js".to_owned()),
        charts_script(&charts),
    ];

    base("Dashboard", &scripts, &content)
}
