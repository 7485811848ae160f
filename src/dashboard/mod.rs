//! Dashboard module
//!
//! Summarises a user's expenses and income and lists the entries that match
//! the filters in the query string.

mod aggregation;
mod cards;
mod charts;
mod filter_form;
mod handlers;
mod tables;

pub use handlers::{get_dashboard_page, get_index_page};
