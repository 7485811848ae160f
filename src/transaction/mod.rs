//! Expense and income entries.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and the database functions for storing and querying it
//! - The form shared by the create and edit pages, with its validation
//! - The pages and endpoints for creating, editing and deleting transactions

mod core;
mod create_endpoint;
mod create_page;
mod delete_endpoint;
mod delete_page;
mod edit_endpoint;
mod edit_page;
mod form;

#[cfg(test)]
pub mod test_utils;

pub use core::{
    NewTransaction, Transaction, compare_base_order, create_transaction, create_transaction_table,
    delete_transaction, get_all_notes, get_user_transaction, get_user_transactions,
    update_transaction,
};
pub use create_endpoint::create_transaction_endpoint;
pub use create_page::get_create_transaction_page;
pub use delete_endpoint::delete_transaction_endpoint;
pub use delete_page::get_delete_transaction_page;
pub use edit_endpoint::edit_transaction_endpoint;
pub use edit_page::get_edit_transaction_page;
