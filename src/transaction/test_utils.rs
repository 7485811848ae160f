//! Fixtures shared by the transaction tests.

use rusqlite::Connection;
use rust_decimal::Decimal;
use time::Date;

use crate::{
    auth::{PasswordHash, User, Username, create_user},
    taxonomy::{Category, EntryType, get_categories_by_kind},
    transaction::NewTransaction,
};

pub fn create_test_user(username: &str, connection: &Connection) -> User {
    create_user(
        Username::new_unchecked(username),
        PasswordHash::new_unchecked("hunter2"),
        connection,
    )
    .expect("Could not create test user")
}

/// The seeded category called `name`.
pub fn must_get_category(name: &str, connection: &Connection) -> Category {
    [EntryType::Expense, EntryType::Income]
        .into_iter()
        .flat_map(|kind| get_categories_by_kind(kind, connection).unwrap())
        .find(|category| category.name == name)
        .unwrap_or_else(|| panic!("no category called {name}"))
}

/// A new transaction in the seeded category `category_name`.
pub fn new_transaction(
    category_name: &str,
    name: &str,
    amount: Decimal,
    date: Date,
    connection: &Connection,
) -> NewTransaction {
    let category = must_get_category(category_name, connection);

    NewTransaction {
        date,
        type_id: category.type_id,
        category_id: category.id,
        name: name.to_owned(),
        amount,
        note: String::new(),
    }
}
