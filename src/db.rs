//! Creates the application's tables and seeds the shared reference data.

use rusqlite::{Connection, Transaction as SqlTransaction};

use crate::{
    Error,
    auth::create_user_table,
    profile::{create_currency_table, create_profile_table, seed_currencies},
    taxonomy::{create_taxonomy_tables, seed_taxonomy},
    transaction::create_transaction_table,
};

/// Create the tables for the domain models and seed the reference data.
///
/// Foreign key enforcement is switched on for `connection`. Calling this
/// function on an initialized database leaves existing rows untouched.
///
/// # Errors
/// Returns an [Error::SqlError] if a table could not be created or seeded.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    // Has no effect inside a transaction, so it must come first.
    connection.execute_batch("PRAGMA foreign_keys = ON;")?;

    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_taxonomy_tables(&transaction)?;
    create_currency_table(&transaction)?;
    create_profile_table(&transaction)?;
    create_transaction_table(&transaction)?;

    seed_taxonomy(&transaction)?;
    seed_currencies(&transaction)?;

    transaction.commit()?;

    Ok(())
}
