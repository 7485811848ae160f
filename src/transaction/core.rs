//! Defines the core data models and database queries for transactions.

use std::cmp::Ordering;

use rusqlite::{Connection, Row, types::Type};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    auth::UserID,
    database_id::TransactionId,
    taxonomy::{Category, CategoryId, EntryType, TransactionType, TypeId},
};

// ============================================================================
// MODELS
// ============================================================================

/// An expense or income entry, i.e. an event where money was either spent or earned.
///
/// The type and category are joined in when the transaction is read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    /// The user that owns the transaction.
    pub user_id: UserID,
    /// When the transaction was recorded.
    pub created_at: OffsetDateTime,
    /// When the transaction happened.
    pub date: Date,
    pub transaction_type: TransactionType,
    pub category: Category,
    pub name: String,
    /// The amount spent or earned. Never negative, the type says which.
    pub amount: Decimal,
    /// An optional free text note, empty if the user left it blank.
    pub note: String,
}

impl Transaction {
    /// Whether the transaction is an expense or income.
    pub fn kind(&self) -> EntryType {
        self.transaction_type.kind
    }
}

/// The validated fields of a transaction that is about to be created or replaced.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub date: Date,
    pub type_id: TypeId,
    pub category_id: CategoryId,
    pub name: String,
    pub amount: Decimal,
    pub note: String,
}

/// Orders transactions by date descending, then amount descending, then name ascending.
pub fn compare_base_order(a: &Transaction, b: &Transaction) -> Ordering {
    b.date
        .cmp(&a.date)
        .then_with(|| b.amount.cmp(&a.amount))
        .then_with(|| a.name.cmp(&b.name))
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

const SELECT_TRANSACTION: &str = "SELECT
        t.id, t.user_id, t.created_at, t.date, t.name, t.amount, t.note,
        type.id, type.name, type.kind,
        category.id, category.name, category.logo, category.type_id
    FROM \"transaction\" t
    INNER JOIN type ON type.id = t.type_id
    INNER JOIN category ON category.id = t.category_id";

/// Create the transaction table.
///
/// Deleting a user deletes their transactions.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            date TEXT NOT NULL,
            type_id INTEGER NOT NULL,
            category_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            amount TEXT NOT NULL,
            note TEXT NOT NULL DEFAULT '',
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
            FOREIGN KEY(type_id) REFERENCES type(id) ON UPDATE CASCADE ON DELETE CASCADE,
            FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date);",
    )?;

    Ok(())
}

/// Create a transaction owned by `user_id` and return it.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidReference] if the user, type or category does not exist,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    user_id: UserID,
    transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection.execute(
        "INSERT INTO \"transaction\" (user_id, created_at, date, type_id, category_id, name, amount, note)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        (
            user_id.as_i64(),
            OffsetDateTime::now_utc(),
            transaction.date,
            transaction.type_id,
            transaction.category_id,
            &transaction.name,
            transaction.amount.to_string(),
            &transaction.note,
        ),
    )?;

    let id = connection.last_insert_rowid();

    get_user_transaction(id, user_id, connection)
}

/// Retrieve the transaction `id` if it is owned by `user_id`.
///
/// # Errors
/// Returns [Error::NotFound] if the transaction does not exist or belongs to another user.
pub fn get_user_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(&format!(
            "{SELECT_TRANSACTION} WHERE t.id = :id AND t.user_id = :user_id"
        ))?
        .query_row(
            &[(":id", &id), (":user_id", &user_id.as_i64())],
            map_transaction_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve every transaction owned by `user_id`.
///
/// The transactions are sorted by date descending, then amount descending,
/// then name ascending.
pub fn get_user_transactions(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let mut transactions = connection
        .prepare(&format!("{SELECT_TRANSACTION} WHERE t.user_id = :user_id"))?
        .query_map(&[(":user_id", &user_id.as_i64())], map_transaction_row)?
        .collect::<Result<Vec<_>, rusqlite::Error>>()?;

    // Amounts are stored as text, so SQLite cannot order them numerically.
    transactions.sort_by(compare_base_order);

    Ok(transactions)
}

/// Replace every field of the transaction `id` except its owner and creation time.
///
/// # Errors
/// Returns [Error::UpdateMissingTransaction] if the transaction does not exist
/// or belongs to another user.
pub fn update_transaction(
    id: TransactionId,
    user_id: UserID,
    transaction: NewTransaction,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE \"transaction\"
         SET date = ?1, type_id = ?2, category_id = ?3, name = ?4, amount = ?5, note = ?6
         WHERE id = ?7 AND user_id = ?8",
        (
            transaction.date,
            transaction.type_id,
            transaction.category_id,
            &transaction.name,
            transaction.amount.to_string(),
            &transaction.note,
            id,
            user_id.as_i64(),
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingTransaction);
    }

    Ok(())
}

/// Delete the transaction `id` if it is owned by `user_id`.
///
/// # Errors
/// Returns [Error::DeleteMissingTransaction] if the transaction does not exist
/// or belongs to another user.
pub fn delete_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTransaction);
    }

    Ok(())
}

/// The non-empty notes of every transaction of every user.
pub fn get_all_notes(connection: &Connection) -> Result<Vec<String>, Error> {
    connection
        .prepare("SELECT note FROM \"transaction\" WHERE note != ''")?
        .query_map([], |row| row.get(0))?
        .map(|maybe_note| maybe_note.map_err(|error| error.into()))
        .collect()
}

/// Map a row selected with the columns of `SELECT_TRANSACTION` to a [Transaction].
fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let raw_amount: String = row.get(5)?;
    let amount = raw_amount.parse::<Decimal>().map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(error))
    })?;

    Ok(Transaction {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        created_at: row.get(2)?,
        date: row.get(3)?,
        name: row.get(4)?,
        amount,
        note: row.get(6)?,
        transaction_type: TransactionType {
            id: row.get(7)?,
            name: row.get(8)?,
            kind: row.get(9)?,
        },
        category: Category {
            id: row.get(10)?,
            name: row.get(11)?,
            logo: row.get(12)?,
            type_id: row.get(13)?,
        },
    })
}
