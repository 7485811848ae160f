//! The currencies a user can choose from.

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{Error, database_id::DatabaseId};

/// Database identifier for a currency.
pub type CurrencyId = DatabaseId;

const SEED_CURRENCIES: [(&str, &str, &str); 8] = [
    ("Australian Dollar", "AUD", "$"),
    ("British Pound", "GBP", "£"),
    ("Canadian Dollar", "CAD", "$"),
    ("Euro", "EUR", "€"),
    ("Indian Rupee", "INR", "₹"),
    ("Japanese Yen", "JPY", "¥"),
    ("New Zealand Dollar", "NZD", "$"),
    ("US Dollar", "USD", "$"),
];

/// A currency, e.g. "€ Euro, EUR".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    pub id: CurrencyId,
    pub name: String,
    /// The ISO 4217 code, e.g. "EUR".
    pub abbreviation: String,
    pub symbol: String,
}

impl Currency {
    /// The symbol, name and abbreviation, e.g. "€ Euro, EUR".
    pub fn display(&self) -> String {
        format!("{} {}, {}", self.symbol, self.name, self.abbreviation)
    }
}

/// Retrieve all currencies ordered alphabetically by name.
pub fn get_currencies(connection: &Connection) -> Result<Vec<Currency>, Error> {
    connection
        .prepare("SELECT id, name, abbreviation, symbol FROM currency ORDER BY name ASC;")?
        .query_map([], map_currency_row)?
        .map(|maybe_currency| maybe_currency.map_err(|error| error.into()))
        .collect()
}

/// Create the currency table.
pub fn create_currency_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS currency (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            abbreviation TEXT NOT NULL UNIQUE,
            symbol TEXT NOT NULL
        );",
    )?;

    Ok(())
}

/// Insert the reference currencies if they are missing.
pub fn seed_currencies(connection: &Connection) -> Result<(), rusqlite::Error> {
    let mut statement = connection.prepare(
        "INSERT OR IGNORE INTO currency (name, abbreviation, symbol) VALUES (?1, ?2, ?3);",
    )?;

    for currency in SEED_CURRENCIES {
        statement.execute(currency)?;
    }

    Ok(())
}

pub(super) fn map_currency_row(row: &Row) -> Result<Currency, rusqlite::Error> {
    Ok(Currency {
        id: row.get(0)?,
        name: row.get(1)?,
        abbreviation: row.get(2)?,
        symbol: row.get(3)?,
    })
}
