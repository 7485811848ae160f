//! Core types for the shared transaction types and categories.

use std::{fmt::Display, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

use crate::database_id::DatabaseId;

/// Database identifier for a transaction type.
pub type TypeId = DatabaseId;

/// Database identifier for a category.
pub type CategoryId = DatabaseId;

/// Whether money was spent or earned.
///
/// Stored in the database as the text `expense` or `income`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Expense,
    Income,
}

impl EntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Expense => "expense",
            EntryType::Income => "income",
        }
    }
}

impl FromStr for EntryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "expense" => Ok(EntryType::Expense),
            "income" => Ok(EntryType::Income),
            other => Err(format!("unknown entry type \"{other}\"")),
        }
    }
}

impl Display for EntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ToSql for EntryType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for EntryType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: String| FromSqlError::Other(error.into()))
    }
}

/// A transaction type, e.g. "Expense" or "Income".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct TransactionType {
    pub id: TypeId,
    pub name: String,
    pub kind: EntryType,
}

/// A category for transactions of one type, e.g. "🛒 Groceries".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    /// An icon glyph shown in front of the name.
    pub logo: String,
    pub type_id: TypeId,
}

impl Category {
    /// The logo and name, e.g. "🍔 Food".
    pub fn display(&self) -> String {
        format!("{} {}", self.logo, self.name)
    }
}
