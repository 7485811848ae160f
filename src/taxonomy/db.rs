//! Database operations for transaction types and categories.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    taxonomy::{Category, CategoryId, EntryType, TransactionType, TypeId},
};

const SEED_TYPES: [(&str, EntryType); 2] =
    [("Expense", EntryType::Expense), ("Income", EntryType::Income)];

const SEED_CATEGORIES: [(&str, &str, EntryType); 10] = [
    ("Food", "🍔", EntryType::Expense),
    ("Groceries", "🛒", EntryType::Expense),
    ("Housing", "🏠", EntryType::Expense),
    ("Transport", "🚌", EntryType::Expense),
    ("Utilities", "💡", EntryType::Expense),
    ("Health", "💊", EntryType::Expense),
    ("Entertainment", "🎬", EntryType::Expense),
    ("Salary", "💼", EntryType::Income),
    ("Investments", "📈", EntryType::Income),
    ("Gifts", "🎁", EntryType::Income),
];

/// Retrieve all transaction types ordered alphabetically by name.
pub fn get_types(connection: &Connection) -> Result<Vec<TransactionType>, Error> {
    connection
        .prepare("SELECT id, name, kind FROM type ORDER BY name ASC;")?
        .query_map([], map_type_row)?
        .map(|maybe_type| maybe_type.map_err(|error| error.into()))
        .collect()
}

/// Retrieve a single category by ID.
pub fn get_category(category_id: CategoryId, connection: &Connection) -> Result<Category, Error> {
    connection
        .prepare("SELECT id, name, logo, type_id FROM category WHERE id = :id;")?
        .query_row(&[(":id", &category_id)], map_category_row)
        .map_err(|error| error.into())
}

/// Retrieve every category of every type ordered alphabetically by name.
pub fn get_all_categories(connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare("SELECT id, name, logo, type_id FROM category ORDER BY name ASC;")?
        .query_map([], map_category_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Retrieve the categories of the type `type_id` ordered alphabetically by name.
pub fn get_categories_by_type(
    type_id: TypeId,
    connection: &Connection,
) -> Result<Vec<Category>, Error> {
    connection
        .prepare(
            "SELECT id, name, logo, type_id FROM category
             WHERE type_id = :type_id
             ORDER BY name ASC;",
        )?
        .query_map(&[(":type_id", &type_id)], map_category_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Retrieve the categories of all types of `kind` ordered alphabetically by name.
pub fn get_categories_by_kind(
    kind: EntryType,
    connection: &Connection,
) -> Result<Vec<Category>, Error> {
    connection
        .prepare(
            "SELECT category.id, category.name, category.logo, category.type_id
             FROM category
             INNER JOIN type ON type.id = category.type_id
             WHERE type.kind = :kind
             ORDER BY category.name ASC;",
        )?
        .query_map(&[(":kind", &kind)], map_category_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Create the type and category tables.
pub fn create_taxonomy_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS type (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            kind TEXT NOT NULL UNIQUE CHECK (kind IN ('expense', 'income'))
        );

        CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            logo TEXT NOT NULL,
            type_id INTEGER NOT NULL,
            UNIQUE(name, type_id),
            FOREIGN KEY(type_id) REFERENCES type(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_category_type_id ON category(type_id);",
    )?;

    Ok(())
}

/// Insert the reference types and categories if they are missing.
///
/// Safe to call on every start-up.
pub fn seed_taxonomy(connection: &Connection) -> Result<(), rusqlite::Error> {
    let mut insert_type =
        connection.prepare("INSERT OR IGNORE INTO type (name, kind) VALUES (?1, ?2);")?;

    for (name, kind) in SEED_TYPES {
        insert_type.execute((name, kind))?;
    }

    let mut insert_category = connection.prepare(
        "INSERT OR IGNORE INTO category (name, logo, type_id)
         SELECT ?1, ?2, id FROM type WHERE kind = ?3;",
    )?;

    for (name, logo, kind) in SEED_CATEGORIES {
        insert_category.execute((name, logo, kind))?;
    }

    Ok(())
}

fn map_type_row(row: &Row) -> Result<TransactionType, rusqlite::Error> {
    Ok(TransactionType {
        id: row.get(0)?,
        name: row.get(1)?,
        kind: row.get(2)?,
    })
}

fn map_category_row(row: &Row) -> Result<Category, rusqlite::Error> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        logo: row.get(2)?,
        type_id: row.get(3)?,
    })
}
