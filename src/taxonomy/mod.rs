//! The shared transaction types and categories.

mod categories_endpoint;
mod db;
mod domain;

pub use categories_endpoint::{category_options, get_categories_endpoint};
pub use db::{
    create_taxonomy_tables, get_all_categories, get_categories_by_kind, get_categories_by_type,
    get_category, get_types, seed_taxonomy,
};
pub use domain::{Category, CategoryId, EntryType, TransactionType, TypeId};
