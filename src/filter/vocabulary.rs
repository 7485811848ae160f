//! Decides which field a free text search token refers to.

use std::collections::HashSet;

use rusqlite::Connection;

use crate::{
    Error,
    taxonomy::{get_all_categories, get_types},
    transaction::get_all_notes,
};

/// The field of a transaction that a search token is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchTarget {
    Type,
    Category,
    Note,
    Name,
}

/// The known type names, category names and note words, all lowercase.
///
/// Loaded from the shared type and category tables and the notes of every user.
#[derive(Debug, Default)]
pub struct SearchVocabulary {
    type_names: HashSet<String>,
    category_names: HashSet<String>,
    note_words: HashSet<String>,
}

impl SearchVocabulary {
    pub fn load(connection: &Connection) -> Result<Self, Error> {
        let type_names = get_types(connection)?
            .into_iter()
            .map(|transaction_type| transaction_type.name.to_lowercase())
            .collect();
        let category_names = get_all_categories(connection)?
            .into_iter()
            .map(|category| category.name.to_lowercase())
            .collect();
        let notes = get_all_notes(connection)?;

        Ok(Self::new(type_names, category_names, &notes))
    }

    fn new(type_names: HashSet<String>, category_names: HashSet<String>, notes: &[String]) -> Self {
        let note_words = notes
            .iter()
            .flat_map(|note| note.split_whitespace())
            .map(str::to_lowercase)
            .collect();

        Self {
            type_names,
            category_names,
            note_words,
        }
    }

    /// Match `token` against type names, then category names, then note
    /// words, falling back to the transaction name.
    pub fn classify(&self, token: &str) -> SearchTarget {
        let token = token.trim().to_lowercase();

        if self.type_names.contains(&token) {
            SearchTarget::Type
        } else if self.category_names.contains(&token) {
            SearchTarget::Category
        } else if self.note_words.contains(&token) {
            SearchTarget::Note
        } else {
            SearchTarget::Name
        }
    }
}
