//! The lookup that fills the category dropdown after a type is chosen.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    taxonomy::{Category, CategoryId, TypeId, get_categories_by_type},
};

/// The `<option>` elements for a category `<select>`.
///
/// The first option is an empty placeholder so that no category is chosen by accident.
pub fn category_options(categories: &[Category], selected: Option<CategoryId>) -> Markup {
    html! {
        option value="" { "Select category..." }

        @for category in categories {
            option value=(category.id) selected[Some(category.id) == selected] {
                (category.display())
            }
        }
    }
}

/// The state needed to look up categories.
#[derive(Debug, Clone)]
pub struct CategoriesState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategoriesState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The query string of the category lookup.
///
/// `type_id` is kept as text because the type dropdown sends an empty string
/// while nothing is selected.
#[derive(Debug, Deserialize)]
pub struct CategoriesQuery {
    #[serde(default)]
    pub type_id: Option<String>,
}

/// Responds with the category options for the type in the query string.
///
/// A missing or non-numeric type ID yields only the placeholder option.
pub async fn get_categories_endpoint(
    State(state): State<CategoriesState>,
    Query(query): Query<CategoriesQuery>,
) -> Response {
    let type_id = query
        .type_id
        .as_deref()
        .and_then(|type_id| type_id.trim().parse::<TypeId>().ok());

    let Some(type_id) = type_id else {
        return category_options(&[], None).into_response();
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match get_categories_by_type(type_id, &connection) {
        Ok(categories) => category_options(&categories, None).into_response(),
        Err(error) => {
            tracing::error!("could not get categories for type {type_id}: {error}");
            error.into_alert_response()
        }
    }
}
