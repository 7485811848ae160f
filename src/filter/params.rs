//! The query parameters accepted by the dashboard.

use serde::{Deserialize, Serialize};

/// The value of an advanced dropdown that places no constraint on the entries.
pub const ALL_OPTION: &str = "All";

/// The optional filters sent with a dashboard request.
///
/// Each field holds the raw text from the query string. Use the accessor
/// methods, which treat empty strings as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterParams {
    /// Exact type name, e.g. "Expense".
    #[serde(rename = "type", default)]
    pub type_name: Option<String>,
    /// Part of a category name.
    #[serde(rename = "category-search", default)]
    pub category_search: Option<String>,
    /// Exact category name.
    #[serde(rename = "category", default)]
    pub category: Option<String>,
    /// Exact type name, used together with `date`.
    #[serde(rename = "type-advanced", default)]
    pub type_advanced: Option<String>,
    /// Exact category name, used together with `date`.
    #[serde(rename = "category-advanced", default)]
    pub category_advanced: Option<String>,
    /// Two dates written as "MM/DD/YYYY - MM/DD/YYYY".
    #[serde(rename = "date", default)]
    pub date: Option<String>,
    /// A single free text token.
    #[serde(rename = "search", default)]
    pub search: Option<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn constrained(value: &Option<String>) -> Option<&str> {
    present(value).filter(|value| *value != ALL_OPTION)
}

impl FilterParams {
    pub fn type_name(&self) -> Option<&str> {
        present(&self.type_name)
    }

    pub fn category_search(&self) -> Option<&str> {
        present(&self.category_search)
    }

    pub fn category(&self) -> Option<&str> {
        present(&self.category)
    }

    /// The advanced type, `None` if it is absent or [ALL_OPTION].
    pub fn type_advanced(&self) -> Option<&str> {
        constrained(&self.type_advanced)
    }

    /// The advanced category, `None` if it is absent or [ALL_OPTION].
    pub fn category_advanced(&self) -> Option<&str> {
        constrained(&self.category_advanced)
    }

    pub fn date(&self) -> Option<&str> {
        present(&self.date)
    }

    pub fn search(&self) -> Option<&str> {
        present(&self.search)
    }

    /// Whether any filter narrows the entries.
    pub fn is_active(&self) -> bool {
        self.type_name().is_some()
            || self.category_search().is_some()
            || self.category().is_some()
            || self.date().is_some()
            || self.search().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::FilterParams;

    #[test]
    fn deserializes_hyphenated_names() {
        let params: FilterParams = serde_urlencoded::from_str(
            "type=Expense&category-search=foo&category=Food&type-advanced=Income\
            &category-advanced=Salary&date=01%2F01%2F2024+-+01%2F31%2F2024&search=rent",
        )
        .unwrap();

        assert_eq!(params.type_name(), Some("Expense"));
        assert_eq!(params.category_search(), Some("foo"));
        assert_eq!(params.category(), Some("Food"));
        assert_eq!(params.type_advanced(), Some("Income"));
        assert_eq!(params.category_advanced(), Some("Salary"));
        assert_eq!(params.date(), Some("01/01/2024 - 01/31/2024"));
        assert_eq!(params.search(), Some("rent"));
        assert!(params.is_active());
    }

    #[test]
    fn empty_values_are_absent() {
        let params: FilterParams =
            serde_urlencoded::from_str("type=&category=+&date=&search=").unwrap();

        assert_eq!(params.type_name(), None);
        assert_eq!(params.category(), None);
        assert_eq!(params.date(), None);
        assert_eq!(params.search(), None);
        assert!(!params.is_active());
    }

    #[test]
    fn all_places_no_constraint() {
        let params = FilterParams {
            type_advanced: Some("All".to_owned()),
            category_advanced: Some("All".to_owned()),
            ..Default::default()
        };

        assert_eq!(params.type_advanced(), None);
        assert_eq!(params.category_advanced(), None);
    }
}
