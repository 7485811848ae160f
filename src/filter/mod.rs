//! Filters for the dashboard's entry list.
//!
//! The query parameters are parsed into [FilterParams] and applied to a
//! user's transactions by [apply_filters]. Free text searches are matched
//! against whichever field the [SearchVocabulary] says the token refers to.

mod builder;
mod date_range;
mod params;
mod vocabulary;

pub use builder::{apply_filters, intersect};
pub use date_range::parse_date_range;
pub use params::{ALL_OPTION, FilterParams};
pub use vocabulary::{SearchTarget, SearchVocabulary};
