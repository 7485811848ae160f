//! Per-user settings: the preferred currency, the setup flow and the preferences page.

mod core;
mod currency;
mod guard;
mod preferences_page;
mod setup_page;

pub use core::{Profile, create_profile, create_profile_table, get_profile, update_profile_currency};
pub use currency::{Currency, CurrencyId, create_currency_table, get_currencies, seed_currencies};
pub use guard::{setup_guard, setup_guard_hx};
pub use preferences_page::{get_preferences_page, update_profile_endpoint};
pub use setup_page::{ProfileForm, create_profile_endpoint, get_setup_page};
