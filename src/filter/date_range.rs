use std::ops::RangeInclusive;

use time::Date;

use crate::{Error, html::parse_date_input};

const DATE_RANGE_SEPARATOR: &str = " - ";

/// Parse a date range written as "MM/DD/YYYY - MM/DD/YYYY" into inclusive bounds.
///
/// A range whose start is after its end is returned as is and matches no dates.
///
/// # Errors
/// Returns [Error::InvalidDateRange] holding `text` if the separator is missing
/// or either date is malformed or impossible.
pub fn parse_date_range(text: &str) -> Result<RangeInclusive<Date>, Error> {
    let invalid = || Error::InvalidDateRange(text.to_owned());

    let (start, end) = text.split_once(DATE_RANGE_SEPARATOR).ok_or_else(invalid)?;
    let start = parse_date_input(start).ok_or_else(invalid)?;
    let end = parse_date_input(end).ok_or_else(invalid)?;

    Ok(start..=end)
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::Error;

    use super::parse_date_range;

    #[test]
    fn parses_inclusive_range() {
        assert_eq!(
            parse_date_range("01/01/2024 - 01/31/2024"),
            Ok(date!(2024 - 01 - 01)..=date!(2024 - 01 - 31))
        );
    }

    #[test]
    fn rejects_malformed_ranges() {
        for text in [
            "01/01/2024",
            "01/01/2024-01/31/2024",
            "01/01/2024 - ",
            "aa/01/2024 - 01/31/2024",
            "02/30/2024 - 03/01/2024",
            "01/01/2024 - 01/31/2024 - 02/01/2024",
        ] {
            assert_eq!(
                parse_date_range(text),
                Err(Error::InvalidDateRange(text.to_owned())),
                "{text:?} should be rejected"
            );
        }
    }
}
