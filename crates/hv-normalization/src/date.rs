//! Calendar date parsing and length of stay.

use chrono::NaiveDate;

use crate::clean::clean_string;

/// The only accepted date layout.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses a `YYYY-MM-DD` cell. Anything else is `None`.
pub fn parse_date(value: Option<&str>) -> Option<NaiveDate> {
    let cleaned = clean_string(value)?;
    NaiveDate::parse_from_str(&cleaned, DATE_FORMAT).ok()
}

/// Days between admission and discharge.
///
/// `None` when either date is missing or discharge precedes admission.
/// Swapped dates are a data-entry error and are not corrected.
pub fn length_of_stay_days(
    admission: Option<NaiveDate>,
    discharge: Option<NaiveDate>,
) -> Option<f64> {
    let days = discharge?.signed_duration_since(admission?).num_days();
    if days < 0 {
        return None;
    }
    Some(days as f64)
}
