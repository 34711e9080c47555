//! Date of birth helpers

use chrono::NaiveDate;

/// Parse a backend date of birth.
///
/// Accepts `YYYY-MM-DD` and anything starting with it (ISO timestamps).
pub fn parse_dob(dob: &str) -> Option<NaiveDate> {
    let dob = dob.trim();
    let day = dob.get(..10).unwrap_or(dob);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// Completed years between `dob` and `today`; `None` when unparsable or in the future
pub fn age_on(dob: &str, today: NaiveDate) -> Option<u32> {
    today.years_since(parse_dob(dob)?)
}
