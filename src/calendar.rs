//! Spanish month and weekday vocabularies accepted by the date queries.

use crate::error::QueryError;
use chrono::{Month, Weekday};

pub const MONTH_NAMES: [(&str, Month); 12] = [
    ("enero", Month::January),
    ("febrero", Month::February),
    ("marzo", Month::March),
    ("abril", Month::April),
    ("mayo", Month::May),
    ("junio", Month::June),
    ("julio", Month::July),
    ("agosto", Month::August),
    ("septiembre", Month::September),
    ("octubre", Month::October),
    ("noviembre", Month::November),
    ("diciembre", Month::December),
];

// Accents are part of the name: "miercoles" is rejected.
pub const WEEKDAY_NAMES: [(&str, Weekday); 7] = [
    ("lunes", Weekday::Mon),
    ("martes", Weekday::Tue),
    ("miércoles", Weekday::Wed),
    ("jueves", Weekday::Thu),
    ("viernes", Weekday::Fri),
    ("sábado", Weekday::Sat),
    ("domingo", Weekday::Sun),
];

/// Resolves a Spanish month name, ignoring case.
///
/// # Errors
/// Returns `QueryError::InvalidMonthName` for anything outside the 12 names,
/// numbers included.
pub fn parse_month(name: &str) -> Result<Month, QueryError> {
    let needle = name.to_lowercase();
    MONTH_NAMES
        .iter()
        .find(|(candidate, _)| *candidate == needle)
        .map(|(_, month)| *month)
        .ok_or_else(|| QueryError::InvalidMonthName(name.to_string()))
}

/// Resolves a Spanish weekday name, ignoring case.
///
/// # Errors
/// Returns `QueryError::InvalidDayName` for anything outside the 7 names.
pub fn parse_weekday(name: &str) -> Result<Weekday, QueryError> {
    let needle = name.to_lowercase();
    WEEKDAY_NAMES
        .iter()
        .find(|(candidate, _)| *candidate == needle)
        .map(|(_, weekday)| *weekday)
        .ok_or_else(|| QueryError::InvalidDayName(name.to_string()))
}
