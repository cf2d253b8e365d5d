//! Numeric cell parsing.
//!
//! Only finite values are accepted. Range rules discard offending values
//! instead of clamping them.

use crate::clean::clean_string;

/// Oldest plausible age in years.
pub const MAX_AGE: f64 = 110.0;

/// Parses a finite number.
///
/// Empty cells and null tokens are `None`, as are `NaN` and infinities.
pub fn parse_number(value: Option<&str>) -> Option<f64> {
    let cleaned = clean_string(value)?;
    cleaned.parse::<f64>().ok().filter(|x| x.is_finite())
}

/// Parses an age in whole years.
///
/// The range check happens before rounding: `110.4` is rejected, while
/// `109.6` rounds to `110`.
pub fn parse_age(value: Option<&str>) -> Option<u8> {
    let age = parse_number(value)?;
    if !(0.0..=MAX_AGE).contains(&age) {
        return None;
    }
    Some(age.round() as u8)
}

/// Parses a billing amount; negative amounts are `None`.
pub fn parse_billing(value: Option<&str>) -> Option<f64> {
    parse_number(value).filter(|amount| *amount >= 0.0)
}

/// Parses a room number, rounded to the nearest integer.
pub fn parse_room_number(value: Option<&str>) -> Option<u32> {
    let room = parse_number(value)?;
    if room < 0.0 {
        return None;
    }
    let rounded = room.round();
    if rounded > f64::from(u32::MAX) {
        return None;
    }
    Some(rounded as u32)
}
