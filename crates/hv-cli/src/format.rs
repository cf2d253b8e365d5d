//! Display formatting for money, counts, stays and shares.
//!
//! Missing and non-finite values render as an em dash.

use chrono::NaiveDate;

/// Placeholder for a missing value.
pub const MISSING: &str = "—";

/// Compact currency: `$950`, `$1.2K`, `$3.4M`, `$1.0B`.
pub fn format_money(value: Option<f64>) -> String {
    let Some(value) = value.filter(|v| v.is_finite()) else {
        return MISSING.to_string();
    };
    let sign = if value < 0.0 { "-" } else { "" };
    let abs = value.abs();
    if abs >= 1e9 {
        format!("{sign}${:.1}B", abs / 1e9)
    } else if abs >= 1e6 {
        format!("{sign}${:.1}M", abs / 1e6)
    } else if abs >= 1e3 {
        format!("{sign}${:.1}K", abs / 1e3)
    } else {
        format!("{sign}${abs:.0}")
    }
}

pub fn format_count(value: usize) -> String {
    group_thousands(&value.to_string())
}

/// Average stay as shown on the KPI strip: `4.2 days`.
///
/// A zero average renders as missing, like an empty subset.
pub fn format_avg_stay(days: Option<f64>) -> String {
    match days.filter(|d| d.is_finite() && *d != 0.0) {
        Some(days) => format!("{days:.1} days"),
        None => MISSING.to_string(),
    }
}

pub fn format_date_range(bounds: Option<(NaiveDate, NaiveDate)>) -> String {
    match bounds {
        Some((min, max)) => format!("{min} to {max}"),
        None => MISSING.to_string(),
    }
}

/// Share of `part` in `total` with one decimal: `33.3%`.
pub fn format_percent(part: usize, total: usize) -> String {
    if total == 0 {
        return MISSING.to_string();
    }
    format!("{:.1}%", part as f64 * 100.0 / total as f64)
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
