//! Row normalization for HealthViz.
//!
//! Turns one untyped [`RawRecord`](hv_ingest::RawRecord) into exactly one
//! typed [`Row`](hv_model::Row). Normalization is total: every malformed
//! cell resolves to a documented null or default, never to an error.
//!
//! # Overview
//!
//! - **Strings**: trimming and null-token detection ([`clean_string`], [`clean_hospital_name`])
//! - **Numbers**: finite-only parsing with per-field range rules ([`parse_age`], [`parse_billing`])
//! - **Dates**: fixed `YYYY-MM-DD` parsing and length of stay ([`parse_date`], [`length_of_stay_days`])
//! - **Geo**: deterministic hospital placement and region buckets ([`geo`])
//!
//! # Example
//!
//! ```ignore
//! use hv_ingest::RawRecord;
//! use hv_normalization::normalize_record;
//!
//! let raw: RawRecord = [("Age", "70"), ("Test Results", "Weird")].into_iter().collect();
//! let row = normalize_record(&raw);
//! assert_eq!(row.age, Some(70));
//! ```
//!
//! # Design Principles
//!
//! - **Stateless functions**: Pure functions for easy testing and composition
//! - **Null over clamp**: Out-of-range values are discarded, not moved to the boundary

mod clean;
mod date;
mod derive;
mod numeric;
mod record;

pub mod geo;

// String cleanup
pub use clean::{NULL_TOKENS, clean_hospital_name, clean_string};

// Numbers
pub use numeric::{
    MAX_AGE, parse_age, parse_billing, parse_number, parse_room_number,
};

// Dates
pub use date::{DATE_FORMAT, length_of_stay_days, parse_date};

// Derived fields
pub use derive::{age_group, normalize_test_result};

// Geo
pub use geo::{hash_to_unit, hospital_to_lon_lat, region_for, region_for_hospital};

// Whole records
pub use record::normalize_record;
