//! Fields derived from other cells.

use hv_model::{AgeGroup, TestResult};

use crate::clean::clean_string;

/// Age group of a normalized age; no age, no group.
pub fn age_group(age: Option<u8>) -> Option<AgeGroup> {
    age.map(AgeGroup::from_age)
}

/// Collapses a raw test-result cell onto the closed enum.
pub fn normalize_test_result(value: Option<&str>) -> TestResult {
    TestResult::from_label(clean_string(value).as_deref())
}
