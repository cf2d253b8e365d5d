//! Filter specification: the complete set of active predicate values.
//!
//! A [`FilterSpec`] is a plain value object. It is mutated one predicate at a
//! time by the UI glue (either typed through [`FilterPatch`] or textually
//! through [`FilterSpec::set`]) and compared or cached through its canonical
//! [`FilterKey`].

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::enums::{AgeGroup, TestResult, normalize_name};
use crate::error::{FilterError, Result};

/// Either "all" (predicate skipped) or an exact value to match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Choice<T> {
    All,
    Only(T),
}

impl<T> Default for Choice<T> {
    fn default() -> Self {
        Choice::All
    }
}

impl<T> Choice<T> {
    pub fn is_all(&self) -> bool {
        matches!(self, Choice::All)
    }

    pub fn as_only(&self) -> Option<&T> {
        match self {
            Choice::All => None,
            Choice::Only(value) => Some(value),
        }
    }
}

impl<T: PartialEq> Choice<T> {
    /// Returns true if the predicate is skipped or the value matches exactly.
    ///
    /// A missing row value never matches an exact choice.
    pub fn accepts(&self, value: Option<&T>) -> bool {
        match self {
            Choice::All => true,
            Choice::Only(expected) => value == Some(expected),
        }
    }
}

impl Choice<String> {
    /// String flavour of [`Choice::accepts`] that avoids allocating.
    pub fn accepts_str(&self, value: Option<&str>) -> bool {
        match self {
            Choice::All => true,
            Choice::Only(expected) => value == Some(expected.as_str()),
        }
    }
}

/// Closed billing interval `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BillingRange {
    pub min: f64,
    pub max: f64,
}

impl BillingRange {
    /// Creates a range; reversed bounds are swapped.
    ///
    /// Returns `None` if either bound is not finite.
    pub fn new(min: f64, max: f64) -> Option<Self> {
        if !min.is_finite() || !max.is_finite() {
            return None;
        }
        if min <= max {
            Some(Self { min, max })
        } else {
            Some(Self { min: max, max: min })
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Names of the independent predicates of a [`FilterSpec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FilterField {
    AgeGroup,
    Gender,
    AdmissionType,
    Condition,
    TestResult,
    BloodType,
    Insurance,
    Hospital,
    LengthOfStayMax,
    BillingRange,
    AdmissionDateFrom,
    AdmissionDateTo,
}

impl FilterField {
    pub const ALL: [FilterField; 12] = [
        FilterField::AgeGroup,
        FilterField::Gender,
        FilterField::AdmissionType,
        FilterField::Condition,
        FilterField::TestResult,
        FilterField::BloodType,
        FilterField::Insurance,
        FilterField::Hospital,
        FilterField::LengthOfStayMax,
        FilterField::BillingRange,
        FilterField::AdmissionDateFrom,
        FilterField::AdmissionDateTo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterField::AgeGroup => "ageGroup",
            FilterField::Gender => "gender",
            FilterField::AdmissionType => "admissionType",
            FilterField::Condition => "condition",
            FilterField::TestResult => "testResult",
            FilterField::BloodType => "bloodType",
            FilterField::Insurance => "insurance",
            FilterField::Hospital => "hospital",
            FilterField::LengthOfStayMax => "lengthOfStayMax",
            FilterField::BillingRange => "billingRange",
            FilterField::AdmissionDateFrom => "admissionDateFrom",
            FilterField::AdmissionDateTo => "admissionDateTo",
        }
    }
}

impl fmt::Display for FilterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FilterField {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self> {
        match normalize_name(s).as_str() {
            "agegroup" => Ok(FilterField::AgeGroup),
            "gender" => Ok(FilterField::Gender),
            "admissiontype" => Ok(FilterField::AdmissionType),
            "condition" | "medicalcondition" => Ok(FilterField::Condition),
            "testresult" | "testresults" => Ok(FilterField::TestResult),
            "bloodtype" => Ok(FilterField::BloodType),
            "insurance" | "insuranceprovider" => Ok(FilterField::Insurance),
            "hospital" | "selectedhospital" => Ok(FilterField::Hospital),
            "lengthofstaymax" | "losmax" => Ok(FilterField::LengthOfStayMax),
            "billingrange" | "billing" => Ok(FilterField::BillingRange),
            "admissiondatefrom" | "datefrom" => Ok(FilterField::AdmissionDateFrom),
            "admissiondateto" | "dateto" => Ok(FilterField::AdmissionDateTo),
            _ => Err(FilterError::UnknownField {
                name: s.to_string(),
            }),
        }
    }
}

/// The complete active query.
///
/// `Default` is the unfiltered specification (every predicate off).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    pub age_group: Choice<AgeGroup>,
    pub gender: Choice<String>,
    pub admission_type: Choice<String>,
    pub condition: Choice<String>,
    pub test_result: Choice<TestResult>,
    pub blood_type: Choice<String>,
    pub insurance: Choice<String>,
    pub selected_hospital: Option<String>,
    /// Upper bound on length of stay, in days.
    pub length_of_stay_max: Option<f64>,
    pub billing_range: Option<BillingRange>,
    /// Inclusive lower bound on admission date.
    pub admission_from: Option<NaiveDate>,
    /// Inclusive (end-of-day) upper bound on admission date.
    pub admission_to: Option<NaiveDate>,
}

impl FilterSpec {
    /// Returns true if no predicate is active.
    pub fn is_unfiltered(&self) -> bool {
        *self == FilterSpec::default()
    }

    /// Sets one predicate from its textual name and value.
    ///
    /// An empty value or `all` (any case) switches the predicate off.
    /// On error the specification is left untouched.
    pub fn set(&mut self, name: &str, value: &str) -> Result<()> {
        let field: FilterField = name.parse()?;
        self.set_field(field, value)
    }

    /// Sets one predicate from a textual value.
    pub fn set_field(&mut self, field: FilterField, value: &str) -> Result<()> {
        let value = value.trim();
        let off = value.is_empty() || value.eq_ignore_ascii_case("all");

        match field {
            FilterField::AgeGroup => {
                self.age_group = if off {
                    Choice::All
                } else {
                    Choice::Only(
                        value
                            .parse::<AgeGroup>()
                            .map_err(|reason| FilterError::invalid(field, value, reason))?,
                    )
                };
            }
            FilterField::TestResult => {
                self.test_result = if off {
                    Choice::All
                } else {
                    Choice::Only(
                        value
                            .parse::<TestResult>()
                            .map_err(|reason| FilterError::invalid(field, value, reason))?,
                    )
                };
            }
            FilterField::Gender => self.gender = text_choice(off, value),
            FilterField::AdmissionType => self.admission_type = text_choice(off, value),
            FilterField::Condition => self.condition = text_choice(off, value),
            FilterField::BloodType => self.blood_type = text_choice(off, value),
            FilterField::Insurance => self.insurance = text_choice(off, value),
            FilterField::Hospital => {
                self.selected_hospital = (!off).then(|| value.to_string());
            }
            FilterField::LengthOfStayMax => {
                self.length_of_stay_max = if off {
                    None
                } else {
                    Some(parse_finite(field, value)?)
                };
            }
            FilterField::BillingRange => {
                self.billing_range = if off {
                    None
                } else {
                    Some(parse_billing_range(value)?)
                };
            }
            FilterField::AdmissionDateFrom => {
                self.admission_from = if off {
                    None
                } else {
                    Some(parse_date(field, value)?)
                };
            }
            FilterField::AdmissionDateTo => {
                self.admission_to = if off {
                    None
                } else {
                    Some(parse_date(field, value)?)
                };
            }
        }
        Ok(())
    }

    /// Switches a single predicate off.
    pub fn clear(&mut self, field: FilterField) {
        // "all" is accepted by every field, so this cannot fail.
        let _ = self.set_field(field, "all");
    }

    /// Canonical cache key for this specification.
    ///
    /// Dates are encoded as epoch-millisecond timestamps and numbers are
    /// stripped of negative zero, so equal specifications always yield
    /// equal keys.
    pub fn key(&self) -> FilterKey {
        let canonical = CanonicalSpec {
            age_group: self.age_group.as_only().map(AgeGroup::as_str),
            gender: self.gender.as_only().map(String::as_str),
            admission_type: self.admission_type.as_only().map(String::as_str),
            condition: self.condition.as_only().map(String::as_str),
            test_result: self.test_result.as_only().map(TestResult::as_str),
            blood_type: self.blood_type.as_only().map(String::as_str),
            insurance: self.insurance.as_only().map(String::as_str),
            length_of_stay_max: self.length_of_stay_max.map(unsigned_zero),
            billing_range: self
                .billing_range
                .map(|range| [unsigned_zero(range.min), unsigned_zero(range.max)]),
            admission_date_from: self.admission_from.map(epoch_millis),
            admission_date_to: self.admission_to.map(epoch_millis),
            selected_hospital: self.selected_hospital.as_deref(),
        };
        let key = serde_json::to_string(&canonical).unwrap_or_else(|_| format!("{self:?}"));
        FilterKey(key)
    }

    /// Human-readable summary of the active predicates, `All` when none.
    pub fn describe(&self) -> String {
        let mut bits: Vec<String> = Vec::new();
        if let Some(hospital) = &self.selected_hospital {
            bits.push(hospital.clone());
        }
        if let Some(result) = self.test_result.as_only() {
            bits.push(result.to_string());
        }
        if let Some(blood) = self.blood_type.as_only() {
            bits.push(format!("Blood {blood}"));
        }
        if let Some(insurance) = self.insurance.as_only() {
            bits.push(insurance.clone());
        }
        if let Some(max) = self.length_of_stay_max {
            bits.push(format!("LOS ≤ {max}"));
        }
        if let Some(condition) = self.condition.as_only() {
            bits.push(condition.clone());
        }
        if let Some(gender) = self.gender.as_only() {
            bits.push(gender.clone());
        }
        if let Some(group) = self.age_group.as_only() {
            bits.push(group.to_string());
        }
        if let Some(admission) = self.admission_type.as_only() {
            bits.push(admission.clone());
        }
        if let Some(range) = self.billing_range {
            bits.push(format!("Billing {}–{}", range.min.round(), range.max.round()));
        }
        if let Some(from) = self.admission_from {
            bits.push(format!("From {}", from.format("%Y-%m-%d")));
        }
        if let Some(to) = self.admission_to {
            bits.push(format!("To {}", to.format("%Y-%m-%d")));
        }

        if bits.is_empty() {
            "All".to_string()
        } else {
            bits.join(" · ")
        }
    }
}

/// Fixed-order mirror of [`FilterSpec`] used only for key serialization.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CanonicalSpec<'a> {
    age_group: Option<&'a str>,
    gender: Option<&'a str>,
    admission_type: Option<&'a str>,
    condition: Option<&'a str>,
    test_result: Option<&'a str>,
    blood_type: Option<&'a str>,
    insurance: Option<&'a str>,
    length_of_stay_max: Option<f64>,
    billing_range: Option<[f64; 2]>,
    admission_date_from: Option<i64>,
    admission_date_to: Option<i64>,
    selected_hospital: Option<&'a str>,
}

/// `-0.0` compares equal to `0.0` but serializes differently.
fn unsigned_zero(value: f64) -> f64 {
    value + 0.0
}

fn epoch_millis(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::default())
        .and_utc()
        .timestamp_millis()
}

fn text_choice(off: bool, value: &str) -> Choice<String> {
    if off {
        Choice::All
    } else {
        Choice::Only(value.to_string())
    }
}

fn parse_finite(field: FilterField, value: &str) -> Result<f64> {
    match value.parse::<f64>() {
        Ok(number) if number.is_finite() => Ok(number),
        _ => Err(FilterError::invalid(field, value, "expected a finite number")),
    }
}

fn parse_date(field: FilterField, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| FilterError::invalid(field, value, "expected a YYYY-MM-DD date"))
}

/// Parses `min..max` or `min,max`.
fn parse_billing_range(value: &str) -> Result<BillingRange> {
    let field = FilterField::BillingRange;
    let (min, max) = value
        .split_once("..")
        .or_else(|| value.split_once(','))
        .ok_or_else(|| FilterError::invalid(field, value, "expected MIN..MAX"))?;
    let min = parse_finite(field, min.trim())?;
    let max = parse_finite(field, max.trim())?;
    BillingRange::new(min, max).ok_or_else(|| FilterError::invalid(field, value, "bounds must be finite"))
}

/// Canonical serialization of a [`FilterSpec`], usable as a cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FilterKey(String);

impl FilterKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A typed partial update of a [`FilterSpec`].
///
/// Only fields that are `Some` are written; the rest of the specification
/// is left as it was.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterPatch {
    pub age_group: Option<Choice<AgeGroup>>,
    pub gender: Option<Choice<String>>,
    pub admission_type: Option<Choice<String>>,
    pub condition: Option<Choice<String>>,
    pub test_result: Option<Choice<TestResult>>,
    pub blood_type: Option<Choice<String>>,
    pub insurance: Option<Choice<String>>,
    pub selected_hospital: Option<Option<String>>,
    pub length_of_stay_max: Option<Option<f64>>,
    pub billing_range: Option<Option<BillingRange>>,
    pub admission_from: Option<Option<NaiveDate>>,
    pub admission_to: Option<Option<NaiveDate>>,
}

impl FilterPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_age_group(mut self, choice: Choice<AgeGroup>) -> Self {
        self.age_group = Some(choice);
        self
    }

    pub fn with_gender(mut self, choice: Choice<String>) -> Self {
        self.gender = Some(choice);
        self
    }

    pub fn with_admission_type(mut self, choice: Choice<String>) -> Self {
        self.admission_type = Some(choice);
        self
    }

    pub fn with_condition(mut self, choice: Choice<String>) -> Self {
        self.condition = Some(choice);
        self
    }

    pub fn with_test_result(mut self, choice: Choice<TestResult>) -> Self {
        self.test_result = Some(choice);
        self
    }

    pub fn with_blood_type(mut self, choice: Choice<String>) -> Self {
        self.blood_type = Some(choice);
        self
    }

    pub fn with_insurance(mut self, choice: Choice<String>) -> Self {
        self.insurance = Some(choice);
        self
    }

    pub fn with_hospital(mut self, hospital: Option<String>) -> Self {
        self.selected_hospital = Some(hospital);
        self
    }

    pub fn with_length_of_stay_max(mut self, max: Option<f64>) -> Self {
        self.length_of_stay_max = Some(max);
        self
    }

    pub fn with_billing_range(mut self, range: Option<BillingRange>) -> Self {
        self.billing_range = Some(range);
        self
    }

    pub fn with_admission_from(mut self, date: Option<NaiveDate>) -> Self {
        self.admission_from = Some(date);
        self
    }

    pub fn with_admission_to(mut self, date: Option<NaiveDate>) -> Self {
        self.admission_to = Some(date);
        self
    }

    /// Returns true if the patch would not change anything.
    pub fn is_empty(&self) -> bool {
        *self == FilterPatch::default()
    }

    /// Writes the present fields into `spec`.
    pub fn apply_to(self, spec: &mut FilterSpec) {
        if let Some(choice) = self.age_group {
            spec.age_group = choice;
        }
        if let Some(choice) = self.gender {
            spec.gender = choice;
        }
        if let Some(choice) = self.admission_type {
            spec.admission_type = choice;
        }
        if let Some(choice) = self.condition {
            spec.condition = choice;
        }
        if let Some(choice) = self.test_result {
            spec.test_result = choice;
        }
        if let Some(choice) = self.blood_type {
            spec.blood_type = choice;
        }
        if let Some(choice) = self.insurance {
            spec.insurance = choice;
        }
        if let Some(hospital) = self.selected_hospital {
            spec.selected_hospital = hospital;
        }
        if let Some(max) = self.length_of_stay_max {
            // Non-finite bounds cannot be compared meaningfully
            spec.length_of_stay_max = max.filter(|m| m.is_finite());
        }
        if let Some(range) = self.billing_range {
            spec.billing_range = range;
        }
        if let Some(date) = self.admission_from {
            spec.admission_from = date;
        }
        if let Some(date) = self.admission_to {
            spec.admission_to = date;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_unfiltered() {
        let spec = FilterSpec::default();
        assert!(spec.is_unfiltered());
        assert_eq!(spec.describe(), "All");
    }

    #[test]
    fn set_by_name_parses_each_kind() {
        let mut spec = FilterSpec::default();
        spec.set("ageGroup", "65+").unwrap();
        spec.set("Blood Type", "O-").unwrap();
        spec.set("testResult", "Abnormal").unwrap();
        spec.set("lengthOfStayMax", "7").unwrap();
        spec.set("billingRange", "100..2500").unwrap();
        spec.set("admissionDateFrom", "2023-01-01").unwrap();
        spec.set("selectedHospital", "Mercy General").unwrap();

        assert_eq!(spec.age_group, Choice::Only(AgeGroup::Senior));
        assert_eq!(spec.blood_type, Choice::Only("O-".to_string()));
        assert_eq!(spec.test_result, Choice::Only(TestResult::Abnormal));
        assert_eq!(spec.length_of_stay_max, Some(7.0));
        assert_eq!(spec.billing_range, BillingRange::new(100.0, 2500.0));
        assert_eq!(spec.admission_from, NaiveDate::from_ymd_opt(2023, 1, 1));
        assert_eq!(spec.selected_hospital.as_deref(), Some("Mercy General"));
    }

    #[test]
    fn all_switches_predicate_off() {
        let mut spec = FilterSpec::default();
        spec.set("gender", "Male").unwrap();
        spec.set("gender", "ALL").unwrap();
        assert!(spec.gender.is_all());
        spec.set("hospital", "X").unwrap();
        spec.set("hospital", "").unwrap();
        assert!(spec.selected_hospital.is_none());
    }

    #[test]
    fn unknown_field_leaves_spec_untouched() {
        let mut spec = FilterSpec::default();
        spec.set("gender", "Female").unwrap();
        let before = spec.clone();

        let err = spec.set("shoeSize", "42").unwrap_err();
        assert!(matches!(err, FilterError::UnknownField { .. }));
        assert_eq!(spec, before);
    }

    #[test]
    fn invalid_value_leaves_spec_untouched() {
        let mut spec = FilterSpec::default();
        spec.set("lengthOfStayMax", "3").unwrap();
        let before = spec.clone();

        for (name, value) in [
            ("lengthOfStayMax", "soon"),
            ("lengthOfStayMax", "inf"),
            ("billingRange", "100"),
            ("admissionDateTo", "01/02/2023"),
            ("testResult", "Weird"),
            ("ageGroup", "old"),
        ] {
            let err = spec.set(name, value).unwrap_err();
            assert!(matches!(err, FilterError::InvalidValue { .. }), "{name}={value}");
        }
        assert_eq!(spec, before);
    }

    #[test]
    fn billing_range_swaps_reversed_bounds() {
        let mut spec = FilterSpec::default();
        spec.set("billingRange", "900, 100").unwrap();
        let range = spec.billing_range.unwrap();
        assert_eq!((range.min, range.max), (100.0, 900.0));
        assert!(range.contains(100.0));
        assert!(range.contains(900.0));
        assert!(!range.contains(900.01));
    }

    #[test]
    fn equal_specs_share_a_key() {
        let mut a = FilterSpec::default();
        let mut b = FilterSpec::default();
        a.set("admissionDateFrom", "2023-03-01").unwrap();
        b.admission_from = NaiveDate::from_ymd_opt(2023, 3, 1);
        assert_eq!(a, b);
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn negative_zero_bounds_share_a_key() {
        let mut a = FilterSpec::default();
        let mut b = FilterSpec::default();
        a.set("lengthOfStayMax", "0").unwrap();
        b.set("lengthOfStayMax", "-0").unwrap();
        a.set("billingRange", "0..500").unwrap();
        b.set("billingRange", "-0..500").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.key(), b.key());
        assert!(!b.key().as_str().contains("-0"));
    }

    #[test]
    fn distinct_specs_have_distinct_keys() {
        let base = FilterSpec::default();
        let mut gender = base.clone();
        gender.set("gender", "Male").unwrap();
        let mut literal_all = base.clone();
        literal_all.gender = Choice::Only("all".to_string());

        assert_ne!(base.key(), gender.key());
        assert_ne!(base.key(), literal_all.key());
    }

    #[test]
    fn key_encodes_dates_as_timestamps() {
        let mut spec = FilterSpec::default();
        spec.set("admissionDateFrom", "1970-01-02").unwrap();
        assert!(spec.key().as_str().contains("\"admissionDateFrom\":86400000"));
    }

    #[test]
    fn patch_only_touches_present_fields() {
        let mut spec = FilterSpec::default();
        spec.set("gender", "Female").unwrap();

        FilterPatch::new()
            .with_test_result(Choice::Only(TestResult::Normal))
            .with_length_of_stay_max(Some(f64::NAN))
            .apply_to(&mut spec);

        assert_eq!(spec.gender, Choice::Only("Female".to_string()));
        assert_eq!(spec.test_result, Choice::Only(TestResult::Normal));
        assert_eq!(spec.length_of_stay_max, None);
        assert!(FilterPatch::new().is_empty());
    }

    #[test]
    fn clear_resets_single_field() {
        let mut spec = FilterSpec::default();
        spec.set("insurance", "Medicare").unwrap();
        spec.set("gender", "Male").unwrap();
        spec.clear(FilterField::Insurance);
        assert!(spec.insurance.is_all());
        assert_eq!(spec.gender, Choice::Only("Male".to_string()));
    }
}
