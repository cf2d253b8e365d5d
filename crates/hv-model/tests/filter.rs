//! Integration tests for filter specifications and selection labels.

use chrono::NaiveDate;
use insta::assert_snapshot;

use hv_model::{AgeGroup, BillingRange, Choice, FilterField, FilterPatch, FilterSpec, TestResult};

#[test]
fn test_describe_unfiltered() {
    assert_snapshot!(FilterSpec::default().describe(), @"All");
}

#[test]
fn test_describe_follows_label_order() {
    let mut spec = FilterSpec::default();
    // Set in a different order than the label renders
    spec.set("admissionDateTo", "2023-12-31").unwrap();
    spec.set("ageGroup", "19-40").unwrap();
    spec.set("billingRange", "99.6..2500.4").unwrap();
    spec.set("gender", "Female").unwrap();
    spec.set("bloodType", "A+").unwrap();
    spec.set("hospital", "Mercy General").unwrap();
    spec.set("lengthOfStayMax", "7").unwrap();
    spec.set("testResult", "Abnormal").unwrap();

    assert_snapshot!(
        spec.describe(),
        @"Mercy General · Abnormal · Blood A+ · LOS ≤ 7 · Female · 19–40 · Billing 100–2500 · To 2023-12-31"
    );
}

#[test]
fn test_describe_fractional_stay_bound() {
    let mut spec = FilterSpec::default();
    spec.set("lengthOfStayMax", "2.5").unwrap();
    spec.set("insurance", "Cigna").unwrap();
    assert_snapshot!(spec.describe(), @"Cigna · LOS ≤ 2.5");
}

#[test]
fn test_patch_and_textual_set_agree() {
    let mut textual = FilterSpec::default();
    textual.set("age-group", "65+").unwrap();
    textual.set("test_result", "Normal").unwrap();
    textual.set("billing", "500,100").unwrap();
    textual.set("dateFrom", "2022-06-01").unwrap();

    let mut typed = FilterSpec::default();
    FilterPatch::new()
        .with_age_group(Choice::Only(AgeGroup::Senior))
        .with_test_result(Choice::Only(TestResult::Normal))
        .with_billing_range(BillingRange::new(100.0, 500.0))
        .with_admission_from(NaiveDate::from_ymd_opt(2022, 6, 1))
        .apply_to(&mut typed);

    assert_eq!(textual, typed);
    assert_eq!(textual.key(), typed.key());
}

#[test]
fn test_reset_restores_default_key() {
    let default_key = FilterSpec::default().key();

    let mut spec = FilterSpec::default();
    spec.set("condition", "Diabetes").unwrap();
    assert_ne!(spec.key(), default_key);

    for field in FilterField::ALL {
        spec.clear(field);
    }
    assert!(spec.is_unfiltered());
    assert_eq!(spec.key(), default_key);
}

#[test]
fn test_field_names_round_trip_through_display() {
    for field in FilterField::ALL {
        let parsed: FilterField = field.to_string().parse().unwrap();
        assert_eq!(parsed, field);
    }
}
