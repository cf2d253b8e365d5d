//! Integration tests for the filter and aggregation engines.

use std::collections::BTreeSet;
use std::io::Write;
use std::sync::Arc;

use proptest::prelude::*;
use tempfile::NamedTempFile;

use hv_ingest::RawRecord;
use hv_model::{Choice, FilterSpec, TestResult};
use hv_query::{
    AggregationEngine, DatasetStore, FilterEngine, aggregate_by_hospital, aggregate_kpis,
    row_matches,
};

const HOSPITALS: [&str; 4] = ["Kim Inc", "Cook PLC", "Sons and Miller", "Smith Ltd"];
const GENDERS: [&str; 2] = ["Male", "Female"];
const CONDITIONS: [&str; 3] = ["Asthma", "Cancer", "Obesity"];
const RESULTS: [&str; 4] = ["Normal", "Abnormal", "Inconclusive", "???"];
const BLOOD: [&str; 3] = ["A+", "O-", "B+"];

fn synthetic_store(n: usize) -> DatasetStore {
    let records: Vec<RawRecord> = (0..n)
        .map(|i| {
            let age = (i * 7) % 100;
            let billing = if i % 9 == 0 {
                String::new()
            } else {
                format!("{}", (i * 137) % 5000)
            };
            let admitted = format!("2023-{:02}-{:02}", 1 + i % 12, 1 + i % 28);
            let discharged = format!("2023-{:02}-{:02}", 1 + i % 12, 1 + (i * 3) % 28);
            [
                ("Age", age.to_string()),
                ("Gender", GENDERS[i % 2].to_string()),
                ("Hospital", HOSPITALS[i % 4].to_string()),
                ("Medical Condition", CONDITIONS[i % 3].to_string()),
                ("Test Results", RESULTS[i % 4].to_string()),
                ("Blood Type", BLOOD[i % 3].to_string()),
                ("Billing Amount", billing),
                ("Date of Admission", admitted),
                ("Discharge Date", discharged),
            ]
            .into_iter()
            .collect()
        })
        .collect();
    DatasetStore::build(&records)
}

#[test]
fn test_cached_subset_is_shared() {
    let store = synthetic_store(200);
    let mut engine = FilterEngine::default();
    let mut spec = FilterSpec::default();
    spec.set("gender", "Female").unwrap();

    let a = engine.filter(&store, &spec);
    let b = engine.filter(&store, &spec);
    assert!(Arc::ptr_eq(&a, &b));
    assert!(a.iter().all(|row| row.gender.as_deref() == Some("Female")));
}

#[test]
fn test_eviction_recomputes_oldest_only() {
    let store = synthetic_store(100);
    let capacity = 5;
    let mut engine = FilterEngine::with_capacity(capacity);

    let specs: Vec<FilterSpec> = (0..=capacity)
        .map(|i| FilterSpec {
            length_of_stay_max: Some(i as f64),
            ..FilterSpec::default()
        })
        .collect();

    let first_results: Vec<_> = specs.iter().map(|s| engine.filter(&store, s)).collect();
    assert_eq!(engine.stats().misses, (capacity + 1) as u64);
    assert_eq!(engine.stats().evictions, 1);

    // Everything but the first is still memoized
    for (spec, earlier) in specs.iter().zip(&first_results).skip(1) {
        assert!(Arc::ptr_eq(&engine.filter(&store, spec), earlier));
    }
    assert_eq!(engine.stats().hits, capacity as u64);

    let recomputed = engine.filter(&store, &specs[0]);
    assert!(!Arc::ptr_eq(&recomputed, &first_results[0]));
    assert_eq!(recomputed.indices(), first_results[0].indices());
    assert_eq!(engine.stats().misses, (capacity + 2) as u64);
}

#[test]
fn test_reset_reproduces_unfiltered_snapshot() {
    let store = synthetic_store(300);
    let mut filters = FilterEngine::with_capacity(2);
    let mut aggregates = AggregationEngine::with_capacity(2);

    let baseline = aggregates.snapshot(&filters.filter(&store, &FilterSpec::default()));

    let mut spec = FilterSpec::default();
    for (name, value) in [
        ("hospital", "Kim Inc"),
        ("billingRange", "100..4000"),
        ("testResult", "Normal"),
        ("lengthOfStayMax", "10"),
    ] {
        spec.set(name, value).unwrap();
        let _ = aggregates.snapshot(&filters.filter(&store, &spec));
    }

    let reset = aggregates.snapshot(&filters.filter(&store, &FilterSpec::default()));
    assert_eq!(reset, baseline);
    assert_eq!(reset.scalars.count, 300);
}

#[test]
fn test_equal_size_subsets_do_not_share_aggregates() {
    // Two subsets with the same size and endpoints but different middles
    let records: Vec<RawRecord> = [
        ("X", "Normal", "100"),
        ("Y", "Normal", "200"),
        ("Z", "Abnormal", "900"),
        ("X", "Abnormal", "100"),
    ]
    .iter()
    .map(|(hospital, result, billing)| {
        [
            ("Hospital", *hospital),
            ("Test Results", *result),
            ("Billing Amount", *billing),
        ]
        .into_iter()
        .collect()
    })
    .collect();
    let store = DatasetStore::build(&records);
    let mut filters = FilterEngine::default();
    let mut aggregates = AggregationEngine::default();

    let mut normal = FilterSpec::default();
    normal.test_result = Choice::Only(TestResult::Normal);
    let mut abnormal = FilterSpec::default();
    abnormal.test_result = Choice::Only(TestResult::Abnormal);

    let a = aggregates.kpis(&filters.filter(&store, &normal));
    let b = aggregates.kpis(&filters.filter(&store, &abnormal));
    assert_eq!(a.total_billing, 300.0);
    assert_eq!(b.total_billing, 1000.0);
}

#[test]
fn test_load_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        "Age,Hospital,Billing Amount,Test Results\n70,Kim Inc,500,Weird\n30,Cook PLC,-1,Normal\n"
    )
    .unwrap();

    let store = DatasetStore::load(file.path()).unwrap();
    assert_eq!(store.len(), 2);
    assert_eq!(store.all()[0].test_result, TestResult::Inconclusive);
    assert_eq!(store.all()[1].billing_amount, None);
}

#[test]
fn test_load_missing_file_fails() {
    let result = DatasetStore::load(std::path::Path::new("/no/such/file.csv"));
    assert!(matches!(result, Err(hv_ingest::IngestError::FileNotFound { .. })));
}

fn equality_constraint() -> impl Strategy<Value = (&'static str, &'static str)> {
    prop_oneof![
        proptest::sample::select(HOSPITALS.to_vec()).prop_map(|h| ("hospital", h)),
        proptest::sample::select(GENDERS.to_vec()).prop_map(|g| ("gender", g)),
        proptest::sample::select(CONDITIONS.to_vec()).prop_map(|c| ("condition", c)),
        proptest::sample::select(BLOOD.to_vec()).prop_map(|b| ("bloodType", b)),
        proptest::sample::select(vec!["Normal", "Abnormal", "Inconclusive"])
            .prop_map(|r| ("testResult", r)),
        proptest::sample::select(vec!["0-18", "19-40", "41-65", "65+"])
            .prop_map(|a| ("ageGroup", a)),
    ]
}

fn range_constraint() -> impl Strategy<Value = (&'static str, String)> {
    prop_oneof![
        (0u32..5000, 0u32..5000).prop_map(|(a, b)| ("billingRange", format!("{a}..{b}"))),
        (0u32..30).prop_map(|d| ("lengthOfStayMax", d.to_string())),
        (1u32..=12).prop_map(|m| ("admissionDateFrom", format!("2023-{m:02}-01"))),
        (1u32..=12).prop_map(|m| ("admissionDateTo", format!("2023-{m:02}-15"))),
    ]
}

proptest! {
    #[test]
    fn engines_agree_with_a_plain_scan(
        equalities in proptest::collection::vec(equality_constraint(), 0..3),
        ranges in proptest::collection::vec(range_constraint(), 0..3),
    ) {
        let store = synthetic_store(150);
        let mut filters = FilterEngine::with_capacity(3);
        let mut aggregates = AggregationEngine::with_capacity(3);

        let mut spec = FilterSpec::default();
        for (name, value) in &equalities {
            spec.set(name, value).unwrap();
        }
        for (name, value) in &ranges {
            spec.set(name, value).unwrap();
        }

        let expected: Vec<usize> = store
            .all()
            .iter()
            .enumerate()
            .filter(|(_, row)| row_matches(row, &spec))
            .map(|(idx, _)| idx)
            .collect();
        let subset = filters.filter(&store, &spec);
        prop_assert_eq!(subset.indices(), expected.as_slice());

        let kpis = aggregates.kpis(&subset);
        let rows: Vec<_> = expected.iter().map(|&idx| &store.all()[idx]).collect();
        let total: f64 = rows.iter().filter_map(|row| row.billing_amount).sum();
        let stays: Vec<f64> = rows.iter().filter_map(|row| row.length_of_stay_days).collect();
        let hospitals: BTreeSet<&str> = rows.iter().filter_map(|row| row.hospital.as_deref()).collect();

        prop_assert_eq!(kpis.count, rows.len());
        prop_assert!((kpis.total_billing - total).abs() < 1e-6);
        if rows.is_empty() {
            prop_assert_eq!(kpis.avg_billing, 0.0);
        } else {
            prop_assert!((kpis.avg_billing - total / rows.len() as f64).abs() < 1e-6);
        }
        match kpis.avg_length_of_stay {
            Some(avg) => {
                let mean = stays.iter().sum::<f64>() / stays.len() as f64;
                prop_assert!((avg - mean).abs() < 1e-9);
            }
            None => prop_assert!(stays.is_empty()),
        }
        prop_assert_eq!(kpis.distinct_hospitals, hospitals.len());
        prop_assert_eq!(&*kpis, &aggregate_kpis(rows.iter().copied()));

        let by_hospital = aggregate_by_hospital(rows.iter().copied());
        prop_assert_eq!(by_hospital.iter().map(|h| h.count).sum::<usize>(), rows.len());
    }

    #[test]
    fn adding_an_equality_constraint_restricts(
        base in proptest::collection::vec(equality_constraint(), 0..3),
        extra in equality_constraint(),
    ) {
        // The extra constraint must be a new predicate, not a replacement
        prop_assume!(base.iter().all(|(name, _)| *name != extra.0));

        let store = synthetic_store(120);
        let mut engine = FilterEngine::default();

        let mut s1 = FilterSpec::default();
        for (name, value) in &base {
            s1.set(name, value).unwrap();
        }
        let mut s2 = s1.clone();
        s2.set(extra.0, extra.1).unwrap();

        let wide = engine.filter(&store, &s1);
        let narrow = engine.filter(&store, &s2);
        for idx in narrow.indices() {
            prop_assert!(wide.indices().binary_search(idx).is_ok());
        }
    }

    #[test]
    fn repeated_filter_returns_identical_reference(
        constraints in proptest::collection::vec(equality_constraint(), 0..4),
    ) {
        let store = synthetic_store(60);
        let mut engine = FilterEngine::default();
        let mut spec = FilterSpec::default();
        for (name, value) in &constraints {
            spec.set(name, value).unwrap();
        }
        let a = engine.filter(&store, &spec);
        let b = engine.filter(&store, &spec);
        prop_assert!(Arc::ptr_eq(&a, &b));
    }
}
