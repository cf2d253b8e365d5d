//! Single-pass aggregation and its memoizing engine.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use hv_model::{
    AggregateSnapshot, CategoricalField, CategoryStats, HospitalStats, KpiScalars, Row, TestResult,
    TestResultCounts,
};

use crate::filter::{FilteredSubset, SubsetFingerprint};
use crate::memo::{CacheStats, MemoTable};

/// Default number of memoized aggregates of each kind.
pub const DEFAULT_AGGREGATE_CACHE_CAPACITY: usize = 20;

/// Headline KPIs in one pass.
///
/// Missing billing amounts add nothing to the total but still count as
/// rows, so `avg_billing` is `total_billing / count`.
pub fn aggregate_kpis<'a, I>(rows: I) -> KpiScalars
where
    I: IntoIterator<Item = &'a Row>,
{
    let mut count = 0usize;
    let mut total_billing = 0.0;
    let mut stay_sum = 0.0;
    let mut stay_count = 0usize;
    let mut hospitals: HashSet<&str> = HashSet::new();

    for row in rows {
        count += 1;
        total_billing += row.billing_amount.unwrap_or(0.0);
        if let Some(days) = row.length_of_stay_days {
            stay_sum += days;
            stay_count += 1;
        }
        if let Some(hospital) = row.hospital.as_deref() {
            hospitals.insert(hospital);
        }
    }

    KpiScalars {
        count,
        total_billing,
        avg_billing: if count > 0 {
            total_billing / count as f64
        } else {
            0.0
        },
        avg_length_of_stay: (stay_count > 0).then(|| stay_sum / stay_count as f64),
        distinct_hospitals: hospitals.len(),
    }
}

/// Running test-result tally that remembers the first result to reach the
/// current maximum.
#[derive(Debug, Default)]
struct DominantTally {
    counts: TestResultCounts,
    leader: Option<(TestResult, usize)>,
}

impl DominantTally {
    fn observe(&mut self, result: TestResult) {
        self.counts.increment(result);
        let count = self.counts.get(result);
        match self.leader {
            Some((_, max)) if count <= max => {}
            _ => self.leader = Some((result, count)),
        }
    }

    fn dominant(&self) -> TestResult {
        self.leader.map(|(result, _)| result).unwrap_or_default()
    }
}

#[derive(Debug, Default)]
struct HospitalAccumulator {
    count: usize,
    billing_sum: f64,
    billing_count: usize,
    tally: DominantTally,
}

/// Per-hospital statistics in one pass, largest hospital first.
///
/// Rows without a hospital are pooled under `Unknown`. Hospitals with equal
/// counts keep the order in which they first appeared.
pub fn aggregate_by_hospital<'a, I>(rows: I) -> Vec<HospitalStats>
where
    I: IntoIterator<Item = &'a Row>,
{
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, HospitalAccumulator> = HashMap::new();

    for row in rows {
        let hospital = row.hospital_label();
        let acc = groups.entry(hospital).or_insert_with(|| {
            order.push(hospital);
            HospitalAccumulator::default()
        });
        acc.count += 1;
        if let Some(amount) = row.billing_amount {
            acc.billing_sum += amount;
            acc.billing_count += 1;
        }
        acc.tally.observe(row.test_result);
    }

    let mut stats: Vec<HospitalStats> = order
        .into_iter()
        .filter_map(|hospital| {
            let acc = groups.remove(hospital)?;
            Some(HospitalStats {
                hospital: hospital.to_string(),
                count: acc.count,
                avg_billing: if acc.billing_count > 0 {
                    acc.billing_sum / acc.billing_count as f64
                } else {
                    0.0
                },
                dominant_test_result: acc.tally.dominant(),
            })
        })
        .collect();
    // Stable: ties stay in first-appearance order
    stats.sort_by(|a, b| b.count.cmp(&a.count));
    stats
}

#[derive(Debug, Default)]
struct CategoryAccumulator {
    count: usize,
    billing_sum: f64,
    billing_count: usize,
    stay_sum: f64,
    stay_count: usize,
}

/// Statistics per value of a categorical column, in value order.
///
/// Rows with no value for the column are left out.
pub fn aggregate_by_category<'a, I>(rows: I, field: CategoricalField) -> Vec<CategoryStats>
where
    I: IntoIterator<Item = &'a Row>,
{
    let mut groups: BTreeMap<&str, CategoryAccumulator> = BTreeMap::new();

    for row in rows {
        let Some(value) = row.categorical(field) else {
            continue;
        };
        let acc = groups.entry(value).or_default();
        acc.count += 1;
        if let Some(amount) = row.billing_amount {
            acc.billing_sum += amount;
            acc.billing_count += 1;
        }
        if let Some(days) = row.length_of_stay_days {
            acc.stay_sum += days;
            acc.stay_count += 1;
        }
    }

    groups
        .into_iter()
        .map(|(value, acc)| CategoryStats {
            value: value.to_string(),
            count: acc.count,
            total_billing: acc.billing_sum,
            avg_billing: if acc.billing_count > 0 {
                acc.billing_sum / acc.billing_count as f64
            } else {
                0.0
            },
            avg_length_of_stay: (acc.stay_count > 0).then(|| acc.stay_sum / acc.stay_count as f64),
        })
        .collect()
}

/// Row counts per test result.
pub fn test_result_distribution<'a, I>(rows: I) -> TestResultCounts
where
    I: IntoIterator<Item = &'a Row>,
{
    let mut counts = TestResultCounts::default();
    for row in rows {
        counts.increment(row.test_result);
    }
    counts
}

/// Memoizes KPI and per-hospital aggregates of filtered subsets.
///
/// Entries are keyed by the subset's store and canonical filter key, so two
/// different subsets can never share an entry.
#[derive(Debug)]
pub struct AggregationEngine {
    kpis: MemoTable<SubsetFingerprint, Arc<KpiScalars>>,
    hospitals: MemoTable<SubsetFingerprint, Arc<[HospitalStats]>>,
}

impl Default for AggregationEngine {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_AGGREGATE_CACHE_CAPACITY)
    }
}

impl AggregationEngine {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            kpis: MemoTable::new(capacity),
            hospitals: MemoTable::new(capacity),
        }
    }

    /// KPI scalars of a subset.
    pub fn kpis(&mut self, subset: &FilteredSubset) -> Arc<KpiScalars> {
        let fingerprint = subset.fingerprint();
        if let Some(scalars) = self.kpis.get(fingerprint) {
            tracing::debug!("KPI cache hit");
            return scalars;
        }
        let scalars = Arc::new(aggregate_kpis(subset));
        tracing::debug!(rows = scalars.count, "KPI cache miss");
        self.kpis.insert(fingerprint.clone(), Arc::clone(&scalars));
        scalars
    }

    /// Per-hospital statistics of a subset.
    pub fn by_hospital(&mut self, subset: &FilteredSubset) -> Arc<[HospitalStats]> {
        let fingerprint = subset.fingerprint();
        if let Some(stats) = self.hospitals.get(fingerprint) {
            tracing::debug!("Hospital stats cache hit");
            return stats;
        }
        let stats: Arc<[HospitalStats]> = aggregate_by_hospital(subset).into();
        tracing::debug!(hospitals = stats.len(), "Hospital stats cache miss");
        self.hospitals.insert(fingerprint.clone(), Arc::clone(&stats));
        stats
    }

    /// Owned copy of both aggregates.
    pub fn snapshot(&mut self, subset: &FilteredSubset) -> AggregateSnapshot {
        AggregateSnapshot {
            scalars: (*self.kpis(subset)).clone(),
            hospitals: self.by_hospital(subset).to_vec(),
        }
    }

    pub fn clear(&mut self) {
        self.kpis.clear();
        self.hospitals.clear();
    }

    /// Combined counters of both tables.
    pub fn stats(&self) -> CacheStats {
        self.kpis.stats() + self.hospitals.stats()
    }
}
