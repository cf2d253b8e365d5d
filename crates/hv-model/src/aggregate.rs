//! Summary values computed over a filtered subset.

use serde::Serialize;

use crate::enums::TestResult;

/// Headline scalar KPIs of a subset.
///
/// `avg_billing` divides the billing total by the full row count, so rows
/// without a billing amount pull the average down. It is 0 for an empty
/// subset. `avg_length_of_stay` only averages rows that have a stay.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiScalars {
    pub count: usize,
    pub total_billing: f64,
    pub avg_billing: f64,
    pub avg_length_of_stay: Option<f64>,
    pub distinct_hospitals: usize,
}

/// Per-hospital summary row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HospitalStats {
    pub hospital: String,
    pub count: usize,
    /// Mean over rows with a billing amount; 0 when there are none.
    pub avg_billing: f64,
    pub dominant_test_result: TestResult,
}

/// Summary of one value of a categorical column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStats {
    pub value: String,
    pub count: usize,
    pub total_billing: f64,
    pub avg_billing: f64,
    pub avg_length_of_stay: Option<f64>,
}

/// Row counts per test result, in [`TestResult::ALL`] order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TestResultCounts([usize; 3]);

impl TestResultCounts {
    pub fn increment(&mut self, result: TestResult) {
        self.0[result.index()] += 1;
    }

    pub fn get(&self, result: TestResult) -> usize {
        self.0[result.index()]
    }

    pub fn total(&self) -> usize {
        self.0.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TestResult, usize)> + '_ {
        TestResult::ALL.iter().map(|result| (*result, self.get(*result)))
    }
}

impl Serialize for TestResultCounts {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(TestResult::ALL.len()))?;
        for (result, count) in self.iter() {
            map.serialize_entry(result.as_str(), &count)?;
        }
        map.end()
    }
}

/// KPI scalars plus the per-hospital table of one subset.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateSnapshot {
    pub scalars: KpiScalars,
    pub hospitals: Vec<HospitalStats>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_counts_keep_fixed_order() {
        let mut counts = TestResultCounts::default();
        counts.increment(TestResult::Inconclusive);
        counts.increment(TestResult::Normal);
        counts.increment(TestResult::Inconclusive);

        let ordered: Vec<_> = counts.iter().collect();
        assert_eq!(
            ordered,
            vec![
                (TestResult::Normal, 1),
                (TestResult::Abnormal, 0),
                (TestResult::Inconclusive, 2),
            ]
        );
        assert_eq!(counts.total(), 3);
        assert_eq!(
            serde_json::to_string(&counts).unwrap(),
            r#"{"Normal":1,"Abnormal":0,"Inconclusive":2}"#
        );
    }

    #[test]
    fn empty_scalars_are_zero() {
        let scalars = KpiScalars::default();
        assert_eq!(scalars.count, 0);
        assert_eq!(scalars.avg_billing, 0.0);
        assert_eq!(scalars.avg_length_of_stay, None);
    }
}
