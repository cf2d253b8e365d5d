//! The immutable dataset and its build-time indices.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::NaiveDate;
use serde::Serialize;

use hv_ingest::RawRecord;
use hv_model::{CategoricalField, Row};
use hv_normalization::normalize_record;

static NEXT_STORE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a built store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct StoreId(u64);

impl StoreId {
    fn next() -> Self {
        StoreId(NEXT_STORE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "store-{}", self.0)
    }
}

/// Normalized rows in input order, plus read-only indices.
///
/// Built exactly once; there is no mutation API. Cloning is cheap and keeps
/// the same identity.
#[derive(Debug, Clone)]
pub struct DatasetStore {
    id: StoreId,
    rows: Arc<[Row]>,
    distinct: BTreeMap<CategoricalField, Vec<String>>,
    date_bounds: Option<(NaiveDate, NaiveDate)>,
}

impl DatasetStore {
    /// Normalizes every raw record, preserving order.
    pub fn build<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a RawRecord>,
    {
        let rows: Vec<Row> = records.into_iter().map(normalize_record).collect();
        Self::from_rows(rows)
    }

    /// Wraps already-normalized rows.
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let mut sets: BTreeMap<CategoricalField, BTreeSet<&str>> = CategoricalField::ALL
            .iter()
            .map(|field| (*field, BTreeSet::new()))
            .collect();
        let mut date_bounds: Option<(NaiveDate, NaiveDate)> = None;

        for row in &rows {
            for (field, values) in sets.iter_mut() {
                if let Some(value) = row.categorical(*field) {
                    values.insert(value);
                }
            }
            if let Some(date) = row.admission_date {
                date_bounds = Some(match date_bounds {
                    None => (date, date),
                    Some((min, max)) => (min.min(date), max.max(date)),
                });
            }
        }

        let distinct = sets
            .into_iter()
            .map(|(field, values)| (field, values.into_iter().map(str::to_string).collect()))
            .collect();

        let store = Self {
            id: StoreId::next(),
            rows: rows.into(),
            distinct,
            date_bounds,
        };
        tracing::info!(store = %store.id, rows = store.len(), "Built dataset store");
        store
    }

    /// Reads and normalizes an encounter file.
    ///
    /// Load-level failures propagate; there are no partial stores.
    pub fn load(path: &Path) -> hv_ingest::Result<Self> {
        let records = hv_ingest::read_raw_records(path)?;
        Ok(Self::build(&records))
    }

    pub fn id(&self) -> StoreId {
        self.id
    }

    /// All rows, in input order.
    pub fn all(&self) -> &[Row] {
        &self.rows
    }

    /// Shared handle to the rows, for holders that outlive a borrow.
    pub fn shared_rows(&self) -> Arc<[Row]> {
        Arc::clone(&self.rows)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sorted, deduplicated, non-null values of a categorical column.
    pub fn distinct_values(&self, field: CategoricalField) -> &[String] {
        self.distinct.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Earliest and latest admission date, if any row has one.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.date_bounds
    }
}
