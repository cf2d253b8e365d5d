//! The memoized filter engine.

use std::sync::Arc;

use serde::ser::{Serialize, SerializeSeq, Serializer};

use hv_model::{FilterKey, FilterSpec, Row};

use crate::memo::{CacheStats, MemoTable};
use crate::store::{DatasetStore, StoreId};

/// Default number of memoized subsets.
pub const DEFAULT_FILTER_CACHE_CAPACITY: usize = 50;

/// Identity of a subset: the store it was cut from and the query that cut it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubsetFingerprint {
    pub store: StoreId,
    pub key: FilterKey,
}

/// Rows of a store that satisfy one filter specification, in store order.
///
/// Holds indices into the store's shared rows rather than copies.
#[derive(Debug)]
pub struct FilteredSubset {
    fingerprint: SubsetFingerprint,
    rows: Arc<[Row]>,
    indices: Vec<usize>,
}

impl FilteredSubset {
    pub fn key(&self) -> &FilterKey {
        &self.fingerprint.key
    }

    pub fn store_id(&self) -> StoreId {
        self.fingerprint.store
    }

    pub fn fingerprint(&self) -> &SubsetFingerprint {
        &self.fingerprint
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// The `n`th matching row.
    pub fn get(&self, n: usize) -> Option<&Row> {
        self.indices.get(n).map(|&idx| &self.rows[idx])
    }

    pub fn first(&self) -> Option<&Row> {
        self.get(0)
    }

    pub fn last(&self) -> Option<&Row> {
        self.indices.last().map(|&idx| &self.rows[idx])
    }

    /// Positions of the matching rows in the store.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn iter(&self) -> SubsetIter<'_> {
        SubsetIter {
            rows: &self.rows,
            indices: self.indices.iter(),
        }
    }
}

/// Iterator over the rows of a [`FilteredSubset`].
#[derive(Debug, Clone)]
pub struct SubsetIter<'a> {
    rows: &'a [Row],
    indices: std::slice::Iter<'a, usize>,
}

impl<'a> Iterator for SubsetIter<'a> {
    type Item = &'a Row;

    fn next(&mut self) -> Option<Self::Item> {
        self.indices.next().map(|&idx| &self.rows[idx])
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.indices.size_hint()
    }
}

impl DoubleEndedIterator for SubsetIter<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.indices.next_back().map(|&idx| &self.rows[idx])
    }
}

impl ExactSizeIterator for SubsetIter<'_> {}

impl<'a> IntoIterator for &'a FilteredSubset {
    type Item = &'a Row;
    type IntoIter = SubsetIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Serialize for FilteredSubset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for row in self.iter() {
            seq.serialize_element(row)?;
        }
        seq.end()
    }
}

/// Returns true if `row` satisfies every active predicate of `spec`.
///
/// Predicates run cheapest first and stop at the first failure: equality
/// checks, then the stay and billing bounds, then the admission dates. A
/// row without a stay or billing amount fails an active bound on it.
pub fn row_matches(row: &Row, spec: &FilterSpec) -> bool {
    if let Some(hospital) = &spec.selected_hospital
        && row.hospital.as_deref() != Some(hospital.as_str())
    {
        return false;
    }
    if !spec.age_group.accepts(row.age_group.as_ref())
        || !spec.gender.accepts_str(row.gender.as_deref())
        || !spec.admission_type.accepts_str(row.admission_type.as_deref())
        || !spec.condition.accepts_str(row.medical_condition.as_deref())
        || !spec.test_result.accepts(Some(&row.test_result))
        || !spec.blood_type.accepts_str(row.blood_type.as_deref())
        || !spec.insurance.accepts_str(row.insurance.as_deref())
    {
        return false;
    }

    if let Some(max) = spec.length_of_stay_max {
        match row.length_of_stay_days {
            Some(days) if days <= max => {}
            _ => return false,
        }
    }
    if let Some(range) = spec.billing_range {
        match row.billing_amount {
            Some(amount) if range.contains(amount) => {}
            _ => return false,
        }
    }

    if let Some(from) = spec.admission_from {
        match row.admission_date {
            Some(date) if date >= from => {}
            _ => return false,
        }
    }
    // Calendar-date comparison makes the upper bound cover the whole day
    if let Some(to) = spec.admission_to {
        match row.admission_date {
            Some(date) if date <= to => {}
            _ => return false,
        }
    }
    true
}

/// Answers filter queries, memoizing subsets by canonical filter key.
#[derive(Debug)]
pub struct FilterEngine {
    cache: MemoTable<FilterKey, Arc<FilteredSubset>>,
    store: Option<StoreId>,
}

impl Default for FilterEngine {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_FILTER_CACHE_CAPACITY)
    }
}

impl FilterEngine {
    /// Creates an engine remembering up to `capacity` subsets.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cache: MemoTable::new(capacity),
            store: None,
        }
    }

    /// Returns the subset of `store` matching `spec`.
    ///
    /// Asking twice for an equal specification returns the same shared
    /// subset without rescanning. Switching to a different store drops
    /// everything memoized for the previous one.
    pub fn filter(&mut self, store: &DatasetStore, spec: &FilterSpec) -> Arc<FilteredSubset> {
        if self.store != Some(store.id()) {
            if self.store.is_some() {
                tracing::debug!(store = %store.id(), "Store changed; clearing filter cache");
            }
            self.cache.clear();
            self.store = Some(store.id());
        }

        let key = spec.key();
        if let Some(subset) = self.cache.get(&key) {
            tracing::debug!(rows = subset.len(), "Filter cache hit");
            return subset;
        }

        let indices: Vec<usize> = store
            .all()
            .iter()
            .enumerate()
            .filter(|(_, row)| row_matches(row, spec))
            .map(|(idx, _)| idx)
            .collect();

        let subset = Arc::new(FilteredSubset {
            fingerprint: SubsetFingerprint {
                store: store.id(),
                key: key.clone(),
            },
            rows: store.shared_rows(),
            indices,
        });
        tracing::debug!(
            rows = subset.len(),
            scanned = store.len(),
            "Filter cache miss"
        );

        if self.cache.insert(key, Arc::clone(&subset)).is_some() {
            tracing::debug!("Evicted oldest filter cache entry");
        }
        subset
    }

    /// Drops every memoized subset.
    pub fn clear(&mut self) {
        self.cache.clear();
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    pub fn capacity(&self) -> usize {
        self.cache.capacity()
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
