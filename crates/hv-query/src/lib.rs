//! Query core for HealthViz.
//!
//! Holds the immutable dataset and answers repeated filter and aggregate
//! queries over it. Both engines memoize results in bounded,
//! insertion-ordered tables keyed by the canonical [`FilterKey`](hv_model::FilterKey)
//! of the query, so toggling between recently used filter combinations
//! never rescans the dataset.
//!
//! # Example
//!
//! ```ignore
//! use hv_model::FilterSpec;
//! use hv_query::{AggregationEngine, DatasetStore, FilterEngine};
//!
//! let store = DatasetStore::load(Path::new("healthcare_dataset.csv"))?;
//! let mut filters = FilterEngine::default();
//! let mut aggregates = AggregationEngine::default();
//!
//! let subset = filters.filter(&store, &FilterSpec::default());
//! let kpis = aggregates.kpis(&subset);
//! ```
//!
//! All engines are single-threaded: they take `&mut self` and are not
//! meant to be shared across threads without external synchronization.

mod aggregate;
mod filter;
mod memo;
mod store;

// === Dataset Store ===
pub use store::{DatasetStore, StoreId};

// === Memoization ===
pub use memo::{CacheStats, MemoTable};

// === Filter Engine ===
pub use filter::{
    DEFAULT_FILTER_CACHE_CAPACITY, FilterEngine, FilteredSubset, SubsetFingerprint, SubsetIter,
    row_matches,
};

// === Aggregation Engine ===
pub use aggregate::{
    AggregationEngine, DEFAULT_AGGREGATE_CACHE_CAPACITY, aggregate_by_category,
    aggregate_by_hospital, aggregate_kpis, test_result_distribution,
};
