//! The payload published after each filter application.

use std::sync::Arc;

use serde::ser::{Serialize, SerializeStruct, Serializer};

use hv_model::{FilterSpec, HospitalStats, KpiScalars};
use hv_query::FilteredSubset;

/// Everything a rendering consumer needs for one filter state.
///
/// All parts are shared: publishing twice without a filter change hands out
/// the same subset and aggregates.
#[derive(Debug, Clone)]
pub struct Publication {
    pub spec: FilterSpec,
    /// Human-readable selection label.
    pub label: String,
    pub rows: Arc<FilteredSubset>,
    pub scalars: Arc<KpiScalars>,
    pub hospitals: Arc<[HospitalStats]>,
}

impl Publication {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

impl Serialize for Publication {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Publication", 5)?;
        state.serialize_field("filterKey", self.rows.key())?;
        state.serialize_field("label", &self.label)?;
        state.serialize_field("rows", self.rows.as_ref())?;
        state.serialize_field("scalars", self.scalars.as_ref())?;
        state.serialize_field("hospitals", self.hospitals.as_ref())?;
        state.end()
    }
}
