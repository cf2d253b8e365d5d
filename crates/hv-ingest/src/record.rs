//! Untyped raw records and the expected header schema.

use std::collections::BTreeMap;

/// Column headers of the encounter file, in file order.
pub const EXPECTED_COLUMNS: [&str; 15] = [
    "Name",
    "Age",
    "Gender",
    "Blood Type",
    "Medical Condition",
    "Date of Admission",
    "Doctor",
    "Hospital",
    "Insurance Provider",
    "Billing Amount",
    "Room Number",
    "Admission Type",
    "Discharge Date",
    "Medication",
    "Test Results",
];

/// One raw record: header name to raw cell text.
///
/// Cells are stored exactly as read. Absent keys and empty cells are both
/// valid; the normalizer treats them alike.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    fields: BTreeMap<String, String>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw cell for a header, if the record has one.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let fields = iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self { fields }
    }
}

/// Expected columns that do not appear in `headers`.
pub fn missing_columns<S: AsRef<str>>(headers: &[S]) -> Vec<&'static str> {
    EXPECTED_COLUMNS
        .iter()
        .copied()
        .filter(|expected| !headers.iter().any(|h| h.as_ref() == *expected))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_and_get() {
        let record: RawRecord = [("Age", "70"), ("Hospital", "  Mercy ")].into_iter().collect();
        assert_eq!(record.get("Age"), Some("70"));
        assert_eq!(record.get("Hospital"), Some("  Mercy "));
        assert_eq!(record.get("Name"), None);
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn test_missing_columns() {
        let headers: Vec<String> = EXPECTED_COLUMNS.iter().map(|c| c.to_string()).collect();
        assert!(missing_columns(&headers).is_empty());

        let partial = ["Name", "Age", "Hospital"];
        let missing = missing_columns(&partial);
        assert_eq!(missing.len(), 12);
        assert!(missing.contains(&"Test Results"));
        assert!(!missing.contains(&"Age"));
    }
}
