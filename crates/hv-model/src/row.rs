//! The normalized patient-encounter row.

use chrono::NaiveDate;
use serde::Serialize;

use crate::enums::{AgeGroup, CategoricalField, Region, TestResult};

/// Group label used for rows without a hospital.
pub const UNKNOWN_HOSPITAL: &str = "Unknown";

/// One normalized record.
///
/// Rows are built once by the normalizer and shared read-only afterwards.
/// Every field is already resolved: strings are trimmed and non-empty,
/// numbers are finite and in range, derived fields agree with their sources.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    // Identity and demographics
    pub name: Option<String>,
    pub age: Option<u8>,
    pub age_group: Option<AgeGroup>,
    pub gender: Option<String>,
    pub blood_type: Option<String>,

    // Clinical
    pub medical_condition: Option<String>,
    pub medication: Option<String>,
    pub test_result: TestResult,

    // Administrative
    pub doctor: Option<String>,
    pub hospital: Option<String>,
    pub insurance: Option<String>,
    pub admission_type: Option<String>,

    // Financial
    pub billing_amount: Option<f64>,

    // Temporal
    pub admission_date: Option<NaiveDate>,
    pub discharge_date: Option<NaiveDate>,
    pub length_of_stay_days: Option<f64>,

    // Derived
    pub room_number: Option<u32>,
    pub region: Region,
}

impl Row {
    /// Value of a categorical column, if present.
    pub fn categorical(&self, field: CategoricalField) -> Option<&str> {
        match field {
            CategoricalField::AgeGroup => self.age_group.map(|g| g.as_str()),
            CategoricalField::Gender => self.gender.as_deref(),
            CategoricalField::AdmissionType => self.admission_type.as_deref(),
            CategoricalField::MedicalCondition => self.medical_condition.as_deref(),
            CategoricalField::TestResult => Some(self.test_result.as_str()),
            CategoricalField::BloodType => self.blood_type.as_deref(),
            CategoricalField::Insurance => self.insurance.as_deref(),
            CategoricalField::Hospital => self.hospital.as_deref(),
            CategoricalField::Medication => self.medication.as_deref(),
            CategoricalField::Doctor => self.doctor.as_deref(),
            CategoricalField::Region => Some(self.region.as_str()),
        }
    }

    /// Hospital name for grouping, with missing names pooled as `Unknown`.
    pub fn hospital_label(&self) -> &str {
        self.hospital.as_deref().unwrap_or(UNKNOWN_HOSPITAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Row {
        Row {
            name: Some("Jane Roe".to_string()),
            age: Some(42),
            age_group: Some(AgeGroup::MiddleAged),
            gender: Some("Female".to_string()),
            blood_type: None,
            medical_condition: Some("Asthma".to_string()),
            medication: None,
            test_result: TestResult::Normal,
            doctor: None,
            hospital: None,
            insurance: Some("Aetna".to_string()),
            admission_type: Some("Urgent".to_string()),
            billing_amount: Some(1200.5),
            admission_date: NaiveDate::from_ymd_opt(2023, 1, 1),
            discharge_date: NaiveDate::from_ymd_opt(2023, 1, 3),
            length_of_stay_days: Some(2.0),
            room_number: Some(101),
            region: Region::South,
        }
    }

    #[test]
    fn categorical_reads_each_column() {
        let row = sample();
        assert_eq!(row.categorical(CategoricalField::AgeGroup), Some("41–65"));
        assert_eq!(row.categorical(CategoricalField::Gender), Some("Female"));
        assert_eq!(row.categorical(CategoricalField::BloodType), None);
        assert_eq!(row.categorical(CategoricalField::TestResult), Some("Normal"));
        assert_eq!(row.categorical(CategoricalField::Region), Some("South"));
    }

    #[test]
    fn missing_hospital_is_grouped_as_unknown() {
        assert_eq!(sample().hospital_label(), UNKNOWN_HOSPITAL);
    }

    #[test]
    fn serializes_camel_case_with_iso_dates() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["ageGroup"], "41–65");
        assert_eq!(json["admissionDate"], "2023-01-01");
        assert_eq!(json["lengthOfStayDays"], 2.0);
        assert_eq!(json["testResult"], "Normal");
    }
}
