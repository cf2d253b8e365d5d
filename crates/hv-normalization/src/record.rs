//! Whole-record normalization.

use hv_ingest::RawRecord;
use hv_model::Row;

use crate::clean::{clean_hospital_name, clean_string};
use crate::date::{length_of_stay_days, parse_date};
use crate::derive::{age_group, normalize_test_result};
use crate::geo::region_for_hospital;
use crate::numeric::{parse_age, parse_billing, parse_room_number};

/// Normalizes one raw record into a row.
///
/// Never fails: a record with no fields at all yields a row of nulls with
/// an `Inconclusive` test result.
pub fn normalize_record(raw: &RawRecord) -> Row {
    let age = parse_age(raw.get("Age"));
    let admission_date = parse_date(raw.get("Date of Admission"));
    let discharge_date = parse_date(raw.get("Discharge Date"));
    let hospital = clean_hospital_name(raw.get("Hospital"));
    let region = region_for_hospital(hospital.as_deref());

    Row {
        name: clean_string(raw.get("Name")),
        age,
        age_group: age_group(age),
        gender: clean_string(raw.get("Gender")),
        blood_type: clean_string(raw.get("Blood Type")),

        medical_condition: clean_string(raw.get("Medical Condition")),
        medication: clean_string(raw.get("Medication")),
        test_result: normalize_test_result(raw.get("Test Results")),

        doctor: clean_string(raw.get("Doctor")),
        hospital,
        insurance: clean_string(raw.get("Insurance Provider")),
        admission_type: clean_string(raw.get("Admission Type")),

        billing_amount: parse_billing(raw.get("Billing Amount")),

        admission_date,
        discharge_date,
        length_of_stay_days: length_of_stay_days(admission_date, discharge_date),

        room_number: parse_room_number(raw.get("Room Number")),
        region,
    }
}
