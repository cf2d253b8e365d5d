//! Closed categorical vocabularies used by normalized rows.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Age bracket derived from a patient's age.
///
/// Boundaries are inclusive on the upper end: 18 is still `0–18`,
/// 40 is still `19–40`, 65 is still `41–65`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgeGroup {
    #[serde(rename = "0–18")]
    Child,
    #[serde(rename = "19–40")]
    YoungAdult,
    #[serde(rename = "41–65")]
    MiddleAged,
    #[serde(rename = "65+")]
    Senior,
}

impl AgeGroup {
    /// All groups in ascending age order.
    pub const ALL: [AgeGroup; 4] = [
        AgeGroup::Child,
        AgeGroup::YoungAdult,
        AgeGroup::MiddleAged,
        AgeGroup::Senior,
    ];

    /// Applies the fixed boundary rule to an age in years.
    pub fn from_age(age: u8) -> Self {
        match age {
            0..=18 => AgeGroup::Child,
            19..=40 => AgeGroup::YoungAdult,
            41..=65 => AgeGroup::MiddleAged,
            _ => AgeGroup::Senior,
        }
    }

    /// Canonical label (en-dash separated).
    pub fn as_str(&self) -> &'static str {
        match self {
            AgeGroup::Child => "0–18",
            AgeGroup::YoungAdult => "19–40",
            AgeGroup::MiddleAged => "41–65",
            AgeGroup::Senior => "65+",
        }
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AgeGroup {
    type Err = String;

    /// Accepts the canonical labels as well as their ASCII-hyphen spelling.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace('–', "-");
        match normalized.as_str() {
            "0-18" => Ok(AgeGroup::Child),
            "19-40" => Ok(AgeGroup::YoungAdult),
            "41-65" => Ok(AgeGroup::MiddleAged),
            "65+" => Ok(AgeGroup::Senior),
            _ => Err(format!("Unknown age group: {}", s)),
        }
    }
}

/// Outcome of a patient's test. There is no unknown state.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum TestResult {
    Normal,
    Abnormal,
    #[default]
    Inconclusive,
}

impl TestResult {
    /// All results in display order.
    pub const ALL: [TestResult; 3] = [
        TestResult::Normal,
        TestResult::Abnormal,
        TestResult::Inconclusive,
    ];

    /// Maps a raw label onto the closed enum.
    ///
    /// Only the exact canonical labels are recognized; anything else,
    /// including a missing value, collapses to `Inconclusive`.
    pub fn from_label(label: Option<&str>) -> Self {
        match label.map(str::trim) {
            Some("Normal") => TestResult::Normal,
            Some("Abnormal") => TestResult::Abnormal,
            _ => TestResult::Inconclusive,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TestResult::Normal => "Normal",
            TestResult::Abnormal => "Abnormal",
            TestResult::Inconclusive => "Inconclusive",
        }
    }

    /// Position in [`TestResult::ALL`].
    pub fn index(self) -> usize {
        match self {
            TestResult::Normal => 0,
            TestResult::Abnormal => 1,
            TestResult::Inconclusive => 2,
        }
    }
}

impl fmt::Display for TestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TestResult {
    type Err = String;

    /// Strict parse used for filter values; unlike [`TestResult::from_label`]
    /// it rejects unrecognized labels.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Normal" => Ok(TestResult::Normal),
            "Abnormal" => Ok(TestResult::Abnormal),
            "Inconclusive" => Ok(TestResult::Inconclusive),
            _ => Err(format!("Unknown test result: {}", s)),
        }
    }
}

/// Coarse geographic bucket derived from the hospital name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Region {
    West,
    Midwest,
    Northeast,
    South,
}

impl Region {
    pub const ALL: [Region; 4] = [Region::West, Region::Midwest, Region::Northeast, Region::South];

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::West => "West",
            Region::Midwest => "Midwest",
            Region::Northeast => "Northeast",
            Region::South => "South",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Region {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "west" => Ok(Region::West),
            "midwest" => Ok(Region::Midwest),
            "northeast" => Ok(Region::Northeast),
            "south" => Ok(Region::South),
            _ => Err(format!("Unknown region: {}", s)),
        }
    }
}

/// Categorical columns whose distinct values populate filter option lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CategoricalField {
    AgeGroup,
    Gender,
    AdmissionType,
    MedicalCondition,
    TestResult,
    BloodType,
    Insurance,
    Hospital,
    Medication,
    Doctor,
    Region,
}

impl CategoricalField {
    pub const ALL: [CategoricalField; 11] = [
        CategoricalField::AgeGroup,
        CategoricalField::Gender,
        CategoricalField::AdmissionType,
        CategoricalField::MedicalCondition,
        CategoricalField::TestResult,
        CategoricalField::BloodType,
        CategoricalField::Insurance,
        CategoricalField::Hospital,
        CategoricalField::Medication,
        CategoricalField::Doctor,
        CategoricalField::Region,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CategoricalField::AgeGroup => "ageGroup",
            CategoricalField::Gender => "gender",
            CategoricalField::AdmissionType => "admissionType",
            CategoricalField::MedicalCondition => "medicalCondition",
            CategoricalField::TestResult => "testResult",
            CategoricalField::BloodType => "bloodType",
            CategoricalField::Insurance => "insurance",
            CategoricalField::Hospital => "hospital",
            CategoricalField::Medication => "medication",
            CategoricalField::Doctor => "doctor",
            CategoricalField::Region => "region",
        }
    }
}

impl fmt::Display for CategoricalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CategoricalField {
    type Err = String;

    /// Case-insensitive; ignores `-`, `_` and spaces so that both
    /// `bloodType` and `Blood Type` resolve.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_name(s).as_str() {
            "agegroup" => Ok(CategoricalField::AgeGroup),
            "gender" => Ok(CategoricalField::Gender),
            "admissiontype" => Ok(CategoricalField::AdmissionType),
            "medicalcondition" | "condition" => Ok(CategoricalField::MedicalCondition),
            "testresult" | "testresults" => Ok(CategoricalField::TestResult),
            "bloodtype" => Ok(CategoricalField::BloodType),
            "insurance" | "insuranceprovider" => Ok(CategoricalField::Insurance),
            "hospital" => Ok(CategoricalField::Hospital),
            "medication" => Ok(CategoricalField::Medication),
            "doctor" => Ok(CategoricalField::Doctor),
            "region" => Ok(CategoricalField::Region),
            _ => Err(format!("Unknown categorical field: {}", s)),
        }
    }
}

/// Lowercases and drops separators for lenient field-name matching.
pub(crate) fn normalize_name(s: &str) -> String {
    s.trim()
        .chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}
