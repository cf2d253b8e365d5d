//! Data model types for the HealthViz query core.
//!
//! This crate provides the typed vocabulary shared by every other crate:
//! - **Rows**: one normalized patient encounter ([`Row`])
//! - **Enumerations**: closed categorical domains ([`AgeGroup`], [`TestResult`], [`Region`])
//! - **Filters**: the complete active query ([`FilterSpec`]) and its canonical [`FilterKey`]
//! - **Aggregates**: KPI scalars and grouped statistics over a row subset
//!
//! # Module Organization
//!
//! - [`enums`]: Categorical enumerations and field names
//! - [`row`]: The normalized row
//! - [`filter`]: Filter specification, partial updates and cache keys
//! - [`aggregate`]: Aggregate result types
//! - [`error`]: Query-level misuse errors

pub mod aggregate;
pub mod enums;
pub mod error;
pub mod filter;
pub mod row;

pub use aggregate::{AggregateSnapshot, CategoryStats, HospitalStats, KpiScalars, TestResultCounts};
pub use enums::{AgeGroup, CategoricalField, Region, TestResult};
pub use error::{FilterError, Result};
pub use filter::{BillingRange, Choice, FilterField, FilterKey, FilterPatch, FilterSpec};
pub use row::{Row, UNKNOWN_HOSPITAL};
