//! # hr_dashboard
//!
//! Loader and aggregates behind an HR analytics dashboard. It:
//!
//! - Loads an employee CSV into memory (memory-mapped, chunks parsed with Rayon)
//! - Fills missing cells by column type and derives `ToBePromoted` /
//!   `ToBeRetrenched` once at load
//! - Computes gender, promotion and retrenchment KPIs and per-department stats
//! - Lists filter options and restricts the table to a selection
//! - Exports the transformed table back to CSV
//!
//! Rendering is left to the caller; every result type serializes with serde.
//!
//! # Example
//!
//! ```no_run
//! use hr_dashboard::{JoinMode, load_transform};
//! use hr_dashboard::processor::aggregates::{department_stats, gender_count, promo_count};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let table = load_transform("data/hr_data.csv")?;
//!
//!     let genders = gender_count(&table);
//!     println!("{} employees, {}% female", genders.total, genders.female_pct);
//!
//!     let promo = promo_count(&table);
//!     println!("{} due for promotion ({}%)", promo.promoted, promo.promoted_pct);
//!
//!     for dept in department_stats(&table, JoinMode::Left) {
//!         println!("{} => avg income {}", dept.department, dept.avg_monthly_income);
//!     }
//!
//!     Ok(())
//! }
//! ```

use std::path::Path;

pub mod config;
mod helpers;
pub mod logging;
pub mod processor;

#[cfg(feature = "python-bindings")]
pub mod python;

pub use config::{DashboardConfig, FillDefaults, JoinMode, KpiTargets};
pub use processor::{
    ProcessorError,
    employee::{EmployeeField, EmployeeRecord, Retrenchment},
    employee_table::EmployeeTable,
    export::table_to_csv,
    filter_options::{FilterOptionSet, FilterSelection, NumericRange, filter_options},
    report::DashboardReport,
};

/// Loads a CSV file with default fill values and derives the promotion and
/// retrenchment attributes.
pub fn load_transform(path: impl AsRef<Path>) -> Result<EmployeeTable, ProcessorError> {
    EmployeeTable::load_csv(path, &FillDefaults::default())
}
