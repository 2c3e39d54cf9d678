//! Export module
//!
//! - CSV: one category ledger, spreadsheet-compatible
//! - JSON / YAML: an order's reconciliation report with export metadata

pub mod csv;
pub mod json;
pub mod yaml;

pub use self::csv::export_expenses_csv;
pub use json::{export_report_json, ReportExport, EXPORT_SCHEMA_VERSION};
pub use yaml::export_report_yaml;
