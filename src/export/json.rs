//! JSON export of an order reconciliation report

use std::io::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::GastosResult;
use crate::services::OrderReport;

/// Current export schema version
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Report wrapped with export metadata
#[derive(Debug, Clone, Serialize)]
pub struct ReportExport<'a> {
    pub schema_version: &'static str,
    pub exported_at: DateTime<Utc>,
    pub app_version: &'static str,
    pub report: &'a OrderReport,
}

impl<'a> ReportExport<'a> {
    pub fn new(report: &'a OrderReport) -> Self {
        Self {
            schema_version: EXPORT_SCHEMA_VERSION,
            exported_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION"),
            report,
        }
    }
}

/// Write the report as pretty-printed JSON
pub fn export_report_json<W: Write>(report: &OrderReport, writer: &mut W) -> GastosResult<()> {
    serde_json::to_writer_pretty(&mut *writer, &ReportExport::new(report))?;
    writeln!(writer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExpenseCategory, Money, OrderId};
    use crate::services::{BudgetSnapshot, CategoryReport};

    #[test]
    fn test_amounts_are_decimal_units() {
        let report = OrderReport {
            order_id: OrderId::new(),
            number: "OP-1".into(),
            client: "Acme".into(),
            categories: vec![CategoryReport {
                totals: BudgetSnapshot::compute(ExpenseCategory::Talent, Money::from_units(1_000), &[])
                    .unwrap(),
                items: Vec::new(),
                unlinked: Money::zero(),
            }],
        };

        let mut buffer = Vec::new();
        export_report_json(&report, &mut buffer).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();

        assert_eq!(value["schema_version"], EXPORT_SCHEMA_VERSION);
        let totals = &value["report"]["categories"][0]["totals"];
        assert_eq!(totals["category"], "talent");
        assert_eq!(totals["allocated"], 1000);
        assert_eq!(totals["over_budget"], false);
    }
}
