//! YAML export of an order reconciliation report

use std::io::Write;

use crate::error::{GastosError, GastosResult};
use crate::export::json::ReportExport;
use crate::services::OrderReport;

/// Write the report as YAML under a short comment header
pub fn export_report_yaml<W: Write>(report: &OrderReport, writer: &mut W) -> GastosResult<()> {
    let export = ReportExport::new(report);

    writeln!(writer, "# Reconciliation report for order {}", report.number)?;
    writeln!(writer, "# Generated: {}", export.exported_at)?;
    writeln!(writer)?;

    serde_yaml::to_writer(writer, &export).map_err(|e| GastosError::Export(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OrderId;

    #[test]
    fn test_yaml_has_header_and_body() {
        let report = OrderReport {
            order_id: OrderId::new(),
            number: "OP-7".into(),
            client: "Acme".into(),
            categories: Vec::new(),
        };

        let mut buffer = Vec::new();
        export_report_yaml(&report, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        assert!(text.starts_with("# Reconciliation report for order OP-7"));
        assert!(text.contains("number: OP-7"));
        assert!(text.contains("schema_version:"));
    }
}
