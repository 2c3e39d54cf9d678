//! Reconciliation report formatting

use crate::config::Settings;
use crate::services::{BudgetSnapshot, OrderReport};

use super::{separator, truncate};

fn over_marker(snapshot: &BudgetSnapshot) -> &'static str {
    if snapshot.over_budget {
        "OVER"
    } else {
        ""
    }
}

/// Allocated / executed / available for one snapshot
pub fn format_snapshot(snapshot: &BudgetSnapshot, settings: &Settings) -> String {
    let fmt = settings.number_format();
    let symbol = &settings.currency_symbol;
    let mut output = String::new();

    output.push_str(&format!("Category:  {}\n", snapshot.category));
    output.push_str(&format!("Allocated: {}\n", snapshot.allocated.format_total(&fmt, symbol)));
    output.push_str(&format!(
        "Executed:  {} ({} expense(s))\n",
        snapshot.executed.format_total(&fmt, symbol),
        snapshot.expense_count
    ));
    output.push_str(&format!("Available: {}\n", snapshot.available.format_total(&fmt, symbol)));
    if snapshot.over_budget {
        output.push_str("Over budget\n");
    }

    output
}

fn snapshot_row(label: &str, snapshot: &BudgetSnapshot, settings: &Settings) -> String {
    let fmt = settings.number_format();
    let symbol = &settings.currency_symbol;
    format!(
        "  {:24} {:>16} {:>16} {:>16}  {}\n",
        truncate(label, 24),
        snapshot.allocated.format_total(&fmt, symbol),
        snapshot.executed.format_total(&fmt, symbol),
        snapshot.available.format_total(&fmt, symbol),
        over_marker(snapshot)
    )
}

/// Per-category totals and per-item breakdown of an order
pub fn format_order_report(report: &OrderReport, settings: &Settings) -> String {
    let fmt = settings.number_format();
    let mut output = String::new();

    output.push_str(&format!("Order {} ({})\n", report.number, report.client));
    output.push_str(&format!(
        "  {:24} {:>16} {:>16} {:>16}\n",
        "", "Allocated", "Executed", "Available"
    ));
    output.push_str(&separator(80));
    output.push('\n');

    for category in &report.categories {
        output.push_str(&snapshot_row(
            &category.totals.category.to_string(),
            &category.totals,
            settings,
        ));
        for item in &category.items {
            if item.snapshot.allocated.is_zero() && item.snapshot.expense_count == 0 {
                continue;
            }
            output.push_str(&snapshot_row(
                &format!("  {}", item.program),
                &item.snapshot,
                settings,
            ));
        }
        if !category.unlinked.is_zero() && !category.items.is_empty() {
            output.push_str(&format!(
                "    (not linked to an item: {})\n",
                category.unlinked.format_total(&fmt, &settings.currency_symbol)
            ));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExpenseCategory, Money};

    #[test]
    fn test_over_budget_snapshot() {
        let snapshot = BudgetSnapshot {
            category: ExpenseCategory::Talent,
            allocated: Money::from_units(1_000_000),
            executed: Money::from_units(1_100_000),
            available: Money::from_units(-100_000),
            over_budget: true,
            expense_count: 2,
        };
        let output = format_snapshot(&snapshot, &Settings::default());

        assert!(output.contains("Allocated: $1.000.000"));
        assert!(output.contains("Available: -$100.000"));
        assert!(output.contains("Over budget"));
    }
}
