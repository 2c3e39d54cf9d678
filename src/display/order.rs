//! Order display formatting

use crate::config::Settings;
use crate::models::{ExpenseCategory, Order};

use super::{separator, truncate};

/// Format the order catalog
pub fn format_order_list(orders: &[Order]) -> String {
    if orders.is_empty() {
        return "No orders found. Import some with `gastos order import <file>`.\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:16} {:12} {:24} {:20} {:>5}  {}\n",
        "Number", "ID", "Client", "Campaign", "Items", "Status"
    ));
    output.push_str(&separator(90));
    output.push('\n');

    for order in orders {
        output.push_str(&format!(
            "{:16} {:12} {:24} {:20} {:>5}  {}\n",
            truncate(&order.number, 16),
            order.id.to_string(),
            truncate(&order.client, 24),
            truncate(&order.campaign, 20),
            order.items.len(),
            order.status
        ));
    }

    output
}

/// Format an order with each item's allocations
///
/// Allocation text that does not parse is shown as typed, flagged `(?)`.
pub fn format_order_details(order: &Order, settings: &Settings) -> String {
    let fmt = settings.number_format();
    let mut output = String::new();

    output.push_str(&format!("Order:    {} ({})\n", order.number, order.id));
    output.push_str(&format!("Client:   {}\n", order.client));
    if !order.brand.is_empty() {
        output.push_str(&format!("Brand:    {}\n", order.brand));
    }
    if !order.campaign.is_empty() {
        output.push_str(&format!("Campaign: {}\n", order.campaign));
    }
    output.push_str(&format!("Status:   {}\n\n", order.status));

    output.push_str(&format!(
        "{:12} {:20} {:>16} {:>16} {:>16}\n",
        "Item", "Program", "Implementation", "Talent", "Technical"
    ));
    output.push_str(&separator(84));
    output.push('\n');

    for item in &order.items {
        let cells: Vec<String> = ExpenseCategory::budgeted()
            .iter()
            .map(|&category| match item.allocation(category, &fmt) {
                Ok(amount) => amount.format_amount(&fmt, &settings.currency_symbol),
                Err(_) => format!("{} (?)", item.allocation_text(category).unwrap_or_default()),
            })
            .collect();

        output.push_str(&format!(
            "{:12} {:20} {:>16} {:>16} {:>16}\n",
            item.id.to_string(),
            truncate(&item.program, 20),
            cells[0],
            cells[1],
            cells[2]
        ));

        let (sale, credit, fee) = (item.sale(&fmt), item.credit_note(&fmt), item.fee(&fmt));
        if !(sale.is_zero() && credit.is_zero() && fee.is_zero()) {
            let pct = if item.fee_percentage.trim().is_empty() {
                String::new()
            } else {
                format!(" ({}%)", item.fee_percentage.trim())
            };
            output.push_str(&format!(
                "{:12} sale {}  credit note {}  fee {}{}\n",
                "",
                sale.format_amount(&fmt, &settings.currency_symbol),
                credit.format_amount(&fmt, &settings.currency_symbol),
                fee.format_amount(&fmt, &settings.currency_symbol),
                pct
            ));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OrderLineItem;

    #[test]
    fn test_details_show_allocations() {
        let order = Order::new("OP-2025-0012", "Acme").with_item(
            OrderLineItem::new("Prime Time").with_budgets("250.000", "1.000.000", "x"),
        );
        let output = format_order_details(&order, &Settings::default());

        assert!(output.contains("OP-2025-0012"));
        assert!(output.contains("$250.000"));
        assert!(output.contains("$1.000.000"));
        assert!(output.contains("x (?)"));
    }

    #[test]
    fn test_empty_catalog_hint() {
        assert!(format_order_list(&[]).contains("gastos order import"));
    }
}
