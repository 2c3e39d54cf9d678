//! CSV export of ledger expenses

use std::io::Write;

use serde::Serialize;

use crate::error::GastosResult;
use crate::models::Expense;

/// One flattened CSV line
#[derive(Debug, Serialize)]
struct ExpenseRecord<'a> {
    id: String,
    category: String,
    order_id: String,
    item_id: String,
    provider: &'a str,
    business_name: &'a str,
    detail: String,
    payment_method: String,
    payment_term_days: Option<u32>,
    invoice_number: &'a str,
    invoice_date: String,
    invoice_issued_to: &'a str,
    /// Machine form: units with a `.` decimal point
    net: String,
    approval: String,
    payment: String,
    created_at: String,
    created_by: &'a str,
    notes: &'a str,
}

impl<'a> From<&'a Expense> for ExpenseRecord<'a> {
    fn from(expense: &'a Expense) -> Self {
        Self {
            id: expense.id.as_uuid().to_string(),
            category: expense.category().key().to_string(),
            order_id: expense
                .order_id
                .map(|id| id.as_uuid().to_string())
                .unwrap_or_default(),
            item_id: expense
                .item_id
                .map(|id| id.as_uuid().to_string())
                .unwrap_or_default(),
            provider: &expense.provider,
            business_name: &expense.business_name,
            detail: expense.detail.summary(),
            payment_method: expense
                .payment_method
                .map(|m| m.to_string())
                .unwrap_or_default(),
            payment_term_days: expense.payment_term_days,
            invoice_number: &expense.invoice_number,
            invoice_date: expense
                .invoice_date
                .map(|d| d.to_string())
                .unwrap_or_default(),
            invoice_issued_to: &expense.invoice_issued_to,
            net: format!("{:.2}", expense.net.to_decimal()),
            approval: expense.approval.to_string(),
            payment: expense.payment.to_string(),
            created_at: expense.created_at.to_rfc3339(),
            created_by: expense.created_by.as_deref().unwrap_or_default(),
            notes: &expense.notes,
        }
    }
}

/// Write expenses as CSV with a header row; returns the number of rows
pub fn export_expenses_csv<W: Write>(expenses: &[Expense], writer: W) -> GastosResult<usize> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    for expense in expenses {
        csv_writer.serialize(ExpenseRecord::from(expense))?;
    }
    csv_writer.flush()?;

    Ok(expenses.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExpenseCategory, ExpenseDetail, ExpenseInput, Money, PaymentMethod};

    #[test]
    fn test_export_quotes_and_amounts() {
        let mut input = ExpenseInput::new(ExpenseCategory::Direct, None, None);
        input.provider = "Pérez, Hnos".into();
        input.business_name = "Pérez Hermanos SA".into();
        input.payment_method = Some(PaymentMethod::Cash);
        input.net = Some(Money::from_cents(1_234_550));
        input.detail = ExpenseDetail::Direct {
            area: "Prensa".into(),
            concept: String::new(),
        };
        let expense = crate::models::Expense::from_input(input);

        let mut buffer = Vec::new();
        let rows = export_expenses_csv(&[expense], &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        assert_eq!(rows, 1);
        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("id,category,order_id,item_id,provider"));
        let line = lines.next().unwrap();
        assert!(line.contains("\"Pérez, Hnos\""));
        assert!(line.contains(",12345.50,"));
        assert!(line.contains(",efectivo,"));
    }

    #[test]
    fn test_export_empty_writes_nothing() {
        let mut buffer = Vec::new();
        assert_eq!(export_expenses_csv(&[], &mut buffer).unwrap(), 0);
        assert!(buffer.is_empty());
    }
}
