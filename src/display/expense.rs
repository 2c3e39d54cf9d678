//! Expense display formatting

use crate::config::Settings;
use crate::models::{ApprovalStatus, Expense, PaymentStatus};
use crate::session::{FormSession, RowState, SaveReport};

use super::{separator, truncate};

fn status_icon(approval: ApprovalStatus, payment: PaymentStatus) -> &'static str {
    match (approval, payment) {
        (ApprovalStatus::Annulled, _) => "✗",
        (ApprovalStatus::Closed, _) => "■",
        (_, PaymentStatus::Paid) => "$",
        (ApprovalStatus::Active, _) => "✓",
        _ => " ",
    }
}

/// Format a single expense as a table row
pub fn format_expense_row(expense: &Expense, settings: &Settings) -> String {
    let fmt = settings.number_format();
    format!(
        "{} {:12} {:22} {:24} {:>16}  {}",
        status_icon(expense.approval, expense.payment),
        expense.id.to_string(),
        truncate(&expense.provider, 22),
        truncate(&expense.detail.summary(), 24),
        expense.net.format_amount(&fmt, &settings.currency_symbol),
        expense.lifecycle()
    )
}

/// Format a ledger listing with a total line
pub fn format_expense_list(expenses: &[Expense], settings: &Settings) -> String {
    if expenses.is_empty() {
        return "No expenses found.\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{} {:12} {:22} {:24} {:>16}  {}\n",
        " ", "ID", "Provider", "Detail", "Net", "Status"
    ));
    output.push_str(&separator(100));
    output.push('\n');

    for expense in expenses {
        output.push_str(&format_expense_row(expense, settings));
        output.push('\n');
    }

    let total = expenses.iter().map(|e| e.net).sum::<crate::models::Money>();
    output.push_str(&separator(100));
    output.push('\n');
    output.push_str(&format!(
        "{} expense(s), total {}\n",
        expenses.len(),
        total.format_total(&settings.number_format(), &settings.currency_symbol)
    ));

    output
}

/// Format every field of an expense
pub fn format_expense_details(expense: &Expense, settings: &Settings) -> String {
    let fmt = settings.number_format();
    let mut output = String::new();

    output.push_str(&format!("Expense:      {}\n", expense.id));
    output.push_str(&format!("Category:     {}\n", expense.category()));
    if let Some(order_id) = expense.order_id {
        output.push_str(&format!("Order:        {}\n", order_id));
    }
    if let Some(item_id) = expense.item_id {
        output.push_str(&format!("Item:         {}\n", item_id));
    }
    output.push_str(&format!("Provider:     {}\n", expense.provider));
    output.push_str(&format!("Business:     {}\n", expense.business_name));
    output.push_str(&format!("Detail:       {}\n", expense.detail.summary()));

    match (expense.payment_method, expense.payment_term_days) {
        (Some(method), Some(days)) => {
            output.push_str(&format!("Payment:      {} at {} days\n", method, days))
        }
        (Some(method), None) => output.push_str(&format!("Payment:      {}\n", method)),
        (None, _) => output.push_str("Payment:      (none)\n"),
    }

    if !expense.invoice_number.is_empty() {
        output.push_str(&format!("Invoice:      {}\n", expense.invoice_number));
    }
    if let Some(date) = expense.invoice_date {
        output.push_str(&format!(
            "Invoice date: {}\n",
            date.format(&settings.date_format)
        ));
    }
    if !expense.invoice_issued_to.is_empty() {
        output.push_str(&format!("Issued to:    {}\n", expense.invoice_issued_to));
    }

    output.push_str(&format!(
        "Net:          {}\n",
        expense.net.format_amount(&fmt, &settings.currency_symbol)
    ));
    output.push_str(&format!("Approval:     {}\n", expense.approval));
    output.push_str(&format!("Payment st.:  {}\n", expense.payment));
    output.push_str(&format!(
        "Created:      {}{}\n",
        expense.created_at.format(&settings.date_format),
        expense
            .created_by
            .as_deref()
            .map(|by| format!(" by {}", by))
            .unwrap_or_default()
    ));

    if !expense.notes.is_empty() {
        output.push_str(&format!("Notes:        {}\n", expense.notes));
    }

    output
}

/// Format the rows of a form session
pub fn format_session(session: &FormSession, settings: &Settings) -> String {
    let fmt = settings.number_format();
    let mut output = String::new();

    for (index, row) in session.rows().iter().enumerate() {
        let marker = match (row.is_read_only(), row.state()) {
            (true, _) => "locked",
            (false, RowState::Saving) => "saving",
            (false, RowState::Saved) => "saved",
            (false, RowState::Editing) if session.is_draft(row.key()) => "draft",
            (false, RowState::Editing) => "",
        };
        let net = row
            .input()
            .net
            .map(|n| n.format_amount(&fmt, &settings.currency_symbol))
            .unwrap_or_else(|| "-".to_string());
        output.push_str(&format!(
            "{:>3}. {:12} {:22} {:>16}  {}\n",
            index + 1,
            row.id().to_string(),
            truncate(&row.input().provider, 22),
            net,
            marker
        ));
    }

    output
}

/// One-line summary of a save-all, with a line per failed row
pub fn format_save_report(report: &SaveReport) -> String {
    let mut output = format!("{}\n", report);
    for failure in &report.failures {
        output.push_str(&format!("  Row {}: {}\n", failure.position, failure.message));
    }
    output
}
