//! Display formatting for terminal output
//!
//! Plain-text tables for orders, expenses and reconciliation reports. Amounts
//! and dates follow the user's [`Settings`](crate::config::Settings).

pub mod expense;
pub mod order;
pub mod report;

pub use expense::{format_expense_details, format_expense_list, format_save_report, format_session};
pub use order::{format_order_details, format_order_list};
pub use report::{format_order_report, format_snapshot};

/// Truncate to `max_len` characters, marking the cut with an ellipsis
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        ".".repeat(max_len)
    } else {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{}...", kept)
    }
}

/// Format a separator line
pub fn separator(width: usize) -> String {
    "─".repeat(width)
}
