//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod expense;
pub mod export;
pub mod order;
pub mod report;

pub use expense::{handle_expense_command, ExpenseCommands, ExpenseFields};
pub use export::{handle_export_command, ExportCommands, ReportFormat};
pub use order::{handle_order_command, OrderCommands};
pub use report::{handle_report_command, ReportCommands};
