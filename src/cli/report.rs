//! Reconciliation report commands

use clap::Subcommand;

use crate::config::settings::Settings;
use crate::display::{format_order_report, format_snapshot};
use crate::error::{GastosError, GastosResult};
use crate::models::ExpenseCategory;
use crate::services::{CatalogService, ReconciliationService};
use crate::storage::Storage;

/// Report subcommands
#[derive(Subcommand, Debug)]
pub enum ReportCommands {
    /// Allocated vs executed for one order item
    Item {
        /// Order item ID
        item: String,
        /// Limit to one budgeted category
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Allocated vs executed for a whole order, per category and item
    Order {
        /// Order number or ID
        order: String,
    },
}

/// Handle a report command
pub fn handle_report_command(
    storage: &Storage,
    settings: &Settings,
    cmd: ReportCommands,
) -> GastosResult<()> {
    let catalog = CatalogService::new(storage, settings.number_format());
    let service = ReconciliationService::new(storage, settings.number_format());

    match cmd {
        ReportCommands::Item { item, category } => {
            let (order, item) = catalog.find_item(&item)?;
            let categories = match category {
                Some(name) => {
                    let category = ExpenseCategory::parse(&name).ok_or_else(|| {
                        GastosError::Validation(format!("Unknown expense category: {}", name))
                    })?;
                    vec![category]
                }
                None => ExpenseCategory::budgeted().to_vec(),
            };

            println!("Order {} / {} ({})", order.number, item.program, item.id);
            for category in categories {
                let snapshot = service.item_snapshot(&order, item.id, category)?;
                println!();
                print!("{}", format_snapshot(&snapshot, settings));
            }
        }

        ReportCommands::Order { order } => {
            let order = catalog.find_order(&order)?;
            let report = service.order_report(&order)?;
            print!("{}", format_order_report(&report, settings));
        }
    }

    Ok(())
}
