//! Order CLI commands
//!
//! Orders are authored outside this tool; the CLI lists them, shows their
//! allocations and imports them from JSON files.

use std::path::PathBuf;

use clap::Subcommand;

use crate::config::settings::Settings;
use crate::display::{format_order_details, format_order_list};
use crate::error::GastosResult;
use crate::services::CatalogService;
use crate::storage::Storage;

/// Order subcommands
#[derive(Subcommand)]
pub enum OrderCommands {
    /// List all orders
    List,

    /// Show an order with its line items and allocations
    Show {
        /// Order number or ID
        order: String,
    },

    /// Import orders from a JSON file (an array of orders)
    Import {
        /// Path to the JSON file
        file: PathBuf,
    },
}

/// Handle an order command
pub fn handle_order_command(
    storage: &Storage,
    settings: &Settings,
    cmd: OrderCommands,
) -> GastosResult<()> {
    let service = CatalogService::new(storage, settings.number_format());

    match cmd {
        OrderCommands::List => {
            let orders = service.list_orders()?;
            print!("{}", format_order_list(&orders));
        }

        OrderCommands::Show { order } => {
            let order = service.find_order(&order)?;
            print!("{}", format_order_details(&order, settings));
        }

        OrderCommands::Import { file } => {
            let count = storage.orders.import(&file)?;
            println!("Imported {} order(s) from {}", count, file.display());
        }
    }

    Ok(())
}
