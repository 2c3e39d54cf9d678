//! CLI commands for data export

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::{Subcommand, ValueEnum};

use crate::config::settings::Settings;
use crate::error::{GastosError, GastosResult};
use crate::export::{csv, json, yaml};
use crate::ledger::{ExpenseFilter, Ledger};
use crate::models::ExpenseCategory;
use crate::services::{CatalogService, ReconciliationService};
use crate::storage::Storage;

/// Report export format
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ReportFormat {
    /// JSON, with schema version and export timestamp
    Json,
    /// YAML, human-readable
    Yaml,
}

/// Export subcommands
#[derive(Subcommand, Debug)]
pub enum ExportCommands {
    /// Export a category ledger to CSV
    Expenses {
        /// Category (implementation, talent, technical, direct)
        category: String,
        /// Output file path (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Only expenses linked to this order (number or ID)
        #[arg(long)]
        order: Option<String>,
    },

    /// Export an order's reconciliation report
    Report {
        /// Order number or ID
        order: String,
        /// Output file path (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Export format
        #[arg(short, long, value_enum, default_value = "json")]
        format: ReportFormat,
    },
}

/// Handle export commands
pub fn handle_export_command(
    storage: &Storage,
    settings: &Settings,
    cmd: ExportCommands,
) -> GastosResult<()> {
    let catalog = CatalogService::new(storage, settings.number_format());

    match cmd {
        ExportCommands::Expenses {
            category,
            output,
            order,
        } => {
            let category = ExpenseCategory::parse(&category).ok_or_else(|| {
                GastosError::Validation(format!("Unknown expense category: {}", category))
            })?;
            let mut filter = ExpenseFilter::new();
            if let Some(order) = order {
                filter = filter.order(catalog.find_order(&order)?.id);
            }
            let expenses = storage.ledger(category).list(&filter)?;

            let count = match &output {
                Some(path) => csv::export_expenses_csv(&expenses, create_file(path)?)?,
                None => csv::export_expenses_csv(&expenses, io::stdout().lock())?,
            };
            if let Some(path) = output {
                println!("Exported {} {} expense(s) to: {}", count, category, path.display());
            }
        }

        ExportCommands::Report {
            order,
            output,
            format,
        } => {
            let order = catalog.find_order(&order)?;
            let report = ReconciliationService::new(storage, settings.number_format())
                .order_report(&order)?;

            let mut writer: Box<dyn Write> = match &output {
                Some(path) => Box::new(create_file(path)?),
                None => Box::new(io::stdout().lock()),
            };
            match format {
                ReportFormat::Json => json::export_report_json(&report, &mut writer)?,
                ReportFormat::Yaml => yaml::export_report_yaml(&report, &mut writer)?,
            }
            writer.flush()?;
            drop(writer);

            if let Some(path) = output {
                println!("Report for order {} exported to: {}", order.number, path.display());
            }
        }
    }

    Ok(())
}

fn create_file(path: &Path) -> GastosResult<BufWriter<File>> {
    let file = File::create(path).map_err(|e| {
        GastosError::Export(format!("Failed to create file {}: {}", path.display(), e))
    })?;
    Ok(BufWriter::new(file))
}
