use anyhow::Result;
use clap::{Parser, Subcommand};

use gastos::cli::{
    handle_expense_command, handle_export_command, handle_order_command, handle_report_command,
};
use gastos::config::{paths::GastosPaths, settings::Settings};
use gastos::storage::Storage;

#[derive(Parser)]
#[command(
    name = "gastos",
    version,
    about = "Budget reconciliation and expense lifecycle for advertising orders",
    long_about = "gastos records the expenses charged against advertising orders, \
                  reconciles them with each line item's implementation, talent and \
                  technical budgets, and walks every expense through approval, \
                  payment and closing."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Order catalog commands
    #[command(subcommand)]
    Order(gastos::cli::OrderCommands),

    /// Expense ledger and lifecycle commands
    #[command(subcommand)]
    Expense(gastos::cli::ExpenseCommands),

    /// Budget reconciliation reports
    #[command(subcommand)]
    Report(gastos::cli::ReportCommands),

    /// Export ledgers and reports
    #[command(subcommand)]
    Export(gastos::cli::ExportCommands),

    /// Initialize the data directory
    Init,

    /// Show configuration
    Config {
        /// Record this operator as creator of new expenses
        #[arg(long)]
        operator: Option<String>,
    },
}

fn main() -> Result<()> {
    gastos::logging::init();
    let cli = Cli::parse();

    // Initialize paths and settings
    let paths = GastosPaths::new()?;
    let mut settings = Settings::load_or_create(&paths)?;

    // Initialize storage
    let storage = Storage::new(paths.clone())?;
    storage.load_all()?;

    match cli.command {
        Some(Commands::Order(cmd)) => handle_order_command(&storage, &settings, cmd)?,
        Some(Commands::Expense(cmd)) => handle_expense_command(&storage, &settings, cmd)?,
        Some(Commands::Report(cmd)) => handle_report_command(&storage, &settings, cmd)?,
        Some(Commands::Export(cmd)) => handle_export_command(&storage, &settings, cmd)?,
        Some(Commands::Init) => {
            println!("Initializing gastos at: {}", paths.data_dir().display());
            let created = gastos::storage::init::initialize_storage(&paths, &settings)?;
            settings.save(&paths)?;
            for category in created {
                println!("  Created {} ledger", category);
            }
            println!("Initialization complete!");
            println!();
            println!("Run 'gastos order import <file>' to load orders.");
        }
        Some(Commands::Config { operator }) => {
            if let Some(operator) = operator {
                settings.operator = Some(operator);
                settings.save(&paths)?;
            }
            println!("gastos Configuration");
            println!("====================");
            println!("Base directory:   {}", paths.base_dir().display());
            println!("Data directory:   {}", paths.data_dir().display());
            println!("Settings file:    {}", paths.settings_file().display());
            println!();
            println!("Settings:");
            println!("  Currency symbol: {}", settings.currency_symbol);
            println!(
                "  Number format:   thousands '{}', decimal '{}'",
                settings.thousands_separator, settings.decimal_separator
            );
            println!("  Date format:     {}", settings.date_format);
            println!(
                "  Operator:        {}",
                settings.operator.as_deref().unwrap_or("(not set)")
            );
        }
        None => {
            println!("gastos - expense reconciliation for advertising orders");
            println!();
            println!("Run 'gastos --help' for usage information.");
        }
    }

    Ok(())
}
