//! Expense CLI commands
//!
//! `add` goes through a [`FormSession`] exactly like an interactive form
//! would: open a blank form for the item, fill the draft row, save all.
//! Status commands go through the [`LifecycleService`] of the ledger that
//! owns the expense.

use chrono::NaiveDate;
use clap::{Args, Subcommand};

use crate::config::settings::Settings;
use crate::display::{
    format_expense_details, format_expense_list, format_save_report, format_session,
};
use crate::error::{GastosError, GastosResult};
use crate::ledger::{ExpenseFilter, Ledger};
use crate::models::{
    ApprovalStatus, ExpenseCategory, ExpenseDetail, ExpenseInput, Money, PaymentMethod,
    Transition,
};
use crate::services::{CatalogService, LifecycleService};
use crate::session::FormSession;
use crate::storage::Storage;

/// Expense subcommands
#[derive(Subcommand)]
pub enum ExpenseCommands {
    /// List the expenses of one category
    List {
        /// Category (implementation, talent, technical, direct)
        category: String,
        /// Only expenses linked to this order (number or ID)
        #[arg(short, long)]
        order: Option<String>,
        /// Only expenses linked to this order item (ID)
        #[arg(short, long)]
        item: Option<String>,
        /// Only direct expenses of this area
        #[arg(long)]
        area: Option<String>,
        /// Only expenses with this approval status
        #[arg(long)]
        status: Option<String>,
    },

    /// Show every field of an expense
    Show {
        /// Expense ID
        expense: String,
    },

    /// Record a new expense
    Add {
        /// Category (implementation, talent, technical, direct)
        category: String,
        /// Order item the expense is charged to (required unless direct)
        #[arg(short, long)]
        item: Option<String>,
        /// Order number or ID (direct expenses only; implied by --item)
        #[arg(short, long)]
        order: Option<String>,
        #[command(flatten)]
        fields: ExpenseFields,
    },

    /// Approve a pending expense
    Approve {
        /// Expense ID
        expense: String,
    },

    /// Reject (annul) an expense
    Reject {
        /// Expense ID
        expense: String,
    },

    /// Mark an approved expense as paid
    Pay {
        /// Expense ID
        expense: String,
    },

    /// Close a paid expense
    Close {
        /// Expense ID
        expense: String,
    },

    /// Delete an expense
    Delete {
        /// Expense ID
        expense: String,
    },
}

/// Field values for `expense add`
#[derive(Args, Debug, Default)]
pub struct ExpenseFields {
    /// Provider name
    #[arg(long)]
    pub provider: String,
    /// Legal business name (razón social)
    #[arg(long = "business")]
    pub business_name: String,
    /// Payment method (transferencia, cheque, efectivo)
    #[arg(long)]
    pub method: String,
    /// Payment term in days (required for cheque)
    #[arg(long)]
    pub term: Option<u32>,
    /// Net amount, in the configured number format (e.g. "150.000,50")
    #[arg(long)]
    pub net: String,
    /// Invoice number
    #[arg(long)]
    pub invoice: Option<String>,
    /// Invoice date (configured date format or YYYY-MM-DD)
    #[arg(long)]
    pub invoice_date: Option<String>,
    /// Who the invoice is issued to
    #[arg(long)]
    pub issued_to: Option<String>,
    /// Free-form notes
    #[arg(long)]
    pub notes: Option<String>,
    /// Sector (implementation)
    #[arg(long)]
    pub sector: Option<String>,
    /// Talent name (talent)
    #[arg(long)]
    pub talent: Option<String>,
    /// Talent country (talent)
    #[arg(long)]
    pub country: Option<String>,
    /// Technical service (technical)
    #[arg(long)]
    pub service: Option<String>,
    /// Area (direct)
    #[arg(long)]
    pub area: Option<String>,
    /// Concept (direct)
    #[arg(long)]
    pub concept: Option<String>,
}

/// Handle an expense command
pub fn handle_expense_command(
    storage: &Storage,
    settings: &Settings,
    cmd: ExpenseCommands,
) -> GastosResult<()> {
    match cmd {
        ExpenseCommands::List {
            category,
            order,
            item,
            area,
            status,
        } => {
            let category = parse_category(&category)?;
            let catalog = CatalogService::new(storage, settings.number_format());

            let mut filter = ExpenseFilter::new();
            if let Some(order) = order {
                filter = filter.order(catalog.find_order(&order)?.id);
            }
            if let Some(item) = item {
                filter = filter.item(catalog.find_item(&item)?.1.id);
            }
            if let Some(area) = area {
                filter = filter.area(area);
            }
            if let Some(status) = status {
                let approval = ApprovalStatus::parse(&status).ok_or_else(|| {
                    GastosError::Validation(format!("Unknown approval status: {}", status))
                })?;
                filter = filter.approval(approval);
            }

            let expenses = storage.ledger(category).list(&filter)?;
            print!("{}", format_expense_list(&expenses, settings));
        }

        ExpenseCommands::Show { expense } => {
            let expense = storage.find_expense(&expense)?;
            print!("{}", format_expense_details(&expense, settings));
        }

        ExpenseCommands::Add {
            category,
            item,
            order,
            fields,
        } => add_expense(storage, settings, &category, item, order, fields)?,

        ExpenseCommands::Approve { expense } => {
            change_status(storage, &expense, Transition::Approve, "Approved")?
        }
        ExpenseCommands::Reject { expense } => {
            change_status(storage, &expense, Transition::Reject, "Rejected")?
        }
        ExpenseCommands::Pay { expense } => {
            change_status(storage, &expense, Transition::MarkPaid, "Marked paid")?
        }
        ExpenseCommands::Close { expense } => {
            change_status(storage, &expense, Transition::Close, "Closed")?
        }

        ExpenseCommands::Delete { expense } => {
            let expense = storage.find_expense(&expense)?;
            let ledger = storage.ledger(expense.category());
            if !ledger.remove(expense.id)? {
                return Err(GastosError::expense_not_found(expense.id.to_string()));
            }
            println!("Deleted expense: {} ({})", expense.id, expense.provider);
        }
    }

    Ok(())
}

fn add_expense(
    storage: &Storage,
    settings: &Settings,
    category: &str,
    item: Option<String>,
    order: Option<String>,
    fields: ExpenseFields,
) -> GastosResult<()> {
    let category = parse_category(category)?;
    let catalog = CatalogService::new(storage, settings.number_format());

    let (order_id, item_id) = match (item, order) {
        (Some(_), _) if !category.is_budgeted() => {
            return Err(GastosError::Validation(format!(
                "{} expenses are not charged to an order item; use --order",
                category
            )))
        }
        (Some(item), _) => {
            let (order, item) = catalog.find_item(&item)?;
            (Some(order.id), Some(item.id))
        }
        (None, Some(order)) if !category.is_budgeted() => {
            (Some(catalog.find_order(&order)?.id), None)
        }
        (None, _) if category.is_budgeted() => {
            return Err(GastosError::Validation(format!(
                "{} expenses must be charged to an order item (--item)",
                category
            )))
        }
        (None, _) => (None, None),
    };

    let input = build_input(category, &fields, settings)?;
    let ledger = storage.ledger(category);

    let mut session = FormSession::open_new(category, order_id, item_id)
        .with_creator(settings.operator.clone());
    let key = session
        .rows()
        .first()
        .map(|row| row.key())
        .ok_or_else(|| GastosError::Validation("Form has no rows".into()))?;

    // edit_row keeps the row's links and creator
    session.edit_row(key, |row| *row = input)?;

    let report = session.save_all(ledger)?;
    print!("{}", format_session(&session, settings));
    print!("{}", format_save_report(&report));
    if !report.is_complete() {
        return Err(GastosError::Storage(report.to_string()));
    }

    if let Some(row) = session.row(key) {
        println!("Created expense: {}", row.id());
    }
    Ok(())
}

fn change_status(
    storage: &Storage,
    identifier: &str,
    transition: Transition,
    verb: &str,
) -> GastosResult<()> {
    let expense = storage.find_expense(identifier)?;
    let ledger = storage.ledger(expense.category());
    let updated = LifecycleService::new(ledger).apply(expense.id, transition)?;
    println!("{} expense {} ({})", verb, updated.id, updated.lifecycle());
    Ok(())
}

fn parse_category(s: &str) -> GastosResult<ExpenseCategory> {
    ExpenseCategory::parse(s)
        .ok_or_else(|| GastosError::Validation(format!("Unknown expense category: {}", s)))
}

/// Turn CLI fields into a form row input
///
/// Only the detail flags of `category` are read; the others are ignored.
fn build_input(
    category: ExpenseCategory,
    fields: &ExpenseFields,
    settings: &Settings,
) -> GastosResult<ExpenseInput> {
    let mut input = ExpenseInput::new(category, None, None);

    input.provider = fields.provider.trim().to_string();
    input.business_name = fields.business_name.trim().to_string();
    input.payment_method = Some(PaymentMethod::parse(&fields.method).ok_or_else(|| {
        GastosError::Validation(format!("Unknown payment method: {}", fields.method))
    })?);
    input.payment_term_days = fields.term;
    input.net = Some(
        Money::parse_localized(&fields.net, &settings.number_format()).map_err(|e| {
            GastosError::Validation(format!("Invalid net amount '{}': {}", fields.net, e))
        })?,
    );
    input.invoice_number = fields.invoice.clone().unwrap_or_default();
    input.invoice_date = fields
        .invoice_date
        .as_deref()
        .map(|d| parse_date(d, &settings.date_format))
        .transpose()?;
    input.invoice_issued_to = fields.issued_to.clone().unwrap_or_default();
    input.notes = fields.notes.clone().unwrap_or_default();

    let text = |value: &Option<String>| value.as_deref().unwrap_or("").trim().to_string();
    input.detail = match category {
        ExpenseCategory::Implementation => ExpenseDetail::Implementation {
            sector: text(&fields.sector),
        },
        ExpenseCategory::Talent => ExpenseDetail::Talent {
            talent: text(&fields.talent),
            country: text(&fields.country),
        },
        ExpenseCategory::Technical => ExpenseDetail::Technical {
            service: text(&fields.service),
        },
        ExpenseCategory::Direct => ExpenseDetail::Direct {
            area: text(&fields.area),
            concept: text(&fields.concept),
        },
    };

    Ok(input)
}

fn parse_date(s: &str, preferred: &str) -> GastosResult<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, preferred)
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .map_err(|_| GastosError::Validation(format!("Invalid date: {}", s)))
}
