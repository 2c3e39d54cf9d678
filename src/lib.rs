//! gastos - budget reconciliation and expense lifecycle for advertising orders
//!
//! Advertising orders carry line items, and each item allocates a budget to
//! three expense categories (implementation, talent, technical). Expenses are
//! recorded in one ledger per category, plus a fourth ledger for direct
//! (overhead) costs that no item funds.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Data directory and user settings
//! - `error`: Custom error types
//! - `models`: Orders, expenses, money and lifecycle states
//! - `ledger`: The per-category ledger contract
//! - `storage`: JSON file implementation of the ledgers and the order store
//! - `services`: Catalog lookups, reconciliation and lifecycle transitions
//! - `session`: Multi-row expense form with batch save
//! - `display`, `export`, `cli`: Terminal output, file export and commands
//!
//! # Example
//!
//! ```rust,ignore
//! use gastos::config::{paths::GastosPaths, settings::Settings};
//! use gastos::storage::Storage;
//!
//! let paths = GastosPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let storage = Storage::new(paths)?;
//! storage.load_all()?;
//! ```

pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod ledger;
pub mod logging;
pub mod models;
pub mod services;
pub mod session;
pub mod storage;

pub use error::{GastosError, GastosResult};
