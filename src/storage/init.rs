//! Storage initialization
//!
//! First-run setup: directories, settings and empty data files.

use crate::config::paths::GastosPaths;
use crate::config::settings::Settings;
use crate::error::GastosError;
use crate::models::ExpenseCategory;

use super::file_io::write_json_atomic;

/// Initialize storage for a fresh installation
///
/// Existing files are left untouched, so running it twice is harmless.
/// Returns the categories whose ledger file was created.
pub fn initialize_storage(
    paths: &GastosPaths,
    settings: &Settings,
) -> Result<Vec<ExpenseCategory>, GastosError> {
    paths.ensure_directories()?;

    if !paths.is_initialized() {
        settings.save(paths)?;
    }

    if !paths.orders_file().exists() {
        write_json_atomic(paths.orders_file(), &serde_json::json!({ "orders": [] }))?;
    }

    let mut created = Vec::new();
    for category in ExpenseCategory::all() {
        let path = paths.ledger_file(category);
        if !path.exists() {
            write_json_atomic(&path, &serde_json::json!({ "expenses": [] }))?;
            created.push(category);
        }
    }

    Ok(created)
}

/// Check if storage needs initialization
pub fn needs_initialization(paths: &GastosPaths) -> bool {
    !paths.is_initialized()
}
