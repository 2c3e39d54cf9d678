//! Path management
//!
//! ## Path Resolution Order
//!
//! 1. `GASTOS_CLI_DATA_DIR` environment variable (if set)
//! 2. Unix (Linux/macOS): `$XDG_CONFIG_HOME/gastos-cli` or `~/.config/gastos-cli`
//! 3. Windows: `%APPDATA%\gastos-cli`

use std::path::PathBuf;

use crate::error::GastosError;
use crate::models::ExpenseCategory;

/// Environment variable overriding the base directory
pub const DATA_DIR_ENV: &str = "GASTOS_CLI_DATA_DIR";

/// Locates every file the application reads or writes
#[derive(Debug, Clone)]
pub struct GastosPaths {
    base_dir: PathBuf,
}

impl GastosPaths {
    /// Resolve the base directory from the environment
    ///
    /// # Errors
    ///
    /// Returns an error if no home/config directory can be determined.
    pub fn new() -> Result<Self, GastosError> {
        let base_dir = match std::env::var(DATA_DIR_ENV) {
            Ok(custom) if !custom.trim().is_empty() => PathBuf::from(custom),
            _ => resolve_default_path()?,
        };

        Ok(Self { base_dir })
    }

    /// Use an explicit base directory (tests)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// `<base>/data`
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// `<base>/data/expenses`
    pub fn expenses_dir(&self) -> PathBuf {
        self.data_dir().join("expenses")
    }

    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    pub fn orders_file(&self) -> PathBuf {
        self.data_dir().join("orders.json")
    }

    /// One ledger file per category, e.g. `data/expenses/talent.json`
    pub fn ledger_file(&self, category: ExpenseCategory) -> PathBuf {
        self.expenses_dir().join(format!("{}.json", category.key()))
    }

    /// Create the base, data and ledger directories
    pub fn ensure_directories(&self) -> Result<(), GastosError> {
        for dir in [self.base_dir.clone(), self.data_dir(), self.expenses_dir()] {
            std::fs::create_dir_all(&dir).map_err(|e| {
                GastosError::Io(format!("Failed to create {}: {}", dir.display(), e))
            })?;
        }
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

#[cfg(not(windows))]
fn resolve_default_path() -> Result<PathBuf, GastosError> {
    let config_base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
        _ => {
            let home = std::env::var("HOME")
                .map_err(|_| GastosError::Config("HOME environment variable not set".into()))?;
            PathBuf::from(home).join(".config")
        }
    };
    Ok(config_base.join("gastos-cli"))
}

#[cfg(windows)]
fn resolve_default_path() -> Result<PathBuf, GastosError> {
    let appdata = std::env::var("APPDATA")
        .map_err(|_| GastosError::Config("Could not determine APPDATA directory".into()))?;
    Ok(PathBuf::from(appdata).join("gastos-cli"))
}
