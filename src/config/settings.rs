//! User settings
//!
//! Display conventions (currency symbol, separators, date format) and the
//! operator name recorded as creator on new expenses.

use serde::{Deserialize, Serialize};

use super::paths::GastosPaths;
use crate::error::GastosError;
use crate::models::NumberFormat;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    #[serde(default = "default_currency")]
    pub currency_symbol: String,

    #[serde(default = "default_thousands")]
    pub thousands_separator: char,

    #[serde(default = "default_decimal")]
    pub decimal_separator: char,

    /// strftime format used when showing dates
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Recorded as `created_by` on new expenses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
}

fn default_schema_version() -> u32 {
    1
}

fn default_currency() -> String {
    "$".to_string()
}

fn default_thousands() -> char {
    '.'
}

fn default_decimal() -> char {
    ','
}

fn default_date_format() -> String {
    "%d/%m/%Y".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            currency_symbol: default_currency(),
            thousands_separator: default_thousands(),
            decimal_separator: default_decimal(),
            date_format: default_date_format(),
            operator: None,
        }
    }
}

impl Settings {
    pub fn number_format(&self) -> NumberFormat {
        NumberFormat {
            thousands: self.thousands_separator,
            decimal: self.decimal_separator,
        }
    }

    /// Load settings from disk, or fall back to defaults if no file exists yet
    pub fn load_or_create(paths: &GastosPaths) -> Result<Self, GastosError> {
        let settings_path = paths.settings_file();

        if !settings_path.exists() {
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(&settings_path)
            .map_err(|e| GastosError::Io(format!("Failed to read settings file: {}", e)))?;

        let settings: Settings = serde_json::from_str(&contents)
            .map_err(|e| GastosError::Config(format!("Failed to parse settings file: {}", e)))?;

        if settings.thousands_separator == settings.decimal_separator {
            return Err(GastosError::Config(
                "thousands and decimal separators must differ".into(),
            ));
        }

        Ok(settings)
    }

    pub fn save(&self, paths: &GastosPaths) -> Result<(), GastosError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| GastosError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| GastosError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }
}
