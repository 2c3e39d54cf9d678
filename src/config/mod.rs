//! Configuration module
//!
//! - Path resolution for settings and data files
//! - User settings (currency, separators, date format, operator)

pub mod paths;
pub mod settings;

pub use paths::GastosPaths;
pub use settings::Settings;
