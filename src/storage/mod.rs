//! Storage layer
//!
//! JSON file storage with atomic writes: one order catalog file and one
//! ledger file per expense category.

pub mod expenses;
pub mod file_io;
pub mod init;
pub mod orders;

pub use expenses::ExpenseRepository;
pub use file_io::{read_json, write_json_atomic};
pub use init::initialize_storage;
pub use orders::OrderRepository;

use crate::config::paths::GastosPaths;
use crate::error::{GastosError, GastosResult};
use crate::ledger::{ExpenseFilter, Ledger};
use crate::models::{Expense, ExpenseCategory};

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: GastosPaths,
    pub orders: OrderRepository,
    implementation: ExpenseRepository,
    talent: ExpenseRepository,
    technical: ExpenseRepository,
    direct: ExpenseRepository,
}

impl Storage {
    pub fn new(paths: GastosPaths) -> Result<Self, GastosError> {
        paths.ensure_directories()?;

        let ledger = |category| ExpenseRepository::new(category, paths.ledger_file(category));

        Ok(Self {
            orders: OrderRepository::new(paths.orders_file()),
            implementation: ledger(ExpenseCategory::Implementation),
            talent: ledger(ExpenseCategory::Talent),
            technical: ledger(ExpenseCategory::Technical),
            direct: ledger(ExpenseCategory::Direct),
            paths,
        })
    }

    pub fn paths(&self) -> &GastosPaths {
        &self.paths
    }

    /// The ledger serving `category`
    pub fn ledger(&self, category: ExpenseCategory) -> &ExpenseRepository {
        match category {
            ExpenseCategory::Implementation => &self.implementation,
            ExpenseCategory::Talent => &self.talent,
            ExpenseCategory::Technical => &self.technical,
            ExpenseCategory::Direct => &self.direct,
        }
    }

    /// Load all data from disk
    pub fn load_all(&self) -> Result<(), GastosError> {
        self.orders.load()?;
        for category in ExpenseCategory::all() {
            self.ledger(category).load()?;
        }
        Ok(())
    }

    /// Look an expense up across every ledger by full id or short prefix
    ///
    /// An ambiguous prefix is an error rather than a guess.
    pub fn find_expense(&self, identifier: &str) -> GastosResult<Expense> {
        let mut found = Vec::new();
        for category in ExpenseCategory::all() {
            found.extend(
                self.ledger(category)
                    .list(&ExpenseFilter::new())?
                    .into_iter()
                    .filter(|e| e.id.matches(identifier)),
            );
        }

        match found.len() {
            0 => Err(GastosError::expense_not_found(identifier)),
            1 => Ok(found.remove(0)),
            n => Err(GastosError::Validation(format!(
                "'{}' matches {} expenses; use more characters",
                identifier, n
            ))),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.paths.is_initialized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExpenseDetail, ExpenseInput, Money, PaymentMethod};
    use tempfile::TempDir;

    #[test]
    fn test_storage_creation() {
        let temp_dir = TempDir::new().unwrap();
        let paths = GastosPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();

        assert!(temp_dir.path().join("data").join("expenses").exists());
        assert!(!storage.is_initialized());
        for category in ExpenseCategory::all() {
            assert_eq!(storage.ledger(category).category(), category);
        }
    }

    #[test]
    fn test_find_expense_by_short_id() {
        let temp_dir = TempDir::new().unwrap();
        let paths = GastosPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();

        let mut input = ExpenseInput::new(ExpenseCategory::Direct, None, None);
        input.provider = "Correo".into();
        input.business_name = "Correo SA".into();
        input.payment_method = Some(PaymentMethod::Transfer);
        input.net = Some(Money::from_units(900));
        input.detail = ExpenseDetail::Direct {
            area: "Logística".into(),
            concept: "Envíos".into(),
        };
        let created = storage.ledger(ExpenseCategory::Direct).create(input).unwrap();

        let short = created.id.to_string();
        assert_eq!(storage.find_expense(&short).unwrap().id, created.id);
        let stranger = crate::models::ExpenseId::new().as_uuid().to_string();
        assert!(storage.find_expense(&stranger).unwrap_err().is_not_found());
    }
}
