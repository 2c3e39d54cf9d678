//! Save plumbing for form sessions
//!
//! A single-row save is split in three steps so that several rows can be in
//! flight at the same time: the session hands out a [`PendingSave`], the
//! caller runs it against a ledger whenever it likes, and the resulting
//! [`CompletedSave`] is applied back with `FormSession::finish_save`.

use std::fmt;

use crate::error::{GastosError, GastosResult};
use crate::ledger::Ledger;
use crate::models::{Expense, ExpenseId, ExpenseInput, ExpensePatch};

use super::row::RowKey;

/// Whether a row maps to a new or an existing record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    Create,
    Update,
}

/// A row save that has been started but not executed
#[derive(Debug, Clone)]
pub struct PendingSave {
    pub(crate) key: RowKey,
    pub(crate) id: ExpenseId,
    pub(crate) input: ExpenseInput,
    pub(crate) mode: SaveMode,
}

impl PendingSave {
    pub fn key(&self) -> RowKey {
        self.key
    }

    pub fn mode(&self) -> SaveMode {
        self.mode
    }

    /// Run the ledger call; the session is not touched
    pub fn execute(self, ledger: &dyn Ledger) -> CompletedSave {
        let result = match self.mode {
            SaveMode::Create => ledger.create(self.input),
            SaveMode::Update => ledger.update(ExpensePatch::from_input(self.id, &self.input)),
        };
        CompletedSave {
            key: self.key,
            id: self.id,
            mode: self.mode,
            result,
        }
    }
}

/// The ledger's answer to a [`PendingSave`]
#[derive(Debug)]
pub struct CompletedSave {
    pub(crate) key: RowKey,
    /// Id the row had when the save began (temporary for creates)
    pub(crate) id: ExpenseId,
    pub(crate) mode: SaveMode,
    pub(crate) result: GastosResult<Expense>,
}

impl CompletedSave {
    pub fn key(&self) -> RowKey {
        self.key
    }

    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// What applying a completed save did to the session
#[derive(Debug)]
pub enum RowSaveOutcome {
    /// The row now mirrors the persisted record with this id
    Saved(ExpenseId),
    /// The ledger refused or failed; the row is unchanged and editable
    Failed(GastosError),
    /// The row was removed while the save was in flight; result ignored
    Discarded,
}

impl RowSaveOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved(_))
    }
}

/// A row that failed during save-all
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFailure {
    pub key: RowKey,
    /// 1-based position in the form
    pub position: usize,
    pub message: String,
}

/// Counts from a save-all
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveReport {
    pub created: usize,
    pub create_attempted: usize,
    pub updated: usize,
    pub update_attempted: usize,
    pub failures: Vec<RowFailure>,
}

impl SaveReport {
    pub fn attempted(&self) -> usize {
        self.create_attempted + self.update_attempted
    }

    pub fn succeeded(&self) -> usize {
        self.created + self.updated
    }

    pub fn is_noop(&self) -> bool {
        self.attempted() == 0
    }

    /// Every attempted write went through
    pub fn is_complete(&self) -> bool {
        self.succeeded() == self.attempted()
    }
}

impl fmt::Display for SaveReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_noop() {
            return write!(f, "nothing to save");
        }

        let mut parts = Vec::new();
        if self.create_attempted > 0 {
            parts.push(format!("{} of {} created", self.created, self.create_attempted));
        }
        if self.update_attempted > 0 {
            parts.push(format!("{} of {} updated", self.updated, self.update_attempted));
        }
        write!(f, "{}", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_messages() {
        assert_eq!(SaveReport::default().to_string(), "nothing to save");

        let partial = SaveReport {
            created: 2,
            create_attempted: 3,
            ..SaveReport::default()
        };
        assert_eq!(partial.to_string(), "2 of 3 created");
        assert!(!partial.is_complete());

        let mixed = SaveReport {
            created: 1,
            create_attempted: 1,
            updated: 2,
            update_attempted: 2,
            failures: Vec::new(),
        };
        assert_eq!(mixed.to_string(), "1 of 1 created, 2 of 2 updated");
        assert!(mixed.is_complete());
    }
}
