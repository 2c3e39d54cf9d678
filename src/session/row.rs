//! Form rows

use std::fmt;

use crate::models::{Expense, ExpenseId, ExpenseInput, Lifecycle};

/// Stable handle of a row inside one session
///
/// Unlike the expense id it never changes, so it survives the draft →
/// persisted id remap and identifies a row while a save is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowKey(pub(crate) u64);

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Presentation state of a row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowState {
    #[default]
    Editing,
    /// A save is in flight; the row refuses edits and another save
    Saving,
    /// Saved on its own and shown collapsed until edited again
    Saved,
}

/// One editable expense row
#[derive(Debug, Clone)]
pub struct FormRow {
    pub(crate) key: RowKey,
    /// Temporary for drafts, server-assigned once persisted
    pub(crate) id: ExpenseId,
    pub(crate) input: ExpenseInput,
    pub(crate) lifecycle: Lifecycle,
    pub(crate) state: RowState,
}

impl FormRow {
    pub(crate) fn draft(key: RowKey, input: ExpenseInput) -> Self {
        Self {
            key,
            id: ExpenseId::new(),
            input,
            lifecycle: Lifecycle::default(),
            state: RowState::Editing,
        }
    }

    pub(crate) fn loaded(key: RowKey, expense: &Expense) -> Self {
        Self {
            key,
            id: expense.id,
            input: expense.to_input(),
            lifecycle: expense.lifecycle(),
            state: RowState::Editing,
        }
    }

    /// Mirror a record the ledger just returned
    pub(crate) fn sync(&mut self, expense: &Expense) {
        self.id = expense.id;
        self.input = expense.to_input();
        self.lifecycle = expense.lifecycle();
    }

    pub fn key(&self) -> RowKey {
        self.key
    }

    pub fn id(&self) -> ExpenseId {
        self.id
    }

    pub fn input(&self) -> &ExpenseInput {
        &self.input
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn state(&self) -> RowState {
        self.state
    }

    pub fn is_saving(&self) -> bool {
        self.state == RowState::Saving
    }

    /// Paid, closed or annulled rows are shown but cannot be edited or saved
    pub fn is_read_only(&self) -> bool {
        self.lifecycle.is_locked_for_edits()
    }
}
