//! Lifecycle service
//!
//! Applies approval and payment actions through a ledger. The next state is
//! computed first; a refused transition returns before anything is written,
//! and an accepted one is a single status-only update.

use crate::error::{GastosError, GastosResult};
use crate::ledger::Ledger;
use crate::models::{Expense, ExpenseId, ExpensePatch, Transition};

/// Service for approve / reject / mark paid / close
pub struct LifecycleService<'a> {
    ledger: &'a dyn Ledger,
}

impl<'a> LifecycleService<'a> {
    pub fn new(ledger: &'a dyn Ledger) -> Self {
        Self { ledger }
    }

    /// pending → active (opens the payment axis)
    pub fn approve(&self, id: ExpenseId) -> GastosResult<Expense> {
        self.apply(id, Transition::Approve)
    }

    /// pending | active (unpaid) → annulled on both axes
    pub fn reject(&self, id: ExpenseId) -> GastosResult<Expense> {
        self.apply(id, Transition::Reject)
    }

    /// active & pending payment → active & paid
    pub fn mark_paid(&self, id: ExpenseId) -> GastosResult<Expense> {
        self.apply(id, Transition::MarkPaid)
    }

    /// active & paid → closed
    pub fn close(&self, id: ExpenseId) -> GastosResult<Expense> {
        self.apply(id, Transition::Close)
    }

    pub fn apply(&self, id: ExpenseId, transition: Transition) -> GastosResult<Expense> {
        let expense = self
            .ledger
            .get(id)?
            .ok_or_else(|| GastosError::expense_not_found(id.to_string()))?;

        let from = expense.lifecycle();
        let next = from.apply(transition)?;

        let updated = self.ledger.update(ExpensePatch::transition(id, transition))?;
        tracing::info!(
            id = %id,
            ledger = %self.ledger.category(),
            %transition,
            from = %from,
            to = %next,
            "expense status changed"
        );
        Ok(updated)
    }
}
