//! The per-category expense ledger contract
//!
//! Every category (implementation, talent, technical, direct) is served by a
//! ledger with the same shape. Services and the form session only talk to
//! this trait, so the JSON repository and test doubles are interchangeable.

use crate::error::GastosResult;
use crate::models::{
    ApprovalStatus, Expense, ExpenseCategory, ExpenseDetail, ExpenseId, ExpenseInput,
    ExpensePatch, ItemId, OrderId,
};

/// Filter for listing expenses
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpenseFilter {
    pub order_id: Option<OrderId>,
    pub item_id: Option<ItemId>,
    /// Direct-expense area (only direct details carry one)
    pub area: Option<String>,
    pub approval: Option<ApprovalStatus>,
}

impl ExpenseFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn order(mut self, order_id: OrderId) -> Self {
        self.order_id = Some(order_id);
        self
    }

    pub fn item(mut self, item_id: ItemId) -> Self {
        self.item_id = Some(item_id);
        self
    }

    pub fn area(mut self, area: impl Into<String>) -> Self {
        self.area = Some(area.into());
        self
    }

    pub fn approval(mut self, approval: ApprovalStatus) -> Self {
        self.approval = Some(approval);
        self
    }

    pub fn matches(&self, expense: &Expense) -> bool {
        if let Some(order_id) = self.order_id {
            if expense.order_id != Some(order_id) {
                return false;
            }
        }
        if let Some(item_id) = self.item_id {
            if expense.item_id != Some(item_id) {
                return false;
            }
        }
        if let Some(wanted) = &self.area {
            match &expense.detail {
                ExpenseDetail::Direct { area, .. } if area.eq_ignore_ascii_case(wanted.trim()) => {}
                _ => return false,
            }
        }
        if let Some(approval) = self.approval {
            if expense.approval != approval {
                return false;
            }
        }
        true
    }
}

/// Store of expenses for one category
pub trait Ledger {
    fn category(&self) -> ExpenseCategory;

    /// Expenses matching `filter`, oldest first
    fn list(&self, filter: &ExpenseFilter) -> GastosResult<Vec<Expense>>;

    fn get(&self, id: ExpenseId) -> GastosResult<Option<Expense>>;

    /// Validate and persist a new expense with a fresh identifier
    fn create(&self, input: ExpenseInput) -> GastosResult<Expense>;

    /// Best-effort creation of several expenses
    ///
    /// Returns exactly one outcome per input, in input order. A failed input
    /// never shifts the outcomes of the inputs after it.
    fn create_batch(&self, inputs: Vec<ExpenseInput>) -> Vec<GastosResult<Expense>> {
        let attempted = inputs.len();
        let outcomes: Vec<GastosResult<Expense>> =
            inputs.into_iter().map(|input| self.create(input)).collect();

        let failed = outcomes.iter().filter(|o| o.is_err()).count();
        if failed > 0 {
            tracing::warn!(
                category = %self.category(),
                attempted,
                failed,
                "batch create partially failed"
            );
        }
        outcomes
    }

    /// Change only the supplied fields; `patch.id` is required
    fn update(&self, patch: ExpensePatch) -> GastosResult<Expense>;

    /// Delete an expense; `Ok(false)` when it does not exist (anymore)
    fn remove(&self, id: ExpenseId) -> GastosResult<bool>;
}

/// Count of successes in a batch result
pub fn succeeded<T>(outcomes: &[GastosResult<T>]) -> usize {
    outcomes.iter().filter(|o| o.is_ok()).count()
}
