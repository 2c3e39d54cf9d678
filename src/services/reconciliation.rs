//! Budget reconciliation
//!
//! Joins ledger records to catalog items and orders. Every figure is
//! recomputed from the ledgers on each call; nothing is cached.
//!
//! Item level counts expenses whose item link is that item. Order level
//! counts the union of expenses linked to the order and expenses linked to
//! any of its items, so an expense with only an order link shows up at the
//! order level and nowhere else.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{GastosError, GastosResult};
use crate::ledger::{ExpenseFilter, Ledger};
use crate::models::{
    Expense, ExpenseCategory, ExpenseId, ItemId, Money, NumberFormat, Order, OrderId,
};
use crate::storage::Storage;

/// Allocated vs executed for one category at item or order granularity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BudgetSnapshot {
    pub category: ExpenseCategory,
    pub allocated: Money,
    pub executed: Money,
    /// `allocated - executed`; negative when over budget
    pub available: Money,
    /// Strictly `executed > allocated`
    pub over_budget: bool,
    pub expense_count: usize,
}

impl BudgetSnapshot {
    /// Fails when the executed or available figure does not fit in an amount
    pub fn compute(
        category: ExpenseCategory,
        allocated: Money,
        expenses: &[Expense],
    ) -> GastosResult<Self> {
        let executed = sum_net(category, expenses.iter())?;
        let available = allocated
            .checked_sub(executed)
            .ok_or_else(|| overflow(category, "available"))?;
        Ok(Self {
            category,
            allocated,
            executed,
            available,
            over_budget: executed > allocated,
            expense_count: expenses.len(),
        })
    }
}

fn sum_net<'a>(
    category: ExpenseCategory,
    expenses: impl Iterator<Item = &'a Expense>,
) -> GastosResult<Money> {
    Money::checked_sum(expenses.map(|e| e.net)).ok_or_else(|| overflow(category, "executed"))
}

fn overflow(category: ExpenseCategory, figure: &str) -> GastosError {
    GastosError::Validation(format!(
        "The {} {} total is too large to compute",
        category, figure
    ))
}

/// One item's figures inside an order report
#[derive(Debug, Clone, Serialize)]
pub struct ItemReport {
    pub item_id: ItemId,
    pub program: String,
    pub snapshot: BudgetSnapshot,
}

/// Order totals plus per-item breakdown for one category
#[derive(Debug, Clone, Serialize)]
pub struct CategoryReport {
    pub totals: BudgetSnapshot,
    /// Empty for the direct category, which has no item allocations
    pub items: Vec<ItemReport>,
    /// Executed amount carried by expenses linked to the order but no item
    pub unlinked: Money,
}

/// Full reconciliation of an order across every category
#[derive(Debug, Clone, Serialize)]
pub struct OrderReport {
    pub order_id: OrderId,
    pub number: String,
    pub client: String,
    pub categories: Vec<CategoryReport>,
}

impl OrderReport {
    pub fn category(&self, category: ExpenseCategory) -> Option<&CategoryReport> {
        self.categories.iter().find(|c| c.totals.category == category)
    }

    pub fn any_over_budget(&self) -> bool {
        self.categories.iter().any(|c| {
            c.totals.over_budget || c.items.iter().any(|i| i.snapshot.over_budget)
        })
    }
}

/// Service for allocated/executed/available figures
pub struct ReconciliationService<'a> {
    storage: &'a Storage,
    format: NumberFormat,
}

impl<'a> ReconciliationService<'a> {
    pub fn new(storage: &'a Storage, format: NumberFormat) -> Self {
        Self { storage, format }
    }

    /// Snapshot for one item of `order`
    pub fn item_snapshot(
        &self,
        order: &Order,
        item_id: ItemId,
        category: ExpenseCategory,
    ) -> GastosResult<BudgetSnapshot> {
        let item = order
            .item(item_id)
            .ok_or_else(|| GastosError::item_not_found(item_id.to_string()))?;
        let allocated = item.allocation(category, &self.format)?;

        let expenses = self
            .storage
            .ledger(category)
            .list(&ExpenseFilter::new().item(item_id))?;

        BudgetSnapshot::compute(category, allocated, &expenses)
    }

    /// Snapshot over the whole order
    pub fn order_snapshot(
        &self,
        order: &Order,
        category: ExpenseCategory,
    ) -> GastosResult<BudgetSnapshot> {
        let allocated = order.allocation(category, &self.format)?;
        let expenses = self.order_expenses(order, category)?;
        BudgetSnapshot::compute(category, allocated, &expenses)
    }

    /// Expenses linked to the order or to any of its items, deduplicated
    pub fn order_expenses(
        &self,
        order: &Order,
        category: ExpenseCategory,
    ) -> GastosResult<Vec<Expense>> {
        let ledger = self.storage.ledger(category);
        let mut by_id: BTreeMap<ExpenseId, Expense> = BTreeMap::new();

        for expense in ledger.list(&ExpenseFilter::new().order(order.id))? {
            by_id.insert(expense.id, expense);
        }
        for item in &order.items {
            for expense in ledger.list(&ExpenseFilter::new().item(item.id))? {
                by_id.insert(expense.id, expense);
            }
        }

        let mut expenses: Vec<Expense> = by_id.into_values().collect();
        expenses.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(expenses)
    }

    /// Every category's order snapshot with its per-item breakdown
    pub fn order_report(&self, order: &Order) -> GastosResult<OrderReport> {
        let mut categories = Vec::new();

        for category in ExpenseCategory::all() {
            let expenses = self.order_expenses(order, category)?;
            let totals = BudgetSnapshot::compute(
                category,
                order.allocation(category, &self.format)?,
                &expenses,
            )?;

            let mut items = Vec::new();
            if category.is_budgeted() {
                for item in &order.items {
                    let linked: Vec<Expense> = expenses
                        .iter()
                        .filter(|e| e.item_id == Some(item.id))
                        .cloned()
                        .collect();
                    items.push(ItemReport {
                        item_id: item.id,
                        program: item.program.clone(),
                        snapshot: BudgetSnapshot::compute(
                            category,
                            item.allocation(category, &self.format)?,
                            &linked,
                        )?,
                    });
                }
            }

            let unlinked = sum_net(
                category,
                expenses
                    .iter()
                    .filter(|e| e.item_id.map_or(true, |id| !order.has_item(id))),
            )?;

            categories.push(CategoryReport {
                totals,
                items,
                unlinked,
            });
        }

        Ok(OrderReport {
            order_id: order.id,
            number: order.number.clone(),
            client: order.client.clone(),
            categories,
        })
    }
}
