//! Expense repository for JSON storage
//!
//! One instance per category, each backed by `data/expenses/<category>.json`.
//! Records are indexed by linked order and linked item. Every mutation is
//! written through to disk before it returns.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{GastosError, GastosResult};
use crate::ledger::{ExpenseFilter, Ledger};
use crate::models::{Expense, ExpenseCategory, ExpenseId, ExpenseInput, ExpensePatch, ItemId, OrderId};

use super::file_io::{read_json, write_json_atomic};

/// Serializable ledger file
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct ExpenseData {
    expenses: Vec<Expense>,
}

#[derive(Default)]
struct Indexed {
    data: HashMap<ExpenseId, Expense>,
    /// Index: order_id -> expense_ids
    by_order: HashMap<OrderId, Vec<ExpenseId>>,
    /// Index: item_id -> expense_ids
    by_item: HashMap<ItemId, Vec<ExpenseId>>,
}

impl Indexed {
    fn insert(&mut self, expense: Expense) -> Option<Expense> {
        let previous = self.unindex(expense.id);
        if let Some(order_id) = expense.order_id {
            self.by_order.entry(order_id).or_default().push(expense.id);
        }
        if let Some(item_id) = expense.item_id {
            self.by_item.entry(item_id).or_default().push(expense.id);
        }
        self.data.insert(expense.id, expense);
        previous
    }

    fn unindex(&mut self, id: ExpenseId) -> Option<Expense> {
        let old = self.data.remove(&id)?;
        if let Some(ids) = old.order_id.and_then(|o| self.by_order.get_mut(&o)) {
            ids.retain(|&eid| eid != id);
        }
        if let Some(ids) = old.item_id.and_then(|i| self.by_item.get_mut(&i)) {
            ids.retain(|&eid| eid != id);
        }
        Some(old)
    }

    fn sorted(&self) -> Vec<Expense> {
        let mut expenses: Vec<_> = self.data.values().cloned().collect();
        sort_oldest_first(&mut expenses);
        expenses
    }
}

fn sort_oldest_first(expenses: &mut [Expense]) {
    expenses.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
}

/// JSON-backed ledger for one expense category
pub struct ExpenseRepository {
    category: ExpenseCategory,
    path: PathBuf,
    inner: RwLock<Indexed>,
}

impl ExpenseRepository {
    pub fn new(category: ExpenseCategory, path: PathBuf) -> Self {
        Self {
            category,
            path,
            inner: RwLock::new(Indexed::default()),
        }
    }

    /// Load the ledger file and rebuild indexes
    ///
    /// Records whose detail belongs to another category are skipped with a
    /// warning rather than failing the whole ledger.
    pub fn load(&self) -> GastosResult<()> {
        let file_data: ExpenseData = read_json(&self.path)?;
        let mut inner = self.write()?;
        *inner = Indexed::default();

        for expense in file_data.expenses {
            if expense.category() != self.category {
                tracing::warn!(
                    id = %expense.id,
                    ledger = %self.category,
                    found = %expense.category(),
                    "skipping expense filed under the wrong ledger"
                );
                continue;
            }
            inner.insert(expense);
        }

        tracing::debug!(ledger = %self.category, count = inner.data.len(), "loaded ledger");
        Ok(())
    }

    pub fn count(&self) -> GastosResult<usize> {
        Ok(self.read()?.data.len())
    }

    fn persist(&self, inner: &Indexed) -> GastosResult<()> {
        let file_data = ExpenseData {
            expenses: inner.sorted(),
        };
        write_json_atomic(&self.path, &file_data)
    }

    /// Insert and write through; the in-memory change is undone if the write fails
    fn commit(&self, inner: &mut Indexed, expense: Expense) -> GastosResult<Expense> {
        let id = expense.id;
        let previous = inner.insert(expense.clone());

        if let Err(e) = self.persist(inner) {
            inner.unindex(id);
            if let Some(previous) = previous {
                inner.insert(previous);
            }
            return Err(e);
        }
        Ok(expense)
    }

    fn read(&self) -> GastosResult<RwLockReadGuard<'_, Indexed>> {
        self.inner
            .read()
            .map_err(|e| GastosError::Storage(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> GastosResult<RwLockWriteGuard<'_, Indexed>> {
        self.inner
            .write()
            .map_err(|e| GastosError::Storage(format!("Failed to acquire write lock: {}", e)))
    }

    fn check_category(&self, found: ExpenseCategory) -> GastosResult<()> {
        if found != self.category {
            return Err(GastosError::Validation(format!(
                "{} detail cannot be stored in the {} ledger",
                found, self.category
            )));
        }
        Ok(())
    }
}

impl Ledger for ExpenseRepository {
    fn category(&self) -> ExpenseCategory {
        self.category
    }

    fn list(&self, filter: &ExpenseFilter) -> GastosResult<Vec<Expense>> {
        let inner = self.read()?;

        let candidates: Vec<&Expense> = match (filter.item_id, filter.order_id) {
            (Some(item_id), _) => inner
                .by_item
                .get(&item_id)
                .map(|ids| ids.iter().filter_map(|id| inner.data.get(id)).collect())
                .unwrap_or_default(),
            (None, Some(order_id)) => inner
                .by_order
                .get(&order_id)
                .map(|ids| ids.iter().filter_map(|id| inner.data.get(id)).collect())
                .unwrap_or_default(),
            (None, None) => inner.data.values().collect(),
        };

        let mut expenses: Vec<Expense> = candidates
            .into_iter()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();
        sort_oldest_first(&mut expenses);
        Ok(expenses)
    }

    fn get(&self, id: ExpenseId) -> GastosResult<Option<Expense>> {
        Ok(self.read()?.data.get(&id).cloned())
    }

    fn create(&self, input: ExpenseInput) -> GastosResult<Expense> {
        self.check_category(input.category())?;
        input.validate()?;

        let expense = Expense::from_input(input);
        let mut inner = self.write()?;
        let created = self.commit(&mut inner, expense)?;

        tracing::debug!(ledger = %self.category, id = %created.id, net = %created.net, "created expense");
        Ok(created)
    }

    fn update(&self, patch: ExpensePatch) -> GastosResult<Expense> {
        let id = patch
            .id
            .ok_or_else(|| GastosError::Validation("An expense id is required to update".into()))?;

        let mut inner = self.write()?;
        let mut expense = inner
            .data
            .get(&id)
            .cloned()
            .ok_or_else(|| GastosError::expense_not_found(id.to_string()))?;

        let lifecycle = expense.lifecycle();
        if lifecycle.is_terminal() {
            return Err(GastosError::Locked(format!(
                "{} is {} and can no longer change",
                id, lifecycle
            )));
        }
        if patch.has_field_changes() && lifecycle.is_locked_for_edits() {
            return Err(GastosError::Locked(format!(
                "{} is paid; its fields can no longer be edited",
                id
            )));
        }
        if let Some(detail) = &patch.detail {
            self.check_category(detail.category())?;
        }

        expense.apply_patch(&patch)?;
        if patch.has_field_changes() {
            expense.to_input().validate()?;
        }

        let updated = self.commit(&mut inner, expense)?;
        tracing::debug!(
            ledger = %self.category,
            id = %updated.id,
            status = patch.has_status_changes(),
            "updated expense"
        );
        Ok(updated)
    }

    fn remove(&self, id: ExpenseId) -> GastosResult<bool> {
        let mut inner = self.write()?;

        let lifecycle = match inner.data.get(&id) {
            Some(expense) => expense.lifecycle(),
            None => return Ok(false),
        };
        if lifecycle.is_locked_for_edits() {
            return Err(GastosError::Locked(format!(
                "{} is {} and cannot be deleted",
                id, lifecycle
            )));
        }

        let removed = inner.unindex(id);
        if let Err(e) = self.persist(&inner) {
            if let Some(expense) = removed {
                inner.insert(expense);
            }
            return Err(e);
        }

        tracing::debug!(ledger = %self.category, id = %id, "removed expense");
        Ok(true)
    }
}
