//! Batch form session
//!
//! The editable buffer behind a multi-row expense form for one order or item.
//! Rows live in an ordered arena addressed by [`RowKey`]. The session owns
//! the set of ids it loaded or saved; a row whose id is in that set is
//! written with `update`, any other row is a draft written with `create`.
//!
//! A form always shows at least one row: opening an empty form and deleting
//! the last row both seed a blank draft.

mod row;
mod save;

pub use row::{FormRow, RowKey, RowState};
pub use save::{CompletedSave, PendingSave, RowFailure, RowSaveOutcome, SaveMode, SaveReport};

use std::collections::HashSet;

use crate::error::{GastosError, GastosResult};
use crate::ledger::{ExpenseFilter, Ledger};
use crate::models::{
    ExpenseCategory, ExpenseId, ExpenseInput, ExpensePatch, ItemId, OrderId, ValidationErrors,
};

/// Editable rows for one order/item in one category
#[derive(Debug)]
pub struct FormSession {
    category: ExpenseCategory,
    order_id: Option<OrderId>,
    item_id: Option<ItemId>,
    created_by: Option<String>,
    rows: Vec<FormRow>,
    /// Ids known to exist in the ledger
    persisted: HashSet<ExpenseId>,
    next_key: u64,
}

impl FormSession {
    /// Blank form with a single draft row
    pub fn open_new(
        category: ExpenseCategory,
        order_id: Option<OrderId>,
        item_id: Option<ItemId>,
    ) -> Self {
        let mut session = Self {
            category,
            order_id,
            item_id,
            created_by: None,
            rows: Vec::new(),
            persisted: HashSet::new(),
            next_key: 0,
        };
        session.add_row();
        session
    }

    /// Form over the existing expenses of an item (or order), oldest first
    ///
    /// Budgeted forms need at least one link. An unlinked direct form
    /// loads the whole direct ledger.
    pub fn open(
        ledger: &dyn Ledger,
        order_id: Option<OrderId>,
        item_id: Option<ItemId>,
    ) -> GastosResult<Self> {
        if order_id.is_none() && item_id.is_none() && ledger.category().is_budgeted() {
            return Err(GastosError::Validation(format!(
                "A {} form needs an order or an item",
                ledger.category()
            )));
        }

        let mut filter = ExpenseFilter::new();
        filter.order_id = order_id;
        filter.item_id = item_id;
        let expenses = ledger.list(&filter)?;

        let mut session = Self {
            category: ledger.category(),
            order_id,
            item_id,
            created_by: None,
            rows: Vec::with_capacity(expenses.len().max(1)),
            persisted: HashSet::new(),
            next_key: 0,
        };

        for expense in &expenses {
            let key = session.next_key();
            session.persisted.insert(expense.id);
            session.rows.push(FormRow::loaded(key, expense));
        }
        if session.rows.is_empty() {
            session.add_row();
        }

        tracing::debug!(
            category = %session.category,
            loaded = expenses.len(),
            "opened form session"
        );
        Ok(session)
    }

    /// Record `creator` on every draft this session creates
    pub fn with_creator(mut self, creator: Option<String>) -> Self {
        for row in self.rows.iter_mut() {
            if !self.persisted.contains(&row.id) {
                row.input.created_by = creator.clone();
            }
        }
        self.created_by = creator;
        self
    }

    pub fn category(&self) -> ExpenseCategory {
        self.category
    }

    pub fn rows(&self) -> &[FormRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, key: RowKey) -> Option<&FormRow> {
        self.rows.iter().find(|r| r.key == key)
    }

    /// Whether the row has never been persisted
    pub fn is_draft(&self, key: RowKey) -> bool {
        self.row(key)
            .map(|r| !self.persisted.contains(&r.id))
            .unwrap_or(false)
    }

    pub fn is_persisted(&self, id: ExpenseId) -> bool {
        self.persisted.contains(&id)
    }

    /// Append a blank draft row linked to the session's order/item
    pub fn add_row(&mut self) -> RowKey {
        let key = self.next_key();
        let mut input = ExpenseInput::new(self.category, self.order_id, self.item_id);
        input.created_by = self.created_by.clone();
        self.rows.push(FormRow::draft(key, input));
        key
    }

    /// Change a row's fields
    ///
    /// Links, creator and category cannot be changed from the form.
    pub fn edit_row<F>(&mut self, key: RowKey, edit: F) -> GastosResult<()>
    where
        F: FnOnce(&mut ExpenseInput),
    {
        let category = self.category;
        let index = self.index_of(key)?;
        let row = &mut self.rows[index];

        if row.is_read_only() {
            return Err(GastosError::Locked(format!(
                "row {} is {} and read-only",
                index + 1,
                row.lifecycle
            )));
        }
        if row.is_saving() {
            return Err(GastosError::Validation(format!(
                "Row {} is being saved",
                index + 1
            )));
        }

        let mut input = row.input.clone();
        edit(&mut input);
        if input.category() != category {
            return Err(GastosError::Validation(format!(
                "A {} form cannot hold {} details",
                category,
                input.category()
            )));
        }
        input.order_id = row.input.order_id;
        input.item_id = row.input.item_id;
        input.created_by = row.input.created_by.clone();

        row.input = input;
        row.state = RowState::Editing;
        Ok(())
    }

    /// Check one row, tagging errors with its 1-based position
    pub fn validate_row(&self, key: RowKey) -> GastosResult<()> {
        let index = self.index_of(key)?;
        if let Err(errors) = self.rows[index].input.validate() {
            let mut tagged = ValidationErrors::new();
            tagged.extend_for_row(index + 1, errors);
            return Err(tagged.into());
        }
        Ok(())
    }

    /// Check every row that a save-all would write
    pub fn validate_all(&self) -> Result<(), ValidationErrors> {
        let mut all = ValidationErrors::new();
        for (index, row) in self.rows.iter().enumerate() {
            if row.is_read_only() || row.is_saving() {
                continue;
            }
            if let Err(errors) = row.input.validate() {
                all.extend_for_row(index + 1, errors);
            }
        }
        all.into_result()
    }

    /// Write every editable row
    ///
    /// Nothing is written if any row fails validation. Otherwise persisted
    /// rows are updated one by one and drafts are created in one batch; the
    /// Nth batch outcome belongs to the Nth draft. Ledger failures are
    /// reported per row and leave that row untouched for a retry.
    pub fn save_all(&mut self, ledger: &dyn Ledger) -> GastosResult<SaveReport> {
        self.validate_all()?;

        let mut to_update = Vec::new();
        let mut to_create = Vec::new();
        for (index, row) in self.rows.iter().enumerate() {
            if row.is_read_only() || row.is_saving() {
                continue;
            }
            if self.persisted.contains(&row.id) {
                to_update.push((index + 1, row.key));
            } else {
                to_create.push((index + 1, row.key));
            }
        }

        let mut report = SaveReport {
            update_attempted: to_update.len(),
            create_attempted: to_create.len(),
            ..SaveReport::default()
        };

        for (position, key) in to_update {
            let index = self.index_of(key)?;
            let patch = ExpensePatch::from_input(self.rows[index].id, &self.rows[index].input);
            match ledger.update(patch) {
                Ok(expense) => {
                    self.rows[index].sync(&expense);
                    report.updated += 1;
                }
                Err(e) => report.failures.push(RowFailure {
                    key,
                    position,
                    message: e.to_string(),
                }),
            }
        }

        if !to_create.is_empty() {
            let inputs = to_create
                .iter()
                .map(|&(_, key)| self.index_of(key).map(|i| self.rows[i].input.clone()))
                .collect::<GastosResult<Vec<_>>>()?;

            let mut outcomes = ledger.create_batch(inputs).into_iter();
            for (position, key) in to_create {
                let index = self.index_of(key)?;
                match outcomes.next() {
                    Some(Ok(expense)) => {
                        self.persisted.insert(expense.id);
                        self.rows[index].sync(&expense);
                        report.created += 1;
                    }
                    Some(Err(e)) => report.failures.push(RowFailure {
                        key,
                        position,
                        message: e.to_string(),
                    }),
                    None => report.failures.push(RowFailure {
                        key,
                        position,
                        message: "the ledger returned no result for this row".into(),
                    }),
                }
            }
        }

        if report.is_complete() {
            tracing::info!(category = %self.category, summary = %report, "form saved");
        } else {
            tracing::warn!(
                category = %self.category,
                summary = %report,
                failed = report.failures.len(),
                "form partially saved"
            );
        }
        Ok(report)
    }

    /// Start saving one row; the row is marked as saving until finished
    pub fn begin_save(&mut self, key: RowKey) -> GastosResult<PendingSave> {
        let index = self.index_of(key)?;
        let row = &self.rows[index];

        if row.is_read_only() {
            return Err(GastosError::Locked(format!(
                "row {} is {} and read-only",
                index + 1,
                row.lifecycle
            )));
        }
        if row.is_saving() {
            return Err(GastosError::Validation(format!(
                "Row {} is already being saved",
                index + 1
            )));
        }
        self.validate_row(key)?;

        let mode = if self.persisted.contains(&row.id) {
            SaveMode::Update
        } else {
            SaveMode::Create
        };
        let pending = PendingSave {
            key,
            id: row.id,
            input: row.input.clone(),
            mode,
        };

        self.rows[index].state = RowState::Saving;
        Ok(pending)
    }

    /// Apply the ledger's answer to a row save
    pub fn finish_save(&mut self, completed: CompletedSave) -> RowSaveOutcome {
        let Some(row) = self.rows.iter_mut().find(|r| r.key == completed.key) else {
            tracing::debug!(row = %completed.key, id = %completed.id, "row gone, discarding save result");
            return RowSaveOutcome::Discarded;
        };

        match completed.result {
            Ok(expense) => {
                tracing::debug!(
                    row = %completed.key,
                    from = %completed.id,
                    to = %expense.id,
                    mode = ?completed.mode,
                    "row saved"
                );
                row.sync(&expense);
                row.state = RowState::Saved;
                self.persisted.insert(expense.id);
                RowSaveOutcome::Saved(expense.id)
            }
            Err(e) => {
                row.state = RowState::Editing;
                RowSaveOutcome::Failed(e)
            }
        }
    }

    /// Save one row in a single step
    pub fn save_row(&mut self, key: RowKey, ledger: &dyn Ledger) -> GastosResult<RowSaveOutcome> {
        let pending = self.begin_save(key)?;
        Ok(self.finish_save(pending.execute(ledger)))
    }

    /// Remove a row, deleting its record from the ledger if it was persisted
    ///
    /// Returns whether a ledger record was removed. A draft can be dropped
    /// while it is saving; its save result will be discarded.
    pub fn delete_row(&mut self, key: RowKey, ledger: &dyn Ledger) -> GastosResult<bool> {
        let index = self.index_of(key)?;
        let row = &self.rows[index];
        let mut removed = false;

        if self.persisted.contains(&row.id) {
            if row.is_read_only() {
                return Err(GastosError::Locked(format!(
                    "row {} is {} and cannot be deleted",
                    index + 1,
                    row.lifecycle
                )));
            }
            if row.is_saving() {
                return Err(GastosError::Validation(format!(
                    "Row {} is being saved",
                    index + 1
                )));
            }
            removed = ledger.remove(row.id)?;
        }

        let row = self.rows.remove(index);
        self.persisted.remove(&row.id);
        if self.rows.is_empty() {
            self.add_row();
        }
        Ok(removed)
    }

    fn next_key(&mut self) -> RowKey {
        let key = RowKey(self.next_key);
        self.next_key += 1;
        key
    }

    fn index_of(&self, key: RowKey) -> GastosResult<usize> {
        self.rows
            .iter()
            .position(|r| r.key == key)
            .ok_or_else(|| GastosError::NotFound {
                entity_type: "Form row",
                identifier: key.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Expense, ExpenseDetail, Money, PaymentMethod, Transition};
    use crate::storage::ExpenseRepository;
    use std::cell::Cell;
    use tempfile::TempDir;

    /// Ledger whose chosen create calls (0-based) and optionally every
    /// update fail with a storage error
    struct FlakyLedger {
        inner: ExpenseRepository,
        create_calls: Cell<usize>,
        failing_creates: Vec<usize>,
        fail_updates: bool,
    }

    impl FlakyLedger {
        fn new(inner: ExpenseRepository, failing_creates: Vec<usize>) -> Self {
            Self {
                inner,
                create_calls: Cell::new(0),
                failing_creates,
                fail_updates: false,
            }
        }
    }

    impl Ledger for FlakyLedger {
        fn category(&self) -> ExpenseCategory {
            self.inner.category()
        }

        fn list(&self, filter: &ExpenseFilter) -> GastosResult<Vec<Expense>> {
            self.inner.list(filter)
        }

        fn get(&self, id: ExpenseId) -> GastosResult<Option<Expense>> {
            self.inner.get(id)
        }

        fn create(&self, input: ExpenseInput) -> GastosResult<Expense> {
            let call = self.create_calls.get();
            self.create_calls.set(call + 1);
            if self.failing_creates.contains(&call) {
                return Err(GastosError::Storage("connection reset".into()));
            }
            self.inner.create(input)
        }

        fn update(&self, patch: ExpensePatch) -> GastosResult<Expense> {
            if self.fail_updates {
                return Err(GastosError::Storage("timeout".into()));
            }
            self.inner.update(patch)
        }

        fn remove(&self, id: ExpenseId) -> GastosResult<bool> {
            self.inner.remove(id)
        }
    }

    fn talent_ledger() -> (TempDir, ExpenseRepository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = ExpenseRepository::new(ExpenseCategory::Talent, temp_dir.path().join("talent.json"));
        (temp_dir, repo)
    }

    fn fill(provider: &'static str, net: i64) -> impl FnOnce(&mut ExpenseInput) {
        move |input| {
            input.provider = provider.into();
            input.business_name = format!("{} SRL", provider);
            input.payment_method = Some(PaymentMethod::Transfer);
            input.net = Some(Money::from_units(net));
            input.detail = ExpenseDetail::Talent {
                talent: "Conductor".into(),
                country: "AR".into(),
            };
        }
    }

    fn links() -> (Option<OrderId>, Option<ItemId>) {
        (Some(OrderId::new()), Some(ItemId::new()))
    }

    fn mark_paid(ledger: &ExpenseRepository, id: ExpenseId) {
        ledger.update(ExpensePatch::transition(id, Transition::Approve)).unwrap();
        ledger.update(ExpensePatch::transition(id, Transition::MarkPaid)).unwrap();
    }

    #[test]
    fn test_budgeted_form_needs_a_link() {
        let (_temp_dir, ledger) = talent_ledger();
        let (order_id, item_id) = links();
        let mut input = ExpenseInput::new(ExpenseCategory::Talent, order_id, item_id);
        fill("Ajeno", 10)(&mut input);
        ledger.create(input).unwrap();

        let err = FormSession::open(&ledger, None, None).unwrap_err();
        assert!(err.is_validation());

        let by_order = FormSession::open(&ledger, order_id, None).unwrap();
        assert_eq!(by_order.len(), 1);
    }

    #[test]
    fn test_unlinked_direct_form_loads_every_direct_expense() {
        let temp_dir = TempDir::new().unwrap();
        let ledger =
            ExpenseRepository::new(ExpenseCategory::Direct, temp_dir.path().join("direct.json"));
        for provider in ["Imprenta", "Catering"] {
            let mut input = ExpenseInput::new(ExpenseCategory::Direct, None, None);
            input.provider = provider.into();
            input.business_name = format!("{} SA", provider);
            input.payment_method = Some(PaymentMethod::Transfer);
            input.net = Some(Money::from_units(1_000));
            input.detail = ExpenseDetail::Direct {
                area: "Producción".into(),
                concept: String::new(),
            };
            ledger.create(input).unwrap();
        }

        let session = FormSession::open(&ledger, None, None).unwrap();
        assert_eq!(session.len(), 2);
    }

    #[test]
    fn test_empty_form_seeds_one_draft_and_reseeds_on_delete() {
        let (_temp_dir, ledger) = talent_ledger();
        let (order_id, item_id) = links();

        let mut session = FormSession::open(&ledger, order_id, item_id).unwrap();
        assert_eq!(session.len(), 1);
        let first = session.rows()[0].key();
        assert!(session.is_draft(first));
        assert_eq!(session.rows()[0].input().item_id, item_id);

        assert!(!session.delete_row(first, &ledger).unwrap());
        assert_eq!(session.len(), 1);
        let reseeded = session.rows()[0].key();
        assert_ne!(reseeded, first);
        assert!(session.is_draft(reseeded));
        assert!(session.rows()[0].input().provider.is_empty());
    }

    #[test]
    fn test_partial_batch_failure_remaps_only_successes() {
        let (_temp_dir, repo) = talent_ledger();
        let ledger = FlakyLedger::new(repo, vec![1]);
        let (order_id, item_id) = links();

        let mut session = FormSession::open_new(ExpenseCategory::Talent, order_id, item_id);
        let a = session.rows()[0].key();
        let b = session.add_row();
        let c = session.add_row();
        session.edit_row(a, fill("Uno", 100)).unwrap();
        session.edit_row(b, fill("Dos", 200)).unwrap();
        session.edit_row(c, fill("Tres", 300)).unwrap();
        let temp_b = session.row(b).unwrap().id();

        let report = session.save_all(&ledger).unwrap();

        assert_eq!(report.to_string(), "2 of 3 created");
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].key, b);
        assert_eq!(report.failures[0].position, 2);

        for key in [a, c] {
            let row = session.row(key).unwrap();
            assert!(!session.is_draft(key));
            let stored = ledger.get(row.id()).unwrap().unwrap();
            assert_eq!(stored.provider, row.input().provider);
        }
        assert!(session.is_draft(b));
        assert_eq!(session.row(b).unwrap().id(), temp_b);
        assert!(ledger.get(temp_b).unwrap().is_none());

        // Retry: the two saved rows become updates, the failed one is created
        let retry = session.save_all(&ledger).unwrap();
        assert_eq!(retry.to_string(), "1 of 1 created, 2 of 2 updated");
        assert_eq!(ledger.list(&ExpenseFilter::new()).unwrap().len(), 3);
    }

    #[test]
    fn test_cheque_needs_term_but_cash_does_not() {
        let (_temp_dir, ledger) = talent_ledger();
        let (order_id, item_id) = links();
        let mut session = FormSession::open_new(ExpenseCategory::Talent, order_id, item_id);
        let key = session.rows()[0].key();

        session.edit_row(key, fill("Cheques", 10)).unwrap();
        session
            .edit_row(key, |input| input.payment_method = Some(PaymentMethod::Check))
            .unwrap();

        match session.save_all(&ledger) {
            Err(GastosError::InvalidFields(errors)) => {
                assert!(errors.has_field("payment_term_days"));
                assert_eq!(errors.len(), 1);
                assert!(errors.to_string().starts_with("Row 1: "));
            }
            other => panic!("expected validation failure, got {:?}", other),
        }
        assert!(ledger.list(&ExpenseFilter::new()).unwrap().is_empty());

        session
            .edit_row(key, |input| input.payment_method = Some(PaymentMethod::Cash))
            .unwrap();
        let report = session.save_all(&ledger).unwrap();
        assert_eq!(report.to_string(), "1 of 1 created");
    }

    #[test]
    fn test_validation_failure_blocks_every_write() {
        let (_temp_dir, ledger) = talent_ledger();
        let (order_id, item_id) = links();
        let mut session = FormSession::open_new(ExpenseCategory::Talent, order_id, item_id);
        let good = session.rows()[0].key();
        session.edit_row(good, fill("Bien", 1)).unwrap();
        session.add_row();

        let err = session.save_all(&ledger).unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("Row 2: Provider is required"));
        assert!(ledger.list(&ExpenseFilter::new()).unwrap().is_empty());
        assert!(session.is_draft(good));
    }

    #[test]
    fn test_nothing_to_save() {
        let (_temp_dir, ledger) = talent_ledger();
        let (order_id, item_id) = links();
        let mut input = ExpenseInput::new(ExpenseCategory::Talent, order_id, item_id);
        fill("Pagado", 5)(&mut input);
        let paid = ledger.create(input).unwrap();
        mark_paid(&ledger, paid.id);

        let mut session = FormSession::open(&ledger, order_id, item_id).unwrap();
        assert_eq!(session.len(), 1);
        assert!(session.rows()[0].is_read_only());

        let report = session.save_all(&ledger).unwrap();
        assert!(report.is_noop());
        assert_eq!(report.to_string(), "nothing to save");
    }

    #[test]
    fn test_loaded_rows_update_and_read_only_rows_refuse_edits() {
        let (_temp_dir, ledger) = talent_ledger();
        let (order_id, item_id) = links();
        let mut ids = Vec::new();
        for (provider, net) in [("Viejo", 300_000), ("Nuevo", 800_000)] {
            let mut input = ExpenseInput::new(ExpenseCategory::Talent, order_id, item_id);
            fill(provider, net)(&mut input);
            ids.push(ledger.create(input).unwrap().id);
        }
        mark_paid(&ledger, ids[1]);

        let mut session = FormSession::open(&ledger, order_id, item_id).unwrap();
        assert_eq!(session.len(), 2);
        let loaded: HashSet<ExpenseId> = session.rows().iter().map(|r| r.id()).collect();
        assert_eq!(loaded, ids.iter().copied().collect());

        let editable = session.rows().iter().find(|r| r.id() == ids[0]).unwrap().key();
        let locked = session.rows().iter().find(|r| r.id() == ids[1]).unwrap().key();

        assert!(matches!(
            session.edit_row(locked, |i| i.notes = "no".into()),
            Err(GastosError::Locked(_))
        ));
        session
            .edit_row(editable, |i| i.net = Some(Money::from_units(350_000)))
            .unwrap();

        let report = session.save_all(&ledger).unwrap();
        assert_eq!(report.to_string(), "1 of 1 updated");
        assert_eq!(
            ledger.get(ids[0]).unwrap().unwrap().net,
            Money::from_units(350_000)
        );
    }

    #[test]
    fn test_failed_update_leaves_buffer_for_retry() {
        let (_temp_dir, repo) = talent_ledger();
        let (order_id, item_id) = links();
        let mut input = ExpenseInput::new(ExpenseCategory::Talent, order_id, item_id);
        fill("Original", 10)(&mut input);
        let existing = repo.create(input).unwrap();

        let mut ledger = FlakyLedger::new(repo, Vec::new());
        ledger.fail_updates = true;
        let mut session = FormSession::open(&ledger, order_id, item_id).unwrap();
        let key = session.rows()[0].key();
        session.edit_row(key, |i| i.notes = "editado".into()).unwrap();

        let report = session.save_all(&ledger).unwrap();
        assert_eq!(report.to_string(), "0 of 1 updated");
        assert_eq!(session.row(key).unwrap().input().notes, "editado");
        assert_eq!(ledger.get(existing.id).unwrap().unwrap().notes, "");

        ledger.fail_updates = false;
        assert!(session.save_all(&ledger).unwrap().is_complete());
        assert_eq!(ledger.get(existing.id).unwrap().unwrap().notes, "editado");
    }

    #[test]
    fn test_edit_cannot_relink_or_change_category() {
        let (order_id, item_id) = links();
        let mut session = FormSession::open_new(ExpenseCategory::Talent, order_id, item_id);
        let key = session.rows()[0].key();

        session
            .edit_row(key, |i| {
                i.item_id = Some(ItemId::new());
                i.provider = "X".into();
            })
            .unwrap();
        assert_eq!(session.row(key).unwrap().input().item_id, item_id);
        assert_eq!(session.row(key).unwrap().input().provider, "X");

        let err = session
            .edit_row(key, |i| {
                i.detail = ExpenseDetail::Technical {
                    service: "Luces".into(),
                }
            })
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_two_rows_in_flight() {
        let (_temp_dir, ledger) = talent_ledger();
        let (order_id, item_id) = links();
        let mut session = FormSession::open_new(ExpenseCategory::Talent, order_id, item_id);
        let a = session.rows()[0].key();
        let b = session.add_row();
        session.edit_row(a, fill("Alfa", 1)).unwrap();
        session.edit_row(b, fill("Beta", 2)).unwrap();

        let pending_a = session.begin_save(a).unwrap();
        let pending_b = session.begin_save(b).unwrap();
        assert!(session.row(a).unwrap().is_saving());
        assert!(session.begin_save(a).is_err());
        assert!(session.edit_row(a, |i| i.notes = "x".into()).is_err());

        // Results may arrive in any order
        let done_b = pending_b.execute(&ledger);
        let outcome_b = session.finish_save(done_b);
        let outcome_a = session.finish_save(pending_a.execute(&ledger));

        assert!(outcome_a.is_saved());
        assert!(outcome_b.is_saved());
        assert_eq!(session.row(a).unwrap().state(), RowState::Saved);
        assert!(!session.is_draft(a));
        assert!(!session.is_draft(b));
        assert_eq!(ledger.list(&ExpenseFilter::new()).unwrap().len(), 2);

        // A saved row saves again as an update
        session.edit_row(a, |i| i.notes = "segunda".into()).unwrap();
        let pending = session.begin_save(a).unwrap();
        assert_eq!(pending.mode(), SaveMode::Update);
        assert!(session.finish_save(pending.execute(&ledger)).is_saved());
    }

    #[test]
    fn test_result_for_deleted_row_is_discarded() {
        let (_temp_dir, ledger) = talent_ledger();
        let (order_id, item_id) = links();
        let mut session = FormSession::open_new(ExpenseCategory::Talent, order_id, item_id);
        let key = session.rows()[0].key();
        session.edit_row(key, fill("Fugaz", 3)).unwrap();

        let pending = session.begin_save(key).unwrap();
        session.delete_row(key, &ledger).unwrap();
        let outcome = session.finish_save(pending.execute(&ledger));

        assert!(matches!(outcome, RowSaveOutcome::Discarded));
        assert_eq!(session.len(), 1);
        assert!(session.is_draft(session.rows()[0].key()));
    }

    #[test]
    fn test_save_row_failure_keeps_draft() {
        let (_temp_dir, repo) = talent_ledger();
        let ledger = FlakyLedger::new(repo, vec![0]);
        let (order_id, item_id) = links();
        let mut session = FormSession::open_new(ExpenseCategory::Talent, order_id, item_id);
        let key = session.rows()[0].key();
        session.edit_row(key, fill("Reintento", 9)).unwrap();
        let temp_id = session.row(key).unwrap().id();

        let outcome = session.save_row(key, &ledger).unwrap();
        assert!(matches!(outcome, RowSaveOutcome::Failed(ref e) if e.is_persistence()));
        assert_eq!(session.row(key).unwrap().state(), RowState::Editing);
        assert_eq!(session.row(key).unwrap().id(), temp_id);

        let outcome = session.save_row(key, &ledger).unwrap();
        assert!(outcome.is_saved());
        assert_ne!(session.row(key).unwrap().id(), temp_id);
    }

    #[test]
    fn test_delete_persisted_row_removes_from_ledger() {
        let (_temp_dir, ledger) = talent_ledger();
        let (order_id, item_id) = links();
        let mut session = FormSession::open_new(ExpenseCategory::Talent, order_id, item_id)
            .with_creator(Some("operador".into()));
        let key = session.rows()[0].key();
        session.edit_row(key, fill("Borrable", 4)).unwrap();
        session.save_all(&ledger).unwrap();
        let id = session.row(key).unwrap().id();
        assert_eq!(
            ledger.get(id).unwrap().unwrap().created_by.as_deref(),
            Some("operador")
        );

        assert!(session.delete_row(key, &ledger).unwrap());
        assert!(ledger.get(id).unwrap().is_none());
        assert!(!session.is_persisted(id));
        assert_eq!(session.len(), 1);
    }
}
