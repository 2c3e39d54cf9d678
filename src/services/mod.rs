//! Service layer
//!
//! Business logic on top of the storage layer: catalog lookups, budget
//! reconciliation and the expense lifecycle.

pub mod catalog;
pub mod lifecycle;
pub mod reconciliation;

pub use catalog::CatalogService;
pub use lifecycle::LifecycleService;
pub use reconciliation::{BudgetSnapshot, CategoryReport, ItemReport, OrderReport, ReconciliationService};
