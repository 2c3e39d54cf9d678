//! Core data models
//!
//! Orders and line items (the allocation catalog), expenses and their
//! per-category detail, the two-axis lifecycle, and the money and id types
//! everything else is built on.

pub mod category;
pub mod expense;
pub mod ids;
pub mod money;
pub mod order;
pub mod status;

pub use category::ExpenseCategory;
pub use expense::{
    Expense, ExpenseDetail, ExpenseInput, ExpensePatch, FieldError, PaymentMethod,
    ValidationErrors,
};
pub use ids::{ExpenseId, ItemId, OrderId};
pub use money::{Money, MoneyParseError, NumberFormat};
pub use order::{AllocationError, Order, OrderLineItem, OrderStatus};
pub use status::{ApprovalStatus, InvalidTransition, Lifecycle, PaymentStatus, Transition};
