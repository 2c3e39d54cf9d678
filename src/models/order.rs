//! Advertising orders and their line items
//!
//! An order (orden de publicidad) carries one or more line items. Each item
//! pre-allocates budget to the implementation, talent and technical
//! categories. The amounts are kept exactly as they were typed, locale
//! separators included, and parsed when read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::category::ExpenseCategory;
use super::ids::{ItemId, OrderId};
use super::money::{Money, MoneyParseError, NumberFormat};

/// Approval state of the order itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Approved => write!(f, "Approved"),
            Self::Rejected => write!(f, "Rejected"),
        }
    }
}

/// A program/slot within an order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineItem {
    pub id: ItemId,

    #[serde(default)]
    pub program: String,

    #[serde(default)]
    pub implementation_budget: String,

    #[serde(default)]
    pub talent_budget: String,

    #[serde(default)]
    pub technical_budget: String,

    #[serde(default)]
    pub sale_amount: String,

    #[serde(default)]
    pub credit_note_amount: String,

    #[serde(default)]
    pub fee_amount: String,

    #[serde(default)]
    pub fee_percentage: String,
}

impl OrderLineItem {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            id: ItemId::new(),
            program: program.into(),
            implementation_budget: String::new(),
            talent_budget: String::new(),
            technical_budget: String::new(),
            sale_amount: String::new(),
            credit_note_amount: String::new(),
            fee_amount: String::new(),
            fee_percentage: String::new(),
        }
    }

    /// Builder used by tests and imports
    pub fn with_budgets(
        mut self,
        implementation: impl Into<String>,
        talent: impl Into<String>,
        technical: impl Into<String>,
    ) -> Self {
        self.implementation_budget = implementation.into();
        self.talent_budget = talent.into();
        self.technical_budget = technical.into();
        self
    }

    /// Raw text of a category's allocation; direct expenses have none
    pub fn allocation_text(&self, category: ExpenseCategory) -> Option<&str> {
        match category {
            ExpenseCategory::Implementation => Some(&self.implementation_budget),
            ExpenseCategory::Talent => Some(&self.talent_budget),
            ExpenseCategory::Technical => Some(&self.technical_budget),
            ExpenseCategory::Direct => None,
        }
    }

    /// Parsed allocation for a category
    ///
    /// A blank field means nothing was allocated. Negative amounts break the
    /// catalog invariant and are reported as errors.
    pub fn allocation(
        &self,
        category: ExpenseCategory,
        format: &NumberFormat,
    ) -> Result<Money, AllocationError> {
        let text = match self.allocation_text(category) {
            Some(text) if !text.trim().is_empty() => text,
            _ => return Ok(Money::zero()),
        };

        let amount = Money::parse_localized(text, format).map_err(|source| {
            AllocationError::Unparsable {
                item: self.id,
                category,
                source,
            }
        })?;

        if amount.is_negative() {
            return Err(AllocationError::Negative {
                item: self.id,
                category,
                amount,
            });
        }
        Ok(amount)
    }

    pub fn sale(&self, format: &NumberFormat) -> Money {
        parse_or_zero(&self.sale_amount, format)
    }

    pub fn credit_note(&self, format: &NumberFormat) -> Money {
        parse_or_zero(&self.credit_note_amount, format)
    }

    pub fn fee(&self, format: &NumberFormat) -> Money {
        parse_or_zero(&self.fee_amount, format)
    }
}

fn parse_or_zero(text: &str, format: &NumberFormat) -> Money {
    Money::parse_localized(text, format).unwrap_or_default()
}

/// An advertising order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,

    /// Human-facing number, e.g. "OP-2025-0012"
    pub number: String,

    #[serde(default)]
    pub client: String,

    #[serde(default)]
    pub brand: String,

    #[serde(default)]
    pub campaign: String,

    #[serde(default)]
    pub status: OrderStatus,

    #[serde(default)]
    pub items: Vec<OrderLineItem>,

    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn new(number: impl Into<String>, client: impl Into<String>) -> Self {
        Self {
            id: OrderId::new(),
            number: number.into(),
            client: client.into(),
            brand: String::new(),
            campaign: String::new(),
            status: OrderStatus::Pending,
            items: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_item(mut self, item: OrderLineItem) -> Self {
        self.items.push(item);
        self
    }

    pub fn item(&self, item_id: ItemId) -> Option<&OrderLineItem> {
        self.items.iter().find(|i| i.id == item_id)
    }

    pub fn has_item(&self, item_id: ItemId) -> bool {
        self.item(item_id).is_some()
    }

    /// Sum of every item's allocation for a category
    pub fn allocation(
        &self,
        category: ExpenseCategory,
        format: &NumberFormat,
    ) -> Result<Money, AllocationError> {
        self.items
            .iter()
            .map(|item| item.allocation(category, format))
            .sum()
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.number, self.client)
    }
}

/// A line item's allocation could not be read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllocationError {
    Unparsable {
        item: ItemId,
        category: ExpenseCategory,
        source: MoneyParseError,
    },
    Negative {
        item: ItemId,
        category: ExpenseCategory,
        amount: Money,
    },
}

impl fmt::Display for AllocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unparsable {
                item,
                category,
                source,
            } => write!(f, "{} allocation of item {}: {}", category, item, source),
            Self::Negative {
                item,
                category,
                amount,
            } => write!(
                f,
                "{} allocation of item {} is negative ({})",
                category, item, amount
            ),
        }
    }
}

impl std::error::Error for AllocationError {}
