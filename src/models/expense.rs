//! Expense model
//!
//! An expense is a cost recorded in one category ledger, optionally linked to
//! an order and (for budgeted categories) to the line item that funds it.
//! Fields shared by every category live on [`Expense`]; the per-category
//! differences live in the [`ExpenseDetail`] variant.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::category::ExpenseCategory;
use super::ids::{ExpenseId, ItemId, OrderId};
use super::money::{lenient, Money};
use super::status::{ApprovalStatus, InvalidTransition, Lifecycle, PaymentStatus, Transition};

/// How the counterpart is paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "transferencia")]
    Transfer,
    #[serde(rename = "cheque")]
    Check,
    #[serde(rename = "efectivo")]
    Cash,
}

impl PaymentMethod {
    /// Checks are paid at a term; the other methods are immediate
    pub fn requires_term(&self) -> bool {
        matches!(self, Self::Check)
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "transferencia" | "transfer" => Some(Self::Transfer),
            "cheque" | "check" => Some(Self::Check),
            "efectivo" | "cash" => Some(Self::Cash),
            _ => None,
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transfer => write!(f, "transferencia"),
            Self::Check => write!(f, "cheque"),
            Self::Cash => write!(f, "efectivo"),
        }
    }
}

/// Category-specific part of an expense
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "lowercase")]
pub enum ExpenseDetail {
    Implementation {
        #[serde(default)]
        sector: String,
    },
    Talent {
        #[serde(default)]
        talent: String,
        /// País
        #[serde(default)]
        country: String,
    },
    Technical {
        #[serde(default)]
        service: String,
    },
    Direct {
        #[serde(default)]
        area: String,
        #[serde(default)]
        concept: String,
    },
}

impl ExpenseDetail {
    /// Blank detail for a category
    pub fn empty(category: ExpenseCategory) -> Self {
        match category {
            ExpenseCategory::Implementation => Self::Implementation {
                sector: String::new(),
            },
            ExpenseCategory::Talent => Self::Talent {
                talent: String::new(),
                country: String::new(),
            },
            ExpenseCategory::Technical => Self::Technical {
                service: String::new(),
            },
            ExpenseCategory::Direct => Self::Direct {
                area: String::new(),
                concept: String::new(),
            },
        }
    }

    pub fn category(&self) -> ExpenseCategory {
        match self {
            Self::Implementation { .. } => ExpenseCategory::Implementation,
            Self::Talent { .. } => ExpenseCategory::Talent,
            Self::Technical { .. } => ExpenseCategory::Technical,
            Self::Direct { .. } => ExpenseCategory::Direct,
        }
    }

    /// Short description used in listings
    pub fn summary(&self) -> String {
        match self {
            Self::Implementation { sector } => sector.clone(),
            Self::Talent { talent, country } if country.is_empty() => talent.clone(),
            Self::Talent { talent, country } => format!("{} ({})", talent, country),
            Self::Technical { service } => service.clone(),
            Self::Direct { area, concept } if concept.is_empty() => area.clone(),
            Self::Direct { area, concept } => format!("{}: {}", area, concept),
        }
    }

    fn check_required(&self, errors: &mut ValidationErrors) {
        let (field, value, label) = match self {
            Self::Implementation { sector } => ("sector", sector, "Sector"),
            Self::Talent { talent, .. } => ("talent", talent, "Talent"),
            Self::Technical { service } => ("service", service, "Service"),
            Self::Direct { area, .. } => ("area", area, "Area"),
        };
        if value.trim().is_empty() {
            errors.push(FieldError::new(field, format!("{} is required", label)));
        }
    }
}

/// One offending field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// 1-based row position when the error comes from a multi-row form
    pub row: Option<usize>,
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            row: None,
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.row {
            Some(row) => write!(f, "Row {}: {}", row, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Every violation found, collected rather than stopping at the first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: FieldError) {
        self.errors.push(error);
    }

    /// Append another set, tagging each entry with a row position
    pub fn extend_for_row(&mut self, row: usize, other: ValidationErrors) {
        self.errors.extend(other.errors.into_iter().map(|mut e| {
            e.row = Some(row);
            e
        }));
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// `Ok(())` when nothing was collected
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.errors.iter().map(|e| e.to_string()).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Fields submitted when creating an expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseInput {
    pub order_id: Option<OrderId>,
    pub item_id: Option<ItemId>,
    pub provider: String,
    pub business_name: String,
    pub payment_method: Option<PaymentMethod>,
    pub payment_term_days: Option<u32>,
    #[serde(default)]
    pub invoice_number: String,
    pub invoice_date: Option<NaiveDate>,
    #[serde(default)]
    pub invoice_issued_to: String,
    pub net: Option<Money>,
    #[serde(default)]
    pub notes: String,
    pub detail: ExpenseDetail,
    pub created_by: Option<String>,
}

impl ExpenseInput {
    /// Blank input for a category and optional links
    pub fn new(category: ExpenseCategory, order_id: Option<OrderId>, item_id: Option<ItemId>) -> Self {
        Self {
            order_id,
            item_id,
            provider: String::new(),
            business_name: String::new(),
            payment_method: None,
            payment_term_days: None,
            invoice_number: String::new(),
            invoice_date: None,
            invoice_issued_to: String::new(),
            net: None,
            notes: String::new(),
            detail: ExpenseDetail::empty(category),
            created_by: None,
        }
    }

    pub fn category(&self) -> ExpenseCategory {
        self.detail.category()
    }

    /// Check the required-field set, collecting every violation
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.category().is_budgeted() && self.item_id.is_none() {
            errors.push(FieldError::new(
                "item",
                format!("{} expenses must reference an order item", self.category()),
            ));
        }
        if self.provider.trim().is_empty() {
            errors.push(FieldError::new("provider", "Provider is required"));
        }
        if self.business_name.trim().is_empty() {
            errors.push(FieldError::new("business_name", "Business name is required"));
        }
        match self.payment_method {
            None => errors.push(FieldError::new("payment_method", "Payment method is required")),
            Some(method) if method.requires_term() && self.payment_term_days.is_none() => {
                errors.push(FieldError::new(
                    "payment_term_days",
                    "Payment term (days) is required when paying by cheque",
                ))
            }
            Some(_) => {}
        }
        if self.net.is_none() {
            errors.push(FieldError::new("net", "Net amount is required"));
        }
        self.detail.check_required(&mut errors);

        errors.into_result()
    }
}

/// A persisted expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,

    pub order_id: Option<OrderId>,

    /// Set once at creation; never re-parented
    pub item_id: Option<ItemId>,

    #[serde(default)]
    pub provider: String,

    #[serde(default)]
    pub business_name: String,

    pub payment_method: Option<PaymentMethod>,

    pub payment_term_days: Option<u32>,

    #[serde(default)]
    pub invoice_number: String,

    pub invoice_date: Option<NaiveDate>,

    #[serde(default)]
    pub invoice_issued_to: String,

    /// Neto
    #[serde(default, deserialize_with = "lenient::deserialize")]
    pub net: Money,

    #[serde(default)]
    pub notes: String,

    pub detail: ExpenseDetail,

    #[serde(default)]
    pub approval: ApprovalStatus,

    #[serde(default)]
    pub payment: PaymentStatus,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    pub created_by: Option<String>,
}

impl Expense {
    /// Build a new pending expense with a fresh identifier
    pub fn from_input(input: ExpenseInput) -> Self {
        let now = Utc::now();
        Self {
            id: ExpenseId::new(),
            order_id: input.order_id,
            item_id: input.item_id,
            provider: input.provider,
            business_name: input.business_name,
            payment_method: input.payment_method,
            payment_term_days: input.payment_term_days,
            invoice_number: input.invoice_number,
            invoice_date: input.invoice_date,
            invoice_issued_to: input.invoice_issued_to,
            net: input.net.unwrap_or_default(),
            notes: input.notes,
            detail: input.detail,
            approval: ApprovalStatus::Pending,
            payment: PaymentStatus::Pending,
            created_at: now,
            updated_at: now,
            created_by: input.created_by,
        }
    }

    pub fn category(&self) -> ExpenseCategory {
        self.detail.category()
    }

    pub fn lifecycle(&self) -> Lifecycle {
        Lifecycle::new(self.approval, self.payment)
    }

    /// The editable fields as input again (links and creator included)
    pub fn to_input(&self) -> ExpenseInput {
        ExpenseInput {
            order_id: self.order_id,
            item_id: self.item_id,
            provider: self.provider.clone(),
            business_name: self.business_name.clone(),
            payment_method: self.payment_method,
            payment_term_days: self.payment_term_days,
            invoice_number: self.invoice_number.clone(),
            invoice_date: self.invoice_date,
            invoice_issued_to: self.invoice_issued_to.clone(),
            net: Some(self.net),
            notes: self.notes.clone(),
            detail: self.detail.clone(),
            created_by: self.created_by.clone(),
        }
    }

    /// Apply the supplied fields of a patch; links and id are never touched
    ///
    /// A refused transition leaves the record unchanged.
    pub fn apply_patch(&mut self, patch: &ExpensePatch) -> Result<(), InvalidTransition> {
        let next = match patch.transition {
            Some(transition) => Some(self.lifecycle().apply(transition)?),
            None => None,
        };

        if let Some(provider) = &patch.provider {
            self.provider = provider.clone();
        }
        if let Some(business_name) = &patch.business_name {
            self.business_name = business_name.clone();
        }
        if let Some(method) = patch.payment_method {
            self.payment_method = Some(method);
        }
        if let Some(days) = patch.payment_term_days {
            self.payment_term_days = days;
        }
        if let Some(invoice_number) = &patch.invoice_number {
            self.invoice_number = invoice_number.clone();
        }
        if let Some(invoice_date) = patch.invoice_date {
            self.invoice_date = invoice_date;
        }
        if let Some(issued_to) = &patch.invoice_issued_to {
            self.invoice_issued_to = issued_to.clone();
        }
        if let Some(net) = patch.net {
            self.net = net;
        }
        if let Some(notes) = &patch.notes {
            self.notes = notes.clone();
        }
        if let Some(detail) = &patch.detail {
            self.detail = detail.clone();
        }
        if let Some(next) = next {
            self.approval = next.approval;
            self.payment = next.payment;
        }
        self.updated_at = Utc::now();
        Ok(())
    }
}

impl fmt::Display for Expense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.id, self.provider, self.net)
    }
}

/// A partial update; only `Some` fields change
///
/// `payment_term_days` and `invoice_date` are doubly optional so a patch can
/// clear them: `Some(None)` clears, `None` leaves as is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpensePatch {
    pub id: Option<ExpenseId>,
    pub provider: Option<String>,
    pub business_name: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub payment_term_days: Option<Option<u32>>,
    pub invoice_number: Option<String>,
    pub invoice_date: Option<Option<NaiveDate>>,
    pub invoice_issued_to: Option<String>,
    pub net: Option<Money>,
    pub notes: Option<String>,
    pub detail: Option<ExpenseDetail>,
    /// Status moves only one step along the lifecycle, never by assignment
    pub transition: Option<Transition>,
}

impl ExpensePatch {
    pub fn new(id: ExpenseId) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    /// Status-only write used by lifecycle transitions
    pub fn transition(id: ExpenseId, transition: Transition) -> Self {
        Self {
            id: Some(id),
            transition: Some(transition),
            ..Self::default()
        }
    }

    /// Replace every editable field with the values of `input`
    pub fn from_input(id: ExpenseId, input: &ExpenseInput) -> Self {
        Self {
            id: Some(id),
            provider: Some(input.provider.clone()),
            business_name: Some(input.business_name.clone()),
            payment_method: input.payment_method,
            payment_term_days: Some(input.payment_term_days),
            invoice_number: Some(input.invoice_number.clone()),
            invoice_date: Some(input.invoice_date),
            invoice_issued_to: Some(input.invoice_issued_to.clone()),
            net: input.net,
            notes: Some(input.notes.clone()),
            detail: Some(input.detail.clone()),
            transition: None,
        }
    }

    pub fn net(mut self, net: Money) -> Self {
        self.net = Some(net);
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Whether anything besides the status axes is being changed
    pub fn has_field_changes(&self) -> bool {
        self.provider.is_some()
            || self.business_name.is_some()
            || self.payment_method.is_some()
            || self.payment_term_days.is_some()
            || self.invoice_number.is_some()
            || self.invoice_date.is_some()
            || self.invoice_issued_to.is_some()
            || self.net.is_some()
            || self.notes.is_some()
            || self.detail.is_some()
    }

    pub fn has_status_changes(&self) -> bool {
        self.transition.is_some()
    }
}
