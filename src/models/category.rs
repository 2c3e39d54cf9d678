//! Expense categories
//!
//! Every ledger belongs to exactly one category. The first three draw on a
//! line item's budget allocation; direct (administrative) expenses have no
//! allocation and are only grouped by area.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseCategory {
    Implementation,
    Talent,
    Technical,
    Direct,
}

impl ExpenseCategory {
    pub fn all() -> [ExpenseCategory; 4] {
        [
            Self::Implementation,
            Self::Talent,
            Self::Technical,
            Self::Direct,
        ]
    }

    /// Categories funded by a line item allocation
    pub fn budgeted() -> [ExpenseCategory; 3] {
        [Self::Implementation, Self::Talent, Self::Technical]
    }

    /// Whether expenses in this category must reference a line item
    pub fn is_budgeted(&self) -> bool {
        !matches!(self, Self::Direct)
    }

    /// Stable name used for file names and serialized data
    pub fn key(&self) -> &'static str {
        match self {
            Self::Implementation => "implementation",
            Self::Talent => "talent",
            Self::Technical => "technical",
            Self::Direct => "direct",
        }
    }

    /// Parse a category name; Spanish names are accepted too
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "implementation" | "implementacion" | "implementación" | "impl" => {
                Some(Self::Implementation)
            }
            "talent" | "talents" | "talento" | "talentos" => Some(Self::Talent),
            "technical" | "tecnica" | "técnica" | "tech" => Some(Self::Technical),
            "direct" | "directo" | "directos" | "admin" => Some(Self::Direct),
            _ => None,
        }
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Implementation => write!(f, "Implementation"),
            Self::Talent => write!(f, "Talent"),
            Self::Technical => write!(f, "Technical"),
            Self::Direct => write!(f, "Direct"),
        }
    }
}
