//! Strongly-typed identifiers for orders, line items and expenses
//!
//! Each entity gets its own UUID newtype so an item id can never be passed
//! where an expense id is expected. Display uses a short prefixed form
//! (`gto-1a2b3c4d`) that [`FromStr`] also accepts back when it is complete.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! define_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a fresh random identifier
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Short display prefix used by this id type
            pub const fn prefix() -> &'static str {
                $prefix
            }

            /// Whether `text` names this id, either in full or by its short form
            pub fn matches(&self, text: &str) -> bool {
                let text = text.trim();
                if let Ok(uuid) = Uuid::parse_str(text) {
                    return uuid == self.0;
                }
                let short = text.strip_prefix($prefix).unwrap_or(text);
                short.len() >= 8 && self.0.simple().to_string().starts_with(&short.to_lowercase())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $prefix, &self.0.simple().to_string()[..8])
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                let s = s.strip_prefix($prefix).unwrap_or(s);
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

define_id!(OrderId, "ord-");
define_id!(ItemId, "itm-");
define_id!(ExpenseId, "gto-");
