//! Expense lifecycle
//!
//! Two orthogonal axes are tracked per expense: approval and payment. The
//! payment axis only opens once the expense is approved. Transitions only
//! move forward; closed and annulled are terminal.
//!
//! ```text
//! approval: pending --approve--> active --close--> closed
//!              |                   |
//!              +------reject-------+--> annulled
//! payment:  pending --approve--> pending_payment --mark_paid--> paid
//!                                        +--------reject------> annulled
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Approval state of an expense
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    #[default]
    Pending,
    Active,
    Closed,
    Annulled,
}

impl ApprovalStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed | Self::Annulled)
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" | "pendiente" => Some(Self::Pending),
            "active" | "activo" => Some(Self::Active),
            "closed" | "cerrado" => Some(Self::Closed),
            "annulled" | "anulado" => Some(Self::Annulled),
            _ => None,
        }
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Active => write!(f, "Active"),
            Self::Closed => write!(f, "Closed"),
            Self::Annulled => write!(f, "Annulled"),
        }
    }
}

/// Payment state of an expense
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Not yet payable (expense awaiting approval)
    #[default]
    Pending,
    PendingPayment,
    Paid,
    Annulled,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::PendingPayment => write!(f, "Pending payment"),
            Self::Paid => write!(f, "Paid"),
            Self::Annulled => write!(f, "Annulled"),
        }
    }
}

/// A lifecycle action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    Approve,
    Reject,
    MarkPaid,
    Close,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Approve => write!(f, "approve"),
            Self::Reject => write!(f, "reject"),
            Self::MarkPaid => write!(f, "mark paid"),
            Self::Close => write!(f, "close"),
        }
    }
}

/// Combined state of both axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Lifecycle {
    pub approval: ApprovalStatus,
    pub payment: PaymentStatus,
}

impl Lifecycle {
    pub fn new(approval: ApprovalStatus, payment: PaymentStatus) -> Self {
        Self { approval, payment }
    }

    /// Closed or annulled: no mutation of any kind
    pub fn is_terminal(&self) -> bool {
        self.approval.is_terminal()
    }

    /// Paid or terminal: field edits are refused
    pub fn is_locked_for_edits(&self) -> bool {
        self.is_terminal() || self.payment == PaymentStatus::Paid
    }

    /// Compute the state after `transition`, or refuse it
    pub fn apply(self, transition: Transition) -> Result<Lifecycle, InvalidTransition> {
        use ApprovalStatus as A;
        use PaymentStatus as P;

        let next = match (transition, self.approval, self.payment) {
            (Transition::Approve, A::Pending, P::Pending) => {
                Some(Lifecycle::new(A::Active, P::PendingPayment))
            }
            (Transition::Reject, A::Pending, P::Pending)
            | (Transition::Reject, A::Active, P::PendingPayment) => {
                Some(Lifecycle::new(A::Annulled, P::Annulled))
            }
            (Transition::MarkPaid, A::Active, P::PendingPayment) => {
                Some(Lifecycle::new(A::Active, P::Paid))
            }
            (Transition::Close, A::Active, P::Paid) => Some(Lifecycle::new(A::Closed, P::Paid)),
            _ => None,
        };

        next.ok_or(InvalidTransition {
            transition,
            from: self,
        })
    }

    /// Whether `transition` would be accepted
    pub fn allows(&self, transition: Transition) -> bool {
        self.apply(transition).is_ok()
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.approval, self.payment)
    }
}

/// A refused lifecycle action; no write happens when this is returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidTransition {
    pub transition: Transition,
    pub from: Lifecycle,
}

impl fmt::Display for InvalidTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot {} an expense that is {}", self.transition, self.from)
    }
}

impl std::error::Error for InvalidTransition {}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_TRANSITIONS: [Transition; 4] = [
        Transition::Approve,
        Transition::Reject,
        Transition::MarkPaid,
        Transition::Close,
    ];

    #[test]
    fn test_happy_path() {
        let state = Lifecycle::default();
        let approved = state.apply(Transition::Approve).unwrap();
        assert_eq!(
            approved,
            Lifecycle::new(ApprovalStatus::Active, PaymentStatus::PendingPayment)
        );
        let paid = approved.apply(Transition::MarkPaid).unwrap();
        assert_eq!(paid.payment, PaymentStatus::Paid);
        assert!(paid.is_locked_for_edits());
        assert!(!paid.is_terminal());
        let closed = paid.apply(Transition::Close).unwrap();
        assert_eq!(closed.approval, ApprovalStatus::Closed);
        assert!(closed.is_terminal());
    }

    #[test]
    fn test_reject_from_pending_and_active() {
        let rejected = Lifecycle::default().apply(Transition::Reject).unwrap();
        assert_eq!(rejected.approval, ApprovalStatus::Annulled);
        assert_eq!(rejected.payment, PaymentStatus::Annulled);

        let active = Lifecycle::new(ApprovalStatus::Active, PaymentStatus::PendingPayment);
        assert_eq!(
            active.apply(Transition::Reject).unwrap().approval,
            ApprovalStatus::Annulled
        );
    }

    #[test]
    fn test_mark_paid_requires_active() {
        for approval in [
            ApprovalStatus::Pending,
            ApprovalStatus::Closed,
            ApprovalStatus::Annulled,
        ] {
            let state = Lifecycle::new(approval, PaymentStatus::PendingPayment);
            let err = state.apply(Transition::MarkPaid).unwrap_err();
            assert_eq!(err.transition, Transition::MarkPaid);
            assert_eq!(err.from, state);
        }
    }

    #[test]
    fn test_cannot_approve_twice_or_unpay() {
        let active = Lifecycle::new(ApprovalStatus::Active, PaymentStatus::PendingPayment);
        assert!(!active.allows(Transition::Approve));

        let paid = Lifecycle::new(ApprovalStatus::Active, PaymentStatus::Paid);
        assert!(!paid.allows(Transition::Reject));
        assert!(!paid.allows(Transition::MarkPaid));
    }

    #[test]
    fn test_terminal_states_refuse_every_transition() {
        let terminals = [
            Lifecycle::new(ApprovalStatus::Closed, PaymentStatus::Paid),
            Lifecycle::new(ApprovalStatus::Annulled, PaymentStatus::Annulled),
            Lifecycle::new(ApprovalStatus::Annulled, PaymentStatus::Pending),
        ];
        for state in terminals {
            for transition in ALL_TRANSITIONS {
                assert!(state.apply(transition).is_err(), "{} from {}", transition, state);
            }
        }
    }

    #[test]
    fn test_no_sequence_leaves_a_terminal_state() {
        // Walk every reachable state; terminal ones must be sinks.
        let mut frontier = vec![Lifecycle::default()];
        let mut seen = Vec::new();
        while let Some(state) = frontier.pop() {
            if seen.contains(&state) {
                continue;
            }
            seen.push(state);
            for transition in ALL_TRANSITIONS {
                if let Ok(next) = state.apply(transition) {
                    assert!(!state.is_terminal());
                    frontier.push(next);
                }
            }
        }
        assert!(seen.iter().any(|s| s.approval == ApprovalStatus::Closed));
        assert!(seen.iter().any(|s| s.approval == ApprovalStatus::Annulled));
    }

    #[test]
    fn test_error_message() {
        let err = Lifecycle::default().apply(Transition::MarkPaid).unwrap_err();
        assert_eq!(err.to_string(), "cannot mark paid an expense that is Pending / Pending");
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&PaymentStatus::PendingPayment).unwrap(),
            "\"pending_payment\""
        );
        assert_eq!(ApprovalStatus::parse("anulado"), Some(ApprovalStatus::Annulled));
    }
}
