use std::fmt;

use crate::{Operation, Page};

// ---------------------------------------------------------------------------
// TransitionError
// ---------------------------------------------------------------------------

/// Returned when an operation is not legal in the current session state.
///
/// Nothing is mutated when this is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionError {
    /// Page the session was on when the operation arrived.
    pub from: Page,
    /// Whether checkout held an unpaid item at the time.
    pub reserved: bool,
    /// The refused operation.
    pub op: Operation,
}

impl fmt::Display for TransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "illegal storefront transition: {} while on {} (item_reserved={})",
            self.op, self.from, self.reserved
        )
    }
}

impl std::error::Error for TransitionError {}

// ---------------------------------------------------------------------------
// StorefrontError
// ---------------------------------------------------------------------------

/// Every way a storefront operation can be refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorefrontError {
    /// `addToCart` with no website stock left.
    InsufficientStock { website_inventory: u32 },
    /// Operation not allowed on the current page.
    InvalidTransition(TransitionError),
    /// The purchase-confirmation collaborator declined the purchase.
    PaymentDeclined { reason: String },
    /// The purchase-confirmation collaborator did not answer in time.
    PaymentTimedOut,
    /// Settling would take a counter outside `i64`.
    CounterOverflow { counter: &'static str },
}

impl StorefrontError {
    /// Stable machine-readable code carried in error responses.
    pub fn code(&self) -> &'static str {
        match self {
            StorefrontError::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            StorefrontError::InvalidTransition(_) => "INVALID_TRANSITION",
            StorefrontError::PaymentDeclined { .. } => "PAYMENT_DECLINED",
            StorefrontError::PaymentTimedOut => "PAYMENT_TIMEOUT",
            StorefrontError::CounterOverflow { .. } => "COUNTER_OVERFLOW",
        }
    }
}

impl fmt::Display for StorefrontError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorefrontError::InsufficientStock { website_inventory } => {
                write!(f, "insufficient stock: website_inventory={website_inventory}")
            }
            StorefrontError::InvalidTransition(e) => write!(f, "{e}"),
            StorefrontError::PaymentDeclined { reason } => {
                write!(f, "payment declined: {reason}")
            }
            StorefrontError::PaymentTimedOut => f.write_str("payment confirmation timed out"),
            StorefrontError::CounterOverflow { counter } => {
                write!(f, "counter overflow: {counter} cannot be decremented further")
            }
        }
    }
}

impl std::error::Error for StorefrontError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorefrontError::InvalidTransition(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TransitionError> for StorefrontError {
    fn from(e: TransitionError) -> Self {
        StorefrontError::InvalidTransition(e)
    }
}
