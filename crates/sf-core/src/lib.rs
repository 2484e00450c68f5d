//! sf-core
//!
//! Storefront state machine: website stock, warehouse stock, the customer's
//! bank balance, the browsing/checkout cursor and the cosmetic crash flag.
//!
//! Architectural decisions:
//! - `Page` is a two-value enum, so the cursor cannot drift past checkout
//! - Every mutating operation checks its page precondition server-side
//! - Payment is two-phase: validate, call the collaborator, then settle
//! - Warehouse stock and bank balance have no floor
//!
//! Pure deterministic logic. No IO, no clock, no randomness. The daemon owns
//! the lock and the purchase-confirmation call.

mod engine;
mod error;
mod types;

pub use engine::Storefront;
pub use error::{StorefrontError, TransitionError};
pub use types::*;
