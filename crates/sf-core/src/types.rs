use std::fmt;

use serde::{Deserialize, Serialize};

/// Amount debited from the customer's bank on every confirmed purchase.
pub const UNIT_PRICE: i64 = 10;

// ---------------------------------------------------------------------------
// Page
// ---------------------------------------------------------------------------

/// Which phase of the purchase flow the shared session is in.
///
/// Encoded on the wire as the integer `0` (browsing) or `1` (checkout); any
/// other integer is rejected when decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Page {
    /// Cart page. Initial state.
    #[default]
    Browsing,
    /// Payment page.
    Checkout,
}

impl Page {
    pub fn as_u8(self) -> u8 {
        match self {
            Page::Browsing => 0,
            Page::Checkout => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Page::Browsing => "browsing",
            Page::Checkout => "checkout",
        }
    }
}

impl From<Page> for u8 {
    fn from(page: Page) -> Self {
        page.as_u8()
    }
}

impl TryFrom<u8> for Page {
    type Error = String;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(Page::Browsing),
            1 => Ok(Page::Checkout),
            other => Err(format!("invalid page {other}: expected 0 or 1")),
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Operation
// ---------------------------------------------------------------------------

/// Mutating storefront operations, named for error reporting and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    IncrementPage,
    DecrementPage,
    AddToCart,
    ConfirmPayment,
}

impl Operation {
    /// Endpoint-style name (`"addToCart"`), matching the HTTP route.
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::IncrementPage => "incrementPage",
            Operation::DecrementPage => "decrementPage",
            Operation::AddToCart => "addToCart",
            Operation::ConfirmPayment => "confirmPayment",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Seed
// ---------------------------------------------------------------------------

/// Counter values the storefront starts from on every process start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seed {
    pub website_inventory: u32,
    pub warehouse_inventory: i64,
    pub customer_bank: i64,
}

impl Default for Seed {
    fn default() -> Self {
        Self {
            website_inventory: 100,
            warehouse_inventory: 100,
            customer_bank: 1000,
        }
    }
}

// ---------------------------------------------------------------------------
// Read models
// ---------------------------------------------------------------------------

/// The three counters, as returned by `/data`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventorySnapshot {
    pub website_inventory: u32,
    pub warehouse_inventory: i64,
    pub customer_bank: i64,
}

/// Counters touched by a settled payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentTotals {
    pub warehouse_inventory: i64,
    pub customer_bank: i64,
}

impl PaymentTotals {
    /// `true` when either counter has been driven below zero.
    pub fn is_negative(&self) -> bool {
        self.warehouse_inventory < 0 || self.customer_bank < 0
    }
}

/// Everything the storefront knows, in one value. Published on the event
/// stream after each mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorefrontView {
    pub page: Page,
    pub website_inventory: u32,
    pub warehouse_inventory: i64,
    pub customer_bank: i64,
    pub crashed: bool,
    /// `true` while checkout holds an item that has not been paid for.
    pub item_reserved: bool,
}

// ---------------------------------------------------------------------------
// Purchase confirmation
// ---------------------------------------------------------------------------

/// What the purchase-confirmation collaborator decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurchaseOutcome {
    Confirmed { confirmation_id: String },
    Declined { reason: String },
    TimedOut,
}

impl PurchaseOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, PurchaseOutcome::Confirmed { .. })
    }
}

/// Result of a settled payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentReceipt {
    pub confirmation_id: String,
    pub totals: PaymentTotals,
}
