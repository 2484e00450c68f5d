//! JSON bodies exchanged between the storefront daemon and its clients.
//!
//! Every data-bearing response nests its payload under `result`. Error
//! responses carry a stable `code` next to the human message. No business
//! logic lives here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sf_core::{Page, PaymentTotals};

pub use sf_core::{InventorySnapshot, StorefrontView};

pub const CODE_INSUFFICIENT_STOCK: &str = "INSUFFICIENT_STOCK";
pub const CODE_INVALID_TRANSITION: &str = "INVALID_TRANSITION";
pub const CODE_PAYMENT_DECLINED: &str = "PAYMENT_DECLINED";
pub const CODE_PAYMENT_TIMEOUT: &str = "PAYMENT_TIMEOUT";
pub const CODE_CONFIRMER_UNAVAILABLE: &str = "CONFIRMER_UNAVAILABLE";
pub const CODE_COUNTER_OVERFLOW: &str = "COUNTER_OVERFLOW";

// ---------------------------------------------------------------------------
// Success envelopes
// ---------------------------------------------------------------------------

/// `{ "result": T }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultEnvelope<T> {
    pub result: T,
}

impl<T> ResultEnvelope<T> {
    pub fn new(result: T) -> Self {
        Self { result }
    }
}

/// `/page`, `/incrementPage`, `/decrementPage`.
pub type PageResponse = ResultEnvelope<Page>;

/// `/data`.
pub type DataResponse = ResultEnvelope<InventorySnapshot>;

/// Successful `/addToCart`: the website inventory after the decrement.
pub type AddToCartResponse = ResultEnvelope<u32>;

/// Collaborator reference for a settled payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Confirmation {
    pub id: String,
    pub confirmed_at: DateTime<Utc>,
}

/// Successful `/confirmPayment`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentResponse {
    pub result: PaymentTotals,
    pub confirmation: Confirmation,
}

/// `/toggleCrash`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrashResponse {
    pub crashed: bool,
}

/// Table-provisioning placeholders: `{ "ok": "ok" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OkResponse {
    pub ok: String,
}

impl Default for OkResponse {
    fn default() -> Self {
        Self {
            ok: "ok".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub ok: bool,
    pub service: String,
    pub version: String,
    pub config_hash: String,
}

// ---------------------------------------------------------------------------
// Error bodies
// ---------------------------------------------------------------------------

/// Body of every non-2xx response except a stock refusal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: String,
    /// Current page, included when the refusal was a page-precondition failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<Page>,
}

/// 400 body from `/addToCart` on an empty shelf. Keeps `result` so clients
/// read the unchanged inventory from the same field as on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockRefusedBody {
    pub result: u32,
    pub error: String,
    pub code: String,
}
