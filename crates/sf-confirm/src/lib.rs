//! Purchase-confirmation collaborator boundary.
//!
//! The storefront asks an external function whether a purchase goes through
//! before it moves any counter. This crate owns the trait, the request/reply
//! shapes and two implementations:
//!
//! - [`LocalConfirmer`]: in-process, confirms everything
//! - [`HttpConfirmer`]: POSTs to a remote confirmation endpoint
//!
//! There is no retry loop here. A failed or slow call is reported to the
//! caller once and the caller decides what to surface.

mod http;
mod local;

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use http::HttpConfirmer;
pub use local::LocalConfirmer;
pub use sf_core::PurchaseOutcome;

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// One confirmation request, sent as JSON by [`HttpConfirmer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    /// Remote function identifier (e.g. a lambda ARN).
    pub function_id: String,
    /// Unique per attempt so the remote side can deduplicate.
    pub request_id: Uuid,
    pub unit_price: i64,
}

impl PurchaseRequest {
    pub fn new(function_id: impl Into<String>) -> Self {
        Self {
            function_id: function_id.into(),
            request_id: Uuid::new_v4(),
            unit_price: sf_core::UNIT_PRICE,
        }
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// The collaborator could not produce a decision.
///
/// A decline or a timeout is a decision ([`PurchaseOutcome`]); these are not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmError {
    /// Network or transport failure.
    Transport(String),
    /// Non-2xx reply.
    Api { status: u16, message: String },
    /// Reply body was not the documented shape.
    Decode(String),
    /// Client could not be built from the given settings.
    Config(String),
}

impl fmt::Display for ConfirmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfirmError::Transport(msg) => write!(f, "transport error: {msg}"),
            ConfirmError::Api { status, message } => {
                write!(f, "confirmer api error status={status}: {message}")
            }
            ConfirmError::Decode(msg) => write!(f, "decode error: {msg}"),
            ConfirmError::Config(msg) => write!(f, "config error: {msg}"),
        }
    }
}

impl std::error::Error for ConfirmError {}

// ---------------------------------------------------------------------------
// Confirmer trait
// ---------------------------------------------------------------------------

/// External purchase-confirmation contract.
///
/// Object-safe so the daemon can hold an `Arc<dyn PurchaseConfirmer>` chosen
/// at boot from configuration.
#[async_trait::async_trait]
pub trait PurchaseConfirmer: Send + Sync {
    /// Short name for logs (`"local"`, `"http"`).
    fn name(&self) -> &'static str;

    async fn confirm(&self, request: &PurchaseRequest) -> Result<PurchaseOutcome, ConfirmError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct DecliningConfirmer;

    #[async_trait::async_trait]
    impl PurchaseConfirmer for DecliningConfirmer {
        fn name(&self) -> &'static str {
            "declining"
        }

        async fn confirm(&self, _req: &PurchaseRequest) -> Result<PurchaseOutcome, ConfirmError> {
            Ok(PurchaseOutcome::Declined {
                reason: "no".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn confirmer_is_object_safe() {
        let c: Box<dyn PurchaseConfirmer> = Box::new(DecliningConfirmer);
        let out = c.confirm(&PurchaseRequest::new("fn")).await.unwrap();
        assert!(!out.is_confirmed());
        assert_eq!(c.name(), "declining");
    }

    #[test]
    fn request_serializes_camel_case() {
        let req = PurchaseRequest::new("arn:fn");
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["functionId"], "arn:fn");
        assert_eq!(v["unitPrice"], 10);
        assert!(v["requestId"].is_string());
    }

    #[test]
    fn each_request_gets_a_fresh_id() {
        assert_ne!(
            PurchaseRequest::new("f").request_id,
            PurchaseRequest::new("f").request_id
        );
    }

    #[test]
    fn confirm_error_display_api() {
        let err = ConfirmError::Api {
            status: 503,
            message: "down".to_string(),
        };
        assert_eq!(err.to_string(), "confirmer api error status=503: down");
    }
}
