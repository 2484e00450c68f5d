//! Typed access to the storefront daemon's endpoints.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use sf_core::{InventorySnapshot, Page};
use sf_schemas::{
    AddToCartResponse, CrashResponse, DataResponse, OkResponse, PageResponse, PaymentResponse,
    CODE_CONFIRMER_UNAVAILABLE, CODE_INSUFFICIENT_STOCK, CODE_INVALID_TRANSITION,
    CODE_PAYMENT_DECLINED, CODE_PAYMENT_TIMEOUT,
};
use tracing::debug;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Could not reach the daemon or read its reply.
    Transport(String),
    /// Daemon answered with a non-2xx status.
    Status {
        status: u16,
        code: String,
        message: String,
    },
    /// 2xx reply that did not match the expected body.
    Decode(String),
}

impl ClientError {
    fn code(&self) -> Option<&str> {
        match self {
            ClientError::Status { code, .. } => Some(code.as_str()),
            _ => None,
        }
    }

    pub fn is_out_of_stock(&self) -> bool {
        self.code() == Some(CODE_INSUFFICIENT_STOCK)
    }

    pub fn is_invalid_transition(&self) -> bool {
        self.code() == Some(CODE_INVALID_TRANSITION)
    }

    /// The collaborator declined, stalled or failed; nothing was charged.
    pub fn is_payment_failure(&self) -> bool {
        matches!(
            self.code(),
            Some(CODE_PAYMENT_DECLINED | CODE_PAYMENT_TIMEOUT | CODE_CONFIRMER_UNAVAILABLE)
        )
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Transport(msg) => write!(f, "transport error: {msg}"),
            ClientError::Status {
                status,
                code,
                message,
            } => write!(f, "daemon returned {status} {code}: {message}"),
            ClientError::Decode(msg) => write!(f, "decode error: {msg}"),
        }
    }
}

impl std::error::Error for ClientError {}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// One method per storefront endpoint.
#[async_trait]
pub trait StorefrontApi: Send + Sync {
    async fn page(&self) -> Result<Page, ClientError>;
    async fn data(&self) -> Result<InventorySnapshot, ClientError>;
    async fn increment_page(&self) -> Result<Page, ClientError>;
    async fn decrement_page(&self) -> Result<Page, ClientError>;
    /// Returns the website inventory left after the reservation.
    async fn add_to_cart(&self) -> Result<u32, ClientError>;
    async fn confirm_payment(&self) -> Result<PaymentResponse, ClientError>;
    async fn toggle_crash(&self) -> Result<bool, ClientError>;
    async fn create_crash_table(&self) -> Result<(), ClientError>;
    async fn create_inventory_table(&self) -> Result<(), ClientError>;
    async fn create_bank_table(&self) -> Result<(), ClientError>;
}

// ---------------------------------------------------------------------------
// HTTP implementation
// ---------------------------------------------------------------------------

/// Error body shape shared by every refusal the daemon sends.
#[derive(Debug, Deserialize)]
struct RefusalBody {
    #[serde(default)]
    error: String,
    #[serde(default)]
    code: String,
}

#[derive(Debug, Clone)]
pub struct HttpStorefrontApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpStorefrontApi {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "POST");

        let resp = self
            .http
            .post(&url)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        let status = resp.status();
        let body = resp
            .bytes()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        if !status.is_success() {
            let refusal: RefusalBody = serde_json::from_slice(&body).unwrap_or(RefusalBody {
                error: String::from_utf8_lossy(&body).into_owned(),
                code: String::new(),
            });
            return Err(ClientError::Status {
                status: status.as_u16(),
                code: refusal.code,
                message: refusal.error,
            });
        }

        serde_json::from_slice(&body).map_err(|e| ClientError::Decode(format!("{path}: {e}")))
    }
}

#[async_trait]
impl StorefrontApi for HttpStorefrontApi {
    async fn page(&self) -> Result<Page, ClientError> {
        Ok(self.post::<PageResponse>("/page").await?.result)
    }

    async fn data(&self) -> Result<InventorySnapshot, ClientError> {
        Ok(self.post::<DataResponse>("/data").await?.result)
    }

    async fn increment_page(&self) -> Result<Page, ClientError> {
        Ok(self.post::<PageResponse>("/incrementPage").await?.result)
    }

    async fn decrement_page(&self) -> Result<Page, ClientError> {
        Ok(self.post::<PageResponse>("/decrementPage").await?.result)
    }

    async fn add_to_cart(&self) -> Result<u32, ClientError> {
        Ok(self.post::<AddToCartResponse>("/addToCart").await?.result)
    }

    async fn confirm_payment(&self) -> Result<PaymentResponse, ClientError> {
        self.post("/confirmPayment").await
    }

    async fn toggle_crash(&self) -> Result<bool, ClientError> {
        Ok(self.post::<CrashResponse>("/toggleCrash").await?.crashed)
    }

    async fn create_crash_table(&self) -> Result<(), ClientError> {
        self.post::<OkResponse>("/createCrashTable").await.map(|_| ())
    }

    async fn create_inventory_table(&self) -> Result<(), ClientError> {
        self.post::<OkResponse>("/createInventoryTable")
            .await
            .map(|_| ())
    }

    async fn create_bank_table(&self) -> Result<(), ClientError> {
        self.post::<OkResponse>("/createBankTable").await.map(|_| ())
    }
}
