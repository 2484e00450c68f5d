//! Shared runtime state for sf-daemon.
//!
//! `AppState` is cheap to clone (everything behind `Arc`). Handlers receive
//! `State<Arc<AppState>>` from Axum.
//!
//! The storefront sits behind a single async mutex. Every handler does its
//! read-modify-write while holding it, and `confirmPayment` keeps holding it
//! across the collaborator call, so at most one mutation is ever in flight.
//! All clients share this one session (one cart, one page cursor).

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use sf_config::{ConfirmMode, LoadedConfig, PurchaseConfig, DEFAULT_FUNCTION_ID};
use sf_confirm::{HttpConfirmer, LocalConfirmer, PurchaseConfirmer};
use sf_core::{Seed, Storefront, StorefrontView};
use tokio::sync::{broadcast, Mutex};

// ---------------------------------------------------------------------------
// BusMsg: SSE event bus payload
// ---------------------------------------------------------------------------

/// Messages broadcast over the internal event bus and surfaced as SSE events.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BusMsg {
    Heartbeat { ts_millis: i64 },
    State(StorefrontView),
    LogLine { level: String, msg: String },
}

// ---------------------------------------------------------------------------
// BuildInfo
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BuildInfo {
    pub service: &'static str,
    pub version: &'static str,
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// Cloneable (Arc) handle shared across all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Broadcast bus for SSE.
    pub bus: broadcast::Sender<BusMsg>,
    pub build: BuildInfo,
    /// Hash of the resolved configuration; `"unconfigured"` for bare test state.
    pub config_hash: String,
    /// The one storefront session.
    pub store: Arc<Mutex<Storefront>>,
    /// Purchase-confirmation collaborator.
    pub confirmer: Arc<dyn PurchaseConfirmer>,
    /// Remote function id sent with every confirmation request.
    pub function_id: String,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    /// Default seed, in-process confirmer.
    pub fn new() -> Self {
        let (bus, _rx) = broadcast::channel::<BusMsg>(1024);

        Self {
            bus,
            build: BuildInfo {
                service: "sf-daemon",
                version: env!("CARGO_PKG_VERSION"),
            },
            config_hash: "unconfigured".to_string(),
            store: Arc::new(Mutex::new(Storefront::default())),
            confirmer: Arc::new(LocalConfirmer),
            function_id: DEFAULT_FUNCTION_ID.to_string(),
        }
    }

    /// Replace the session with a fresh one built from `seed`.
    pub fn seeded(mut self, seed: Seed) -> Self {
        self.store = Arc::new(Mutex::new(Storefront::new(seed)));
        self
    }

    pub fn confirming_with(mut self, confirmer: Arc<dyn PurchaseConfirmer>) -> Self {
        self.confirmer = confirmer;
        self
    }

    pub fn from_config(loaded: &LoadedConfig) -> anyhow::Result<Self> {
        let cfg = &loaded.config;
        let confirmer = build_confirmer(&cfg.purchase)?;

        let mut st = Self::new().seeded(cfg.seed()).confirming_with(confirmer);
        st.config_hash = loaded.config_hash.clone();
        st.function_id = cfg.purchase.function_id.clone();
        Ok(st)
    }

    /// Broadcast the current view. Callers pass the view they read under the
    /// lock so the event matches the response.
    pub fn publish(&self, view: StorefrontView) {
        let _ = self.bus.send(BusMsg::State(view));
    }

    pub fn log_line(&self, level: &str, msg: impl Into<String>) {
        let _ = self.bus.send(BusMsg::LogLine {
            level: level.to_string(),
            msg: msg.into(),
        });
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Pick the confirmation collaborator named by configuration.
pub fn build_confirmer(cfg: &PurchaseConfig) -> anyhow::Result<Arc<dyn PurchaseConfirmer>> {
    match cfg.mode {
        ConfirmMode::Local => Ok(Arc::new(LocalConfirmer)),
        ConfirmMode::Http => {
            let endpoint = cfg
                .endpoint
                .clone()
                .context("purchase.endpoint is required when purchase.mode=http")?;
            let c = HttpConfirmer::new(endpoint, Duration::from_millis(cfg.timeout_ms))
                .context("failed to build http purchase confirmer")?;
            Ok(Arc::new(c))
        }
    }
}

/// Spawn a background task that emits a heartbeat SSE every `interval`.
pub fn spawn_heartbeat(bus: broadcast::Sender<BusMsg>, interval: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let ts = chrono::Utc::now().timestamp_millis();
            let _ = bus.send(BusMsg::Heartbeat { ts_millis: ts });
        }
    });
}
