//! Axum router and all HTTP handlers for sf-daemon.
//!
//! `build_router` is the single entry point; `main.rs` calls it and attaches
//! middleware layers. Storefront endpoints are all `POST` and answer JSON;
//! `/health` and `/stream` are `GET`.

use std::{convert::Infallible, sync::Arc};

use axum::{
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use futures_util::{Stream, StreamExt};
use sf_confirm::PurchaseRequest;
use sf_core::{Page, StorefrontError};
use sf_schemas::{
    AddToCartResponse, Confirmation, CrashResponse, DataResponse, ErrorBody, HealthResponse,
    OkResponse, PageResponse, PaymentResponse, StockRefusedBody,
    CODE_CONFIRMER_UNAVAILABLE,
};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{error, info, warn};

use crate::state::{AppState, BusMsg};

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the complete application router wired to the given shared state.
///
/// Middleware layers (CORS, tracing) are **not** applied here; `main.rs`
/// attaches them after this call so tests can use the bare router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/stream", get(stream))
        .route("/page", post(page))
        .route("/data", post(data))
        .route("/incrementPage", post(increment_page))
        .route("/decrementPage", post(decrement_page))
        .route("/addToCart", post(add_to_cart))
        .route("/confirmPayment", post(confirm_payment))
        .route("/toggleCrash", post(toggle_crash))
        .route("/createCrashTable", post(create_crash_table))
        .route("/createInventoryTable", post(create_inventory_table))
        .route("/createBankTable", post(create_bank_table))
        .route("/createTables", post(create_tables))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

/// Translate a refused storefront operation into its HTTP response.
///
/// | Error               | Status |
/// |---------------------|--------|
/// | `InsufficientStock` | 400    |
/// | `PaymentDeclined`   | 402    |
/// | `InvalidTransition` | 409    |
/// | `CounterOverflow`   | 409    |
/// | `PaymentTimedOut`   | 504    |
fn refusal(err: &StorefrontError) -> Response {
    match err {
        StorefrontError::InsufficientStock { website_inventory } => (
            StatusCode::BAD_REQUEST,
            Json(StockRefusedBody {
                result: *website_inventory,
                error: err.to_string(),
                code: err.code().to_string(),
            }),
        )
            .into_response(),
        StorefrontError::InvalidTransition(t) => {
            error_body(StatusCode::CONFLICT, err, Some(t.from))
        }
        StorefrontError::PaymentDeclined { .. } => {
            error_body(StatusCode::PAYMENT_REQUIRED, err, None)
        }
        StorefrontError::PaymentTimedOut => error_body(StatusCode::GATEWAY_TIMEOUT, err, None),
        StorefrontError::CounterOverflow { .. } => error_body(StatusCode::CONFLICT, err, None),
    }
}

fn error_body(status: StatusCode, err: &StorefrontError, page: Option<Page>) -> Response {
    (
        status,
        Json(ErrorBody {
            error: err.to_string(),
            code: err.code().to_string(),
            page,
        }),
    )
        .into_response()
}

// ---------------------------------------------------------------------------
// GET /health
// ---------------------------------------------------------------------------

pub(crate) async fn health(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            ok: true,
            service: st.build.service.to_string(),
            version: st.build.version.to_string(),
            config_hash: st.config_hash.clone(),
        }),
    )
}

// ---------------------------------------------------------------------------
// Reads: POST /page, POST /data
// ---------------------------------------------------------------------------

pub(crate) async fn page(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    let page = st.store.lock().await.page();
    Json(PageResponse::new(page))
}

pub(crate) async fn data(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    let snap = st.store.lock().await.state();
    Json(DataResponse::new(snap))
}

// ---------------------------------------------------------------------------
// POST /incrementPage, POST /decrementPage
// ---------------------------------------------------------------------------

pub(crate) async fn increment_page(State(st): State<Arc<AppState>>) -> Response {
    let mut store = st.store.lock().await;
    match store.increment_page() {
        Ok(page) => {
            let view = store.view();
            drop(store);
            info!(page = page.as_u8(), "incrementPage");
            st.publish(view);
            Json(PageResponse::new(page)).into_response()
        }
        Err(e) => {
            warn!(error = %e, "incrementPage refused");
            refusal(&e)
        }
    }
}

pub(crate) async fn decrement_page(State(st): State<Arc<AppState>>) -> Response {
    let mut store = st.store.lock().await;
    let released = store.item_reserved();
    match store.decrement_page() {
        Ok(page) => {
            let view = store.view();
            drop(store);
            info!(page = page.as_u8(), released_item = released, "decrementPage");
            st.publish(view);
            Json(PageResponse::new(page)).into_response()
        }
        Err(e) => {
            warn!(error = %e, "decrementPage refused");
            refusal(&e)
        }
    }
}

// ---------------------------------------------------------------------------
// POST /addToCart
// ---------------------------------------------------------------------------

pub(crate) async fn add_to_cart(State(st): State<Arc<AppState>>) -> Response {
    let mut store = st.store.lock().await;
    match store.add_to_cart() {
        Ok(left) => {
            let view = store.view();
            drop(store);
            info!(website_inventory = left, "addToCart");
            st.publish(view);
            Json(AddToCartResponse::new(left)).into_response()
        }
        Err(e) => {
            warn!(error = %e, "addToCart refused");
            refusal(&e)
        }
    }
}

// ---------------------------------------------------------------------------
// POST /confirmPayment
// ---------------------------------------------------------------------------

/// Confirm the reserved item's purchase.
///
/// The lock is held from the precondition check through settlement, so the
/// collaborator call cannot interleave with another mutation. Counters move
/// only after a `Confirmed` outcome; a collaborator failure is reported as
/// 502 and nothing changes.
pub(crate) async fn confirm_payment(State(st): State<Arc<AppState>>) -> Response {
    let mut store = st.store.lock().await;

    if let Err(e) = store.begin_payment() {
        warn!(error = %e, "confirmPayment refused");
        return refusal(&e);
    }

    let request = PurchaseRequest::new(st.function_id.clone());
    info!(
        request_id = %request.request_id,
        confirmer = st.confirmer.name(),
        "confirming purchase"
    );

    let outcome = match st.confirmer.confirm(&request).await {
        Ok(o) => o,
        Err(e) => {
            drop(store);
            error!(request_id = %request.request_id, error = %e, "purchase confirmer failed");
            st.log_line("ERROR", format!("purchase confirmer failed: {e}"));
            return (
                StatusCode::BAD_GATEWAY,
                Json(ErrorBody {
                    error: format!("purchase confirmation unavailable: {e}"),
                    code: CODE_CONFIRMER_UNAVAILABLE.to_string(),
                    page: None,
                }),
            )
                .into_response();
        }
    };

    match store.settle_payment(&outcome) {
        Ok(receipt) => {
            let view = store.view();
            drop(store);

            let totals = receipt.totals;
            if totals.is_negative() {
                warn!(
                    warehouse_inventory = totals.warehouse_inventory,
                    customer_bank = totals.customer_bank,
                    "confirmPayment drove a counter negative"
                );
            }
            info!(
                confirmation_id = %receipt.confirmation_id,
                warehouse_inventory = totals.warehouse_inventory,
                customer_bank = totals.customer_bank,
                "confirmPayment"
            );
            st.publish(view);

            Json(PaymentResponse {
                result: totals,
                confirmation: Confirmation {
                    id: receipt.confirmation_id,
                    confirmed_at: Utc::now(),
                },
            })
            .into_response()
        }
        Err(e) => {
            drop(store);
            warn!(request_id = %request.request_id, error = %e, "purchase not confirmed");
            st.log_line("WARN", e.to_string());
            refusal(&e)
        }
    }
}

// ---------------------------------------------------------------------------
// POST /toggleCrash
// ---------------------------------------------------------------------------

pub(crate) async fn toggle_crash(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    let mut store = st.store.lock().await;
    let crashed = store.toggle_crash();
    let view = store.view();
    drop(store);

    info!(crashed, "toggleCrash");
    st.log_line(
        if crashed { "WARN" } else { "INFO" },
        if crashed {
            "crash mode enabled"
        } else {
            "crash mode disabled"
        },
    );
    st.publish(view);
    Json(CrashResponse { crashed })
}

// ---------------------------------------------------------------------------
// Table provisioning placeholders
// ---------------------------------------------------------------------------

/// Backing tables a persistent deployment would provision. There is no
/// persistence backend, so these only acknowledge.
#[derive(Debug, Clone, Copy)]
enum Table {
    Crash,
    Inventory,
    Bank,
}

impl Table {
    fn as_str(self) -> &'static str {
        match self {
            Table::Crash => "crash",
            Table::Inventory => "inventory",
            Table::Bank => "bank",
        }
    }
}

fn provision(st: &AppState, tables: &[Table]) -> Json<OkResponse> {
    for t in tables {
        info!(table = t.as_str(), "create table requested; no persistence backend");
        st.log_line("INFO", format!("table {} acknowledged", t.as_str()));
    }
    Json(OkResponse::default())
}

pub(crate) async fn create_crash_table(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    provision(&st, &[Table::Crash])
}

pub(crate) async fn create_inventory_table(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    provision(&st, &[Table::Inventory])
}

pub(crate) async fn create_bank_table(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    provision(&st, &[Table::Bank])
}

pub(crate) async fn create_tables(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    provision(&st, &[Table::Crash, Table::Inventory, Table::Bank])
}

// ---------------------------------------------------------------------------
// GET /stream  (SSE)
// ---------------------------------------------------------------------------

pub(crate) async fn stream(State(st): State<Arc<AppState>>) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert("Cache-Control", HeaderValue::from_static("no-cache"));
    headers.insert("Connection", HeaderValue::from_static("keep-alive"));

    let rx = st.bus.subscribe();
    let events = broadcast_to_sse(rx);

    (headers, Sse::new(events).keep_alive(KeepAlive::new())).into_response()
}

fn broadcast_to_sse(
    rx: broadcast::Receiver<BusMsg>,
) -> impl Stream<Item = Result<Event, Infallible>> {
    BroadcastStream::new(rx).filter_map(|msg| async move {
        match msg {
            Ok(m) => {
                let event_name = match &m {
                    BusMsg::Heartbeat { .. } => "heartbeat",
                    BusMsg::State(_) => "state",
                    BusMsg::LogLine { .. } => "log",
                };
                let data = serde_json::to_string(&m).ok()?;
                Some(Ok(Event::default().event(event_name).data(data)))
            }
            Err(_) => None, // lagged / closed
        }
    })
}
