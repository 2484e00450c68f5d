//! `confirmPayment` when the collaborator says no, stalls, or breaks.
//!
//! In every case the counters stay put and the item stays reserved, so the
//! client can retry from the same checkout page.

use std::sync::Arc;

use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use sf_confirm::{ConfirmError, PurchaseConfirmer, PurchaseOutcome, PurchaseRequest};
use sf_daemon::{routes, state};
use tower::ServiceExt;

/// Returns a fixed answer for every request.
struct Scripted(Result<PurchaseOutcome, ConfirmError>);

#[async_trait::async_trait]
impl PurchaseConfirmer for Scripted {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn confirm(&self, _request: &PurchaseRequest) -> Result<PurchaseOutcome, ConfirmError> {
        self.0.clone()
    }
}

async fn call(router: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let resp = router.oneshot(req).await.expect("oneshot failed");
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&body).expect("json body"))
}

/// Router with one item reserved on the checkout page.
async fn reserved_checkout(answer: Result<PurchaseOutcome, ConfirmError>) -> axum::Router {
    let st = state::AppState::new().confirming_with(Arc::new(Scripted(answer)));
    let router = routes::build_router(Arc::new(st));
    call(router.clone(), "/incrementPage").await;
    call(router.clone(), "/addToCart").await;
    router
}

async fn assert_nothing_settled(router: &axum::Router) {
    let (_, b) = call(router.clone(), "/data").await;
    assert_eq!(b["result"]["websiteInventory"], 99);
    assert_eq!(b["result"]["warehouseInventory"], 100);
    assert_eq!(b["result"]["customerBank"], 1000);
    let (_, b) = call(router.clone(), "/page").await;
    assert_eq!(b["result"], 1);
}

#[tokio::test]
async fn declined_is_402() {
    let router = reserved_checkout(Ok(PurchaseOutcome::Declined {
        reason: "insufficient funds".to_string(),
    }))
    .await;

    let (s, b) = call(router.clone(), "/confirmPayment").await;
    assert_eq!(s, StatusCode::PAYMENT_REQUIRED);
    assert_eq!(b["code"], "PAYMENT_DECLINED");
    assert!(b["error"].as_str().unwrap().contains("insufficient funds"));

    assert_nothing_settled(&router).await;
}

#[tokio::test]
async fn timed_out_is_504() {
    let router = reserved_checkout(Ok(PurchaseOutcome::TimedOut)).await;

    let (s, b) = call(router.clone(), "/confirmPayment").await;
    assert_eq!(s, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(b["code"], "PAYMENT_TIMEOUT");

    assert_nothing_settled(&router).await;
}

#[tokio::test]
async fn collaborator_error_is_502() {
    let router = reserved_checkout(Err(ConfirmError::Transport(
        "connection refused".to_string(),
    )))
    .await;

    let (s, b) = call(router.clone(), "/confirmPayment").await;
    assert_eq!(s, StatusCode::BAD_GATEWAY);
    assert_eq!(b["code"], "CONFIRMER_UNAVAILABLE");

    assert_nothing_settled(&router).await;
}

#[tokio::test]
async fn failed_payment_can_be_abandoned() {
    let router = reserved_checkout(Ok(PurchaseOutcome::TimedOut)).await;
    call(router.clone(), "/confirmPayment").await;

    let (s, _) = call(router.clone(), "/decrementPage").await;
    assert_eq!(s, StatusCode::OK);
    let (_, b) = call(router, "/data").await;
    assert_eq!(b["result"]["websiteInventory"], 100);
}
