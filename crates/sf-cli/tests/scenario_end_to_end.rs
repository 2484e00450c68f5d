//! Driver talking HTTP to the real daemon router on an ephemeral port.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use sf_cli::{HttpStorefrontApi, SessionDriver, StorefrontApi};
use sf_core::{Page, Seed};
use sf_daemon::{routes, state};

async fn serve(st: state::AppState) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = routes::build_router(Arc::new(st));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn api(addr: SocketAddr) -> HttpStorefrontApi {
    HttpStorefrontApi::new(format!("http://{addr}"), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn full_purchase_over_http() {
    let addr = serve(state::AppState::new()).await;
    let mut d = SessionDriver::new(api(addr));

    d.load().await.unwrap();
    d.primary_action().await.unwrap();
    let v = d.primary_action().await.unwrap();

    assert_eq!(v.page, Page::Browsing);
    assert_eq!(v.inventory.website_inventory, 99);
    assert_eq!(v.inventory.warehouse_inventory, 99);
    assert_eq!(v.inventory.customer_bank, 990);
}

#[tokio::test]
async fn refusals_decode_into_status_errors() {
    let addr = serve(state::AppState::new()).await;
    let api = api(addr);

    let err = api.add_to_cart().await.unwrap_err();
    assert!(err.is_invalid_transition(), "{err}");

    api.increment_page().await.unwrap();
    let err = api.increment_page().await.unwrap_err();
    match err {
        sf_cli::ClientError::Status { status, .. } => assert_eq!(status, 409),
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn empty_shelf_over_http_alerts() {
    let st = state::AppState::new().seeded(Seed {
        website_inventory: 0,
        ..Seed::default()
    });
    let addr = serve(st).await;
    let mut d = SessionDriver::new(api(addr));

    d.load().await.unwrap();
    let v = d.primary_action().await.unwrap();
    assert_eq!(v.page, Page::Browsing);
    assert_eq!(d.take_alerts(), vec![sf_cli::Alert::OutOfStock]);
}

#[tokio::test]
async fn unreachable_daemon_is_transport_error() {
    let api = HttpStorefrontApi::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
    let err = api.page().await.unwrap_err();
    assert!(matches!(err, sf_cli::ClientError::Transport(_)), "{err}");
}
