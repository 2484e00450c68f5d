//! Scenario: the page cursor only ever holds browsing (0) or checkout (1).
//!
//! Repeated increments or decrements past either end are refused with
//! `InvalidTransition` instead of walking the cursor to 2, 3, -1, ...

use sf_core::*;

#[test]
fn repeated_increment_is_refused_after_checkout() {
    let mut sf = Storefront::default();
    assert_eq!(sf.increment_page().unwrap(), Page::Checkout);

    for _ in 0..10 {
        match sf.increment_page() {
            Err(StorefrontError::InvalidTransition(e)) => {
                assert_eq!(e.from, Page::Checkout);
                assert_eq!(e.op, Operation::IncrementPage);
            }
            other => panic!("expected InvalidTransition, got {other:?}"),
        }
    }
    assert_eq!(sf.page(), Page::Checkout);
    assert_eq!(sf.page().as_u8(), 1);
}

#[test]
fn decrement_on_browsing_is_refused() {
    let mut sf = Storefront::default();
    let err = sf.decrement_page().unwrap_err();
    assert_eq!(err.code(), "INVALID_TRANSITION");
    assert_eq!(sf.page(), Page::Browsing);
}

#[test]
fn confirm_payment_refused_outside_checkout() {
    let mut sf = Storefront::default();
    let before = sf.clone();
    let err = sf
        .settle_payment(&PurchaseOutcome::Confirmed {
            confirmation_id: "x".to_string(),
        })
        .unwrap_err();
    assert!(matches!(err, StorefrontError::InvalidTransition(_)));
    assert_eq!(sf, before);
}
