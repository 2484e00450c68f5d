//! Scenario: website stock never drops below zero.
//!
//! Drains the shelf one checkout cycle at a time. The call that would cross
//! zero is refused with `InsufficientStock` and changes nothing.

use sf_core::*;

fn buy_one(sf: &mut Storefront) -> Result<u32, StorefrontError> {
    sf.increment_page()?;
    let left = sf.add_to_cart();
    if left.is_err() {
        sf.decrement_page()?;
        return left;
    }
    sf.settle_payment(&PurchaseOutcome::Confirmed {
        confirmation_id: "t".to_string(),
    })?;
    sf.decrement_page()?;
    left
}

#[test]
fn draining_the_shelf_stops_at_zero() {
    let mut sf = Storefront::new(Seed {
        website_inventory: 3,
        ..Seed::default()
    });

    assert_eq!(buy_one(&mut sf).unwrap(), 2);
    assert_eq!(buy_one(&mut sf).unwrap(), 1);
    assert_eq!(buy_one(&mut sf).unwrap(), 0);

    for _ in 0..5 {
        let err = buy_one(&mut sf).unwrap_err();
        assert_eq!(
            err,
            StorefrontError::InsufficientStock {
                website_inventory: 0
            }
        );
        assert_eq!(sf.state().website_inventory, 0);
    }
}

#[test]
fn exhausted_add_to_cart_leaves_state_unchanged() {
    let mut sf = Storefront::new(Seed {
        website_inventory: 0,
        ..Seed::default()
    });
    sf.increment_page().unwrap();
    let before = sf.clone();

    let err = sf.add_to_cart().unwrap_err();
    assert_eq!(err.code(), "INSUFFICIENT_STOCK");
    assert_eq!(sf, before, "failed add_to_cart must not mutate");
    assert!(!sf.item_reserved());
}
