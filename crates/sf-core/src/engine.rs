//! Storefront state machine.
//!
//! # State diagram
//!
//! ```text
//!              incrementPage
//!   Browsing ─────────────────► Checkout (empty)
//!      ▲                          │    ▲
//!      │ decrementPage            │    │ confirmPayment (Confirmed)
//!      │ (releases unpaid item)   │    │
//!      │                 addToCart│    │
//!      │                          ▼    │
//!      └──────────────────── Checkout (reserved)
//! ```
//!
//! Operations outside these arrows return [`TransitionError`] and leave every
//! field untouched. `toggleCrash` is legal everywhere.

use crate::{
    InventorySnapshot, Operation, Page, PaymentReceipt, PaymentTotals, PurchaseOutcome, Seed,
    StorefrontError, StorefrontView, TransitionError, UNIT_PRICE,
};

/// The single shared storefront session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Storefront {
    website_inventory: u32,
    warehouse_inventory: i64,
    customer_bank: i64,
    page: Page,
    crashed: bool,
    reserved: bool,
}

impl Default for Storefront {
    fn default() -> Self {
        Self::new(Seed::default())
    }
}

impl Storefront {
    /// Fresh session on the browsing page, crash mode off.
    pub fn new(seed: Seed) -> Self {
        Self {
            website_inventory: seed.website_inventory,
            warehouse_inventory: seed.warehouse_inventory,
            customer_bank: seed.customer_bank,
            page: Page::Browsing,
            crashed: false,
            reserved: false,
        }
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub fn state(&self) -> InventorySnapshot {
        InventorySnapshot {
            website_inventory: self.website_inventory,
            warehouse_inventory: self.warehouse_inventory,
            customer_bank: self.customer_bank,
        }
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn crash_mode(&self) -> bool {
        self.crashed
    }

    pub fn item_reserved(&self) -> bool {
        self.reserved
    }

    pub fn view(&self) -> StorefrontView {
        StorefrontView {
            page: self.page,
            website_inventory: self.website_inventory,
            warehouse_inventory: self.warehouse_inventory,
            customer_bank: self.customer_bank,
            crashed: self.crashed,
            item_reserved: self.reserved,
        }
    }

    // -----------------------------------------------------------------------
    // Page cursor
    // -----------------------------------------------------------------------

    /// Browsing → Checkout.
    pub fn increment_page(&mut self) -> Result<Page, StorefrontError> {
        if self.page != Page::Browsing {
            return Err(self.refuse(Operation::IncrementPage));
        }
        self.page = Page::Checkout;
        Ok(self.page)
    }

    /// Checkout → Browsing. An item still held by checkout goes back on the
    /// website shelf.
    pub fn decrement_page(&mut self) -> Result<Page, StorefrontError> {
        if self.page != Page::Checkout {
            return Err(self.refuse(Operation::DecrementPage));
        }
        if self.reserved {
            self.website_inventory = self.website_inventory.saturating_add(1);
            self.reserved = false;
        }
        self.page = Page::Browsing;
        Ok(self.page)
    }

    // -----------------------------------------------------------------------
    // Cart
    // -----------------------------------------------------------------------

    /// Move one unit from the website shelf into checkout.
    ///
    /// Returns the new website inventory.
    ///
    /// # Errors
    /// - [`StorefrontError::InvalidTransition`] unless on an empty checkout.
    /// - [`StorefrontError::InsufficientStock`] when the shelf is empty.
    pub fn add_to_cart(&mut self) -> Result<u32, StorefrontError> {
        if self.page != Page::Checkout || self.reserved {
            return Err(self.refuse(Operation::AddToCart));
        }
        if self.website_inventory == 0 {
            return Err(StorefrontError::InsufficientStock {
                website_inventory: self.website_inventory,
            });
        }
        self.website_inventory -= 1;
        self.reserved = true;
        Ok(self.website_inventory)
    }

    // -----------------------------------------------------------------------
    // Payment (two-phase)
    // -----------------------------------------------------------------------

    /// Check that a payment may be attempted. Never mutates.
    ///
    /// Callers run this before contacting the confirmation collaborator so
    /// an illegal request never reaches it.
    pub fn begin_payment(&self) -> Result<(), StorefrontError> {
        if self.page != Page::Checkout || !self.reserved {
            return Err(self.refuse(Operation::ConfirmPayment));
        }
        Ok(())
    }

    /// Apply the collaborator's decision.
    ///
    /// Counters move only on [`PurchaseOutcome::Confirmed`]: warehouse stock
    /// by one, bank by [`UNIT_PRICE`]. Neither has a floor, but a decrement
    /// that would leave `i64` is refused with
    /// [`StorefrontError::CounterOverflow`] and nothing moves. The session
    /// stays on checkout; the driver returns to browsing with `decrement_page`.
    pub fn settle_payment(
        &mut self,
        outcome: &PurchaseOutcome,
    ) -> Result<PaymentReceipt, StorefrontError> {
        self.begin_payment()?;

        match outcome {
            PurchaseOutcome::Confirmed { confirmation_id } => {
                let warehouse = self.warehouse_inventory.checked_sub(1).ok_or(
                    StorefrontError::CounterOverflow {
                        counter: "warehouseInventory",
                    },
                )?;
                let bank = self.customer_bank.checked_sub(UNIT_PRICE).ok_or(
                    StorefrontError::CounterOverflow {
                        counter: "customerBank",
                    },
                )?;
                self.warehouse_inventory = warehouse;
                self.customer_bank = bank;
                self.reserved = false;
                Ok(PaymentReceipt {
                    confirmation_id: confirmation_id.clone(),
                    totals: self.payment_totals(),
                })
            }
            PurchaseOutcome::Declined { reason } => Err(StorefrontError::PaymentDeclined {
                reason: reason.clone(),
            }),
            PurchaseOutcome::TimedOut => Err(StorefrontError::PaymentTimedOut),
        }
    }

    pub fn payment_totals(&self) -> PaymentTotals {
        PaymentTotals {
            warehouse_inventory: self.warehouse_inventory,
            customer_bank: self.customer_bank,
        }
    }

    // -----------------------------------------------------------------------
    // Crash flag
    // -----------------------------------------------------------------------

    /// Flip crash mode and return the new value.
    pub fn toggle_crash(&mut self) -> bool {
        self.crashed = !self.crashed;
        self.crashed
    }

    fn refuse(&self, op: Operation) -> StorefrontError {
        StorefrontError::InvalidTransition(TransitionError {
            from: self.page,
            reserved: self.reserved,
            op,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn confirmed() -> PurchaseOutcome {
        PurchaseOutcome::Confirmed {
            confirmation_id: "c-1".to_string(),
        }
    }

    #[test]
    fn fresh_session_is_browsing_with_seed_counters() {
        let sf = Storefront::default();
        assert_eq!(sf.page(), Page::Browsing);
        assert!(!sf.crash_mode());
        assert!(!sf.item_reserved());
        assert_eq!(sf.state().website_inventory, 100);
    }

    #[test]
    fn add_to_cart_refused_while_browsing() {
        let mut sf = Storefront::default();
        let err = sf.add_to_cart().unwrap_err();
        assert_eq!(err.code(), "INVALID_TRANSITION");
        assert_eq!(sf, Storefront::default());
    }

    #[test]
    fn second_add_to_cart_in_same_checkout_refused() {
        let mut sf = Storefront::default();
        sf.increment_page().unwrap();
        assert_eq!(sf.add_to_cart().unwrap(), 99);
        let before = sf.clone();
        assert!(matches!(
            sf.add_to_cart(),
            Err(StorefrontError::InvalidTransition(_))
        ));
        assert_eq!(sf, before);
    }

    #[test]
    fn decrement_releases_unpaid_item() {
        let mut sf = Storefront::default();
        sf.increment_page().unwrap();
        sf.add_to_cart().unwrap();
        assert_eq!(sf.decrement_page().unwrap(), Page::Browsing);
        assert_eq!(sf.state().website_inventory, 100);
        assert!(!sf.item_reserved());
    }

    #[test]
    fn begin_payment_requires_reserved_item() {
        let mut sf = Storefront::default();
        sf.increment_page().unwrap();
        assert!(sf.begin_payment().is_err());
        sf.add_to_cart().unwrap();
        assert!(sf.begin_payment().is_ok());
    }

    #[test]
    fn declined_payment_leaves_counters_and_reservation() {
        let mut sf = Storefront::default();
        sf.increment_page().unwrap();
        sf.add_to_cart().unwrap();
        let before = sf.clone();

        let err = sf
            .settle_payment(&PurchaseOutcome::Declined {
                reason: "card expired".to_string(),
            })
            .unwrap_err();
        assert_eq!(
            err,
            StorefrontError::PaymentDeclined {
                reason: "card expired".to_string()
            }
        );
        assert_eq!(sf, before);

        assert_eq!(
            sf.settle_payment(&PurchaseOutcome::TimedOut).unwrap_err(),
            StorefrontError::PaymentTimedOut
        );
        assert_eq!(sf, before);
    }

    #[test]
    fn settle_clears_reservation_and_stays_on_checkout() {
        let mut sf = Storefront::default();
        sf.increment_page().unwrap();
        sf.add_to_cart().unwrap();
        let receipt = sf.settle_payment(&confirmed()).unwrap();
        assert_eq!(receipt.confirmation_id, "c-1");
        assert_eq!(sf.page(), Page::Checkout);
        assert!(!sf.item_reserved());
        // Paid item is gone for good.
        sf.decrement_page().unwrap();
        assert_eq!(sf.state().website_inventory, 99);
    }

    #[test]
    fn settle_at_i64_min_is_refused_without_mutation() {
        let mut sf = Storefront::new(Seed {
            warehouse_inventory: i64::MIN,
            ..Seed::default()
        });
        sf.increment_page().unwrap();
        sf.add_to_cart().unwrap();
        let before = sf.clone();

        assert_eq!(
            sf.settle_payment(&confirmed()).unwrap_err(),
            StorefrontError::CounterOverflow {
                counter: "warehouseInventory"
            }
        );
        assert_eq!(sf, before);
    }

    #[test]
    fn settle_refuses_bank_underflow_and_keeps_warehouse() {
        let mut sf = Storefront::new(Seed {
            customer_bank: i64::MIN + UNIT_PRICE - 1,
            ..Seed::default()
        });
        sf.increment_page().unwrap();
        sf.add_to_cart().unwrap();

        let err = sf.settle_payment(&confirmed()).unwrap_err();
        assert_eq!(err.code(), "COUNTER_OVERFLOW");
        assert_eq!(sf.state().warehouse_inventory, 100);
        assert!(sf.item_reserved());
    }

    #[test]
    fn view_reflects_every_field() {
        let mut sf = Storefront::default();
        sf.toggle_crash();
        sf.increment_page().unwrap();
        sf.add_to_cart().unwrap();
        let v = sf.view();
        assert_eq!(v.page, Page::Checkout);
        assert!(v.crashed);
        assert!(v.item_reserved);
        assert_eq!(v.website_inventory, 99);
    }
}
