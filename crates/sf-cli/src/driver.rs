//! Client session driver.
//!
//! Keeps a local copy of what the daemon last said and sequences the
//! multi-call transitions behind each user action. The copy is never
//! authoritative: every action ends with a fresh [`SessionDriver::load`].

use std::fmt;

use sf_core::{InventorySnapshot, Page};
use tracing::{info, warn};

use crate::api::{ClientError, StorefrontApi};

/// Last-fetched snapshot plus client-only flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct View {
    pub page: Page,
    pub inventory: InventorySnapshot,
    /// Last value returned by `toggleCrash`. No endpoint reports it, so it
    /// starts `false`.
    pub crashed: bool,
    /// A payment confirmation is in flight.
    pub loading: bool,
}

impl Default for View {
    fn default() -> Self {
        Self {
            page: Page::Browsing,
            inventory: InventorySnapshot {
                website_inventory: 0,
                warehouse_inventory: 0,
                customer_bank: 0,
            },
            crashed: false,
            loading: false,
        }
    }
}

/// User-facing notices raised by an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alert {
    OutOfStock,
    PaymentFailed { message: String },
    CrashEnabled,
    CrashDisabled,
    TablesCreated,
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Alert::OutOfStock => write!(f, "Ferris is out of stock!"),
            Alert::PaymentFailed { message } => write!(f, "Payment failed: {message}"),
            Alert::CrashEnabled => write!(f, "Crash mode enabled!"),
            Alert::CrashDisabled => write!(f, "Crash mode disabled!"),
            Alert::TablesCreated => write!(f, "Tables created successfully!"),
        }
    }
}

pub struct SessionDriver<A> {
    api: A,
    view: View,
    alerts: Vec<Alert>,
}

impl<A: StorefrontApi> SessionDriver<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            view: View::default(),
            alerts: Vec::new(),
        }
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Drain alerts raised since the last call.
    pub fn take_alerts(&mut self) -> Vec<Alert> {
        std::mem::take(&mut self.alerts)
    }

    /// Fetch page, then counters.
    pub async fn load(&mut self) -> Result<View, ClientError> {
        let page = self.api.page().await?;
        let inventory = self.api.data().await?;
        self.view.page = page;
        self.view.inventory = inventory;
        Ok(self.view)
    }

    /// Mark a payment as in flight and return the view to show while it is
    /// pending. `None` when the cached page is not checkout.
    ///
    /// [`SessionDriver::primary_action`] clears the flag once the daemon
    /// answers, whatever the answer.
    pub fn begin_payment(&mut self) -> Option<View> {
        if self.view.page != Page::Checkout {
            return None;
        }
        self.view.loading = true;
        Some(self.view)
    }

    /// The single button: add to cart while browsing, pay while on checkout.
    ///
    /// A 409 means the cached page was stale (another client moved the
    /// shared session); the reload at the end picks up the real page.
    pub async fn primary_action(&mut self) -> Result<View, ClientError> {
        let step = match self.view.page {
            Page::Browsing => self.add_to_cart_sequence().await,
            Page::Checkout => {
                self.view.loading = true;
                let paid = self.confirm_sequence().await;
                self.view.loading = false;
                paid
            }
        };
        match step {
            Ok(()) => {}
            Err(e) if e.is_invalid_transition() => {
                warn!(error = %e, "session moved underneath us; reloading");
            }
            Err(e) => return Err(e),
        }
        self.load().await
    }

    async fn add_to_cart_sequence(&mut self) -> Result<(), ClientError> {
        self.api.increment_page().await?;
        match self.api.add_to_cart().await {
            Ok(left) => {
                info!(website_inventory = left, "item reserved");
                Ok(())
            }
            Err(e) if e.is_out_of_stock() => {
                warn!("out of stock");
                self.alerts.push(Alert::OutOfStock);
                self.api.decrement_page().await?;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn confirm_sequence(&mut self) -> Result<(), ClientError> {
        match self.api.confirm_payment().await {
            Ok(p) => {
                info!(
                    confirmation_id = %p.confirmation.id,
                    warehouse_inventory = p.result.warehouse_inventory,
                    customer_bank = p.result.customer_bank,
                    "payment confirmed"
                );
                self.view.inventory.warehouse_inventory = p.result.warehouse_inventory;
                self.view.inventory.customer_bank = p.result.customer_bank;
                self.api.decrement_page().await?;
                Ok(())
            }
            Err(e) if e.is_payment_failure() => {
                warn!(error = %e, "payment failed; staying on checkout");
                let message = match &e {
                    ClientError::Status { message, .. } => message.clone(),
                    other => other.to_string(),
                };
                self.alerts.push(Alert::PaymentFailed { message });
                Ok(())
            }
            Err(e) if e.is_invalid_transition() => {
                // Checkout with nothing reserved: head back to browsing.
                match self.api.decrement_page().await {
                    Err(d) if !d.is_invalid_transition() => Err(d),
                    _ => Ok(()),
                }
            }
            Err(e) => Err(e),
        }
    }

    pub async fn toggle_crash(&mut self) -> Result<bool, ClientError> {
        let crashed = self.api.toggle_crash().await?;
        self.view.crashed = crashed;
        self.alerts.push(if crashed {
            Alert::CrashEnabled
        } else {
            Alert::CrashDisabled
        });
        Ok(crashed)
    }

    pub async fn create_tables(&mut self) -> Result<(), ClientError> {
        self.api.create_crash_table().await?;
        self.api.create_inventory_table().await?;
        self.api.create_bank_table().await?;
        self.alerts.push(Alert::TablesCreated);
        Ok(())
    }
}
