//! Terminal rendering of a [`View`].

use std::fmt;

use sf_core::Page;

use crate::driver::View;

const GREEN: &str = "#128132";
const ORANGE: &str = "#F74C00";
const GREY: &str = "#c9c9c9";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Control {
    pub label: &'static str,
    pub background: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendering {
    pub primary: Control,
    pub crash: Control,
    pub website_inventory: String,
    pub warehouse_inventory: String,
    pub customer_bank: String,
}

pub fn render(view: &View) -> Rendering {
    let primary = if view.loading {
        Control {
            label: "Loading...",
            background: GREY,
        }
    } else {
        match view.page {
            Page::Browsing => Control {
                label: "Add Ferris to Cart",
                background: GREEN,
            },
            Page::Checkout => Control {
                label: "Purchase Ferris!",
                background: GREEN,
            },
        }
    };

    let crash = if view.crashed {
        Control {
            label: "Reboot Application",
            background: GREEN,
        }
    } else {
        Control {
            label: "Crash Application",
            background: ORANGE,
        }
    };

    Rendering {
        primary,
        crash,
        website_inventory: view.inventory.website_inventory.to_string(),
        warehouse_inventory: view.inventory.warehouse_inventory.to_string(),
        customer_bank: format!("${}", view.inventory.customer_bank),
    }
}

impl fmt::Display for Rendering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "website inventory   : {}", self.website_inventory)?;
        writeln!(f, "warehouse inventory : {}", self.warehouse_inventory)?;
        writeln!(f, "customer bank       : {}", self.customer_bank)?;
        writeln!(
            f,
            "[ {} ] ({})",
            self.primary.label, self.primary.background
        )?;
        write!(f, "[ {} ] ({})", self.crash.label, self.crash.background)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sf_core::InventorySnapshot;

    fn view(page: Page) -> View {
        View {
            page,
            inventory: InventorySnapshot {
                website_inventory: 99,
                warehouse_inventory: -1,
                customer_bank: 990,
            },
            crashed: false,
            loading: false,
        }
    }

    #[test]
    fn primary_label_follows_page() {
        assert_eq!(render(&view(Page::Browsing)).primary.label, "Add Ferris to Cart");
        assert_eq!(render(&view(Page::Checkout)).primary.label, "Purchase Ferris!");
    }

    #[test]
    fn loading_overrides_primary() {
        let mut v = view(Page::Checkout);
        v.loading = true;
        assert_eq!(
            render(&v).primary,
            Control {
                label: "Loading...",
                background: "#c9c9c9"
            }
        );
    }

    #[test]
    fn counters_echo_and_bank_is_prefixed() {
        let r = render(&view(Page::Browsing));
        assert_eq!(r.website_inventory, "99");
        assert_eq!(r.warehouse_inventory, "-1");
        assert_eq!(r.customer_bank, "$990");
    }

    #[test]
    fn crash_control_colors() {
        let mut v = view(Page::Browsing);
        assert_eq!(render(&v).crash.background, "#F74C00");
        v.crashed = true;
        let c = render(&v).crash;
        assert_eq!(c.label, "Reboot Application");
        assert_eq!(c.background, "#128132");
    }

    #[test]
    fn render_is_pure() {
        let v = view(Page::Checkout);
        assert_eq!(render(&v), render(&v));
    }
}
