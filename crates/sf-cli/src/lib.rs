//! Storefront client: HTTP API wrapper, session driver and terminal renderer.
//!
//! The `sf` binary in `main.rs` is a thin clap front-end over these modules.

pub mod api;
pub mod driver;
pub mod render;

pub use api::{ClientError, HttpStorefrontApi, StorefrontApi};
pub use driver::{Alert, SessionDriver, View};
pub use render::{render, Control, Rendering};
