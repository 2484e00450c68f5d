//! sf-daemon library surface.
//!
//! Exposes `routes` and `state` so integration tests can build the router
//! in-process and drive it with `tower::ServiceExt::oneshot` without binding
//! a TCP port.

pub mod routes;
pub mod state;
