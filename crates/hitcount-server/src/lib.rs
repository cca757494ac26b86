//! hitcount HTTP server library entry.
//!
//! Wires configuration, the store adapters, and the counter service into an
//! axum router. Consumed by the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod error;
pub mod handlers;
pub mod host;
pub mod obs;
pub mod ops;
pub mod router;
pub mod store;
