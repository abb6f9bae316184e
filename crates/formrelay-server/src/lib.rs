//! `formrelay` HTTP server.
//!
//! Wires the verify-then-deliver pipeline from `formrelay-core` into an Axum
//! server that enforces the origin and method policy and shapes every answer
//! into the `{success, message, details?}` envelope.

pub mod config;
pub mod cors;
pub mod envelope;
pub mod error;
pub mod routes;
pub mod state;
