//! HTTP gateway to an RT-style ticketing service (REST 2.0).
//!
//! This crate owns everything that touches the wire:
//! - [`api::RtApi`] — the service trait the sync engines program against,
//!   designed for dynamic dispatch (`dyn RtApi`) so tests can substitute a
//!   scripted double.
//! - [`client::RtClient`] — the reqwest-backed implementation.
//! - [`query`] — escaping and query construction for the service's search
//!   language. Every caller-supplied literal goes through the escaper; the
//!   builders here are the only place queries are assembled.
//! - [`endpoint`] — base-URL validation (scheme and address-space policy)
//!   that must pass before a client is ever constructed.
//!
//! The client is stateless apart from the base URL and credential. Operations
//! central to the caller's intent (creating a ticket, commenting, probing
//! connectivity) return errors; enrichment lookups (asset search, linking)
//! degrade to `None`/`false` with a warning so a catalog outage never blocks
//! ticket filing.

pub mod api;
pub mod client;
pub mod endpoint;
pub mod fields;
pub mod models;
pub mod query;

pub use api::{GatewayError, GatewayInitError, RtApi};
pub use client::RtClient;
pub use endpoint::{InvalidEndpoint, validate_endpoint};
