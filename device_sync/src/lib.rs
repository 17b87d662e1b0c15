//! Reconciliation engines bridging a local device registry and a remote
//! ticketing service.
//!
//! ## What this does
//! - Mirrors physical devices into the service's asset catalog
//!   ([`sync`]): create-or-update per device, full-inventory sweeps, and
//!   orphan retirement for assets whose device disappeared.
//! - Files operational tickets with deduplication ([`ticket`]): a recurrence
//!   of the same (device, subject) appends a comment to the open ticket
//!   instead of opening a duplicate.
//! - Exposes the caller-facing surface through [`bridge::Bridge`], which owns
//!   the gateway, the registry handle, and the validated settings.
//!
//! ## Consistency
//! The remote store offers search-by-field only, no locking. Every decision
//! here is search-then-act: outcomes are stable and idempotent under retry,
//! but concurrent invocations for the same device may race and duplicate a
//! record. That limitation is accepted; see the crate-level tests for the
//! properties that *are* guaranteed.
//!
//! ## Failure policy
//! Per-device failures are tallied, never propagated, so one failing call
//! cannot abort a sweep. Ticket creation and commenting raise; asset lookups
//! and linking degrade with a logged warning.

pub mod bridge;
pub mod config;
pub mod registry;
pub mod sync;
pub mod ticket;
