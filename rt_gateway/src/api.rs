//! Service abstraction for the remote ticketing system.
//!
//! [`RtApi`] is the seam between the sync engines and the wire: engines take
//! `&dyn RtApi`, production hands them an [`crate::client::RtClient`], tests
//! hand them a scripted double. The error split follows the propagation
//! policy of the bridge: operations central to the caller's intent return
//! `Result`, enrichment lookups degrade to `Option`/`bool`.

use async_trait::async_trait;
use snafu::{Backtrace, Snafu};

use crate::models::{Asset, AssetProperties, AssetRef, NewTicket, TicketRef};

/// Errors that can occur while constructing a gateway instance.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum GatewayInitError {
    /// failed to init reqwest client
    #[snafu(display("Failed to build HTTP client: {source}"))]
    ClientBuild {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// API token contains invalid header characters.
    #[snafu(display("Invalid API token format: {source}"))]
    InvalidToken {
        source: reqwest::header::InvalidHeaderValue,
        backtrace: Backtrace,
    },
}

/// Errors surfaced by gateway operations that are expected to succeed.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum GatewayError {
    /// Transport-level failure reaching the service.
    #[snafu(display("Cannot connect to the ticketing service: {source}"))]
    Connect {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// The credential was rejected or lacks permission.
    #[snafu(display("Authentication failed: {message}"))]
    Auth {
        message: String,
        backtrace: Backtrace,
    },

    /// The service returned a non-success status for the operation.
    #[snafu(display("Service API error: {message}"))]
    Api {
        message: String,
        backtrace: Backtrace,
    },
}

/// Stateless operations against the remote ticketing service.
///
/// Soft operations (`search_asset`, `create_asset`, `update_asset`,
/// `link_ticket_to_asset`, `list_assets`, `get_asset`) log their failures and
/// return "absent"/"false" so that an asset-catalog outage never blocks the
/// ticket path, and so a single failing record never aborts a sweep.
#[async_trait]
pub trait RtApi: Send + Sync {
    /// Connectivity and credential check against a lightweight endpoint.
    async fn probe(&self) -> Result<(), GatewayError>;

    /// Open tickets in `queue` for a device, optionally filtered by subject.
    async fn search_tickets(
        &self,
        queue: &str,
        device_id: &str,
        subject: Option<&str>,
    ) -> Result<Vec<TicketRef>, GatewayError>;

    /// Open tickets in `queue` referring to an asset, optionally filtered by
    /// subject.
    async fn search_tickets_for_asset(
        &self,
        queue: &str,
        asset_id: u64,
        subject: Option<&str>,
    ) -> Result<Vec<TicketRef>, GatewayError>;

    /// First asset in `catalog` carrying `device_id`, if any.
    async fn search_asset(&self, catalog: &str, device_id: &str) -> Option<AssetRef>;

    /// Creates an asset, returning its new identifier.
    async fn create_asset(
        &self,
        catalog: &str,
        device_id: &str,
        props: &AssetProperties,
    ) -> Option<u64>;

    /// Overwrites the present fields of `props` on an existing asset.
    async fn update_asset(&self, asset_id: u64, props: &AssetProperties) -> bool;

    /// Creates a ticket, returning its new identifier.
    async fn create_ticket(&self, ticket: &NewTicket) -> Result<u64, GatewayError>;

    /// Appends a comment to an existing ticket.
    async fn add_comment(&self, ticket_id: u64, text: &str) -> Result<(), GatewayError>;

    /// Points the ticket's reference relationship at an asset.
    async fn link_ticket_to_asset(&self, ticket_id: u64, asset_id: u64) -> bool;

    /// Every active asset in `catalog` (the service excludes retired
    /// records from search results).
    async fn list_assets(&self, catalog: &str) -> Vec<AssetRef>;

    /// Full asset record, needed to read custom fields.
    async fn get_asset(&self, asset_id: u64) -> Option<Asset>;
}
