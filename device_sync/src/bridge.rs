//! Caller-facing facade over the engines.
//!
//! One [`Bridge`] instance owns one validated configuration, the gateway
//! built for it, and the registry handle. Everything the external triggers
//! can do (a ticket request, a device-changed event, a timer tick, a manual
//! sweep) maps to one method here; there is no process-global lookup of "the
//! active client".

use tracing::{debug, error};

use rt_gateway::api::{GatewayError, RtApi};

use crate::config::BridgeSettings;
use crate::registry::{DeviceRegistry, RegistryAction, RegistryEvent};
use crate::sync::{self, SweepOptions, SyncOutcome, SyncReport};
use crate::ticket::{self, FiledTicket};

/// Bridge between one device registry and one ticketing-service deployment.
pub struct Bridge<G, R> {
    gateway: G,
    registry: R,
    settings: BridgeSettings,
}

impl<G, R> Bridge<G, R>
where
    G: RtApi,
    R: DeviceRegistry,
{
    /// Assembles a bridge. The settings are assumed validated (construction
    /// of the gateway already refuses an unvalidated endpoint).
    pub fn new(gateway: G, registry: R, settings: BridgeSettings) -> Self {
        Self {
            gateway,
            registry,
            settings,
        }
    }

    pub fn settings(&self) -> &BridgeSettings {
        &self.settings
    }

    /// Connectivity and credential check.
    pub async fn probe(&self) -> Result<(), GatewayError> {
        self.gateway.probe().await
    }

    /// Files (or appends to) a ticket for a device occurrence.
    pub async fn file_ticket(
        &self,
        device_id: &str,
        subject: &str,
        text: &str,
    ) -> Result<FiledTicket, GatewayError> {
        ticket::file_ticket(
            &self.gateway,
            &self.registry,
            &self.settings,
            device_id,
            subject,
            text,
        )
        .await
    }

    /// Syncs one device into the asset catalog.
    pub async fn sync_device(&self, device_id: &str) -> SyncOutcome {
        sync::sync_device(
            &self.gateway,
            &self.registry,
            &self.settings.catalog,
            device_id,
            self.settings.address(),
        )
        .await
    }

    /// Full-inventory sweep with optional orphan cleanup.
    pub async fn sync_all(&self, options: &SweepOptions) -> SyncReport {
        sync::sync_all(
            &self.gateway,
            &self.registry,
            &self.settings.catalog,
            self.settings.address(),
            options,
        )
        .await
    }

    /// Retires the asset of a removed device.
    pub async fn mark_removed(&self, device_id: &str) -> bool {
        sync::mark_asset_deleted(&self.gateway, &self.settings.catalog, device_id).await
    }

    /// Dispatches a registry change notification. Failures are logged and
    /// swallowed; event handling must never take down the event loop.
    pub async fn handle_event(&self, event: &RegistryEvent) {
        match event.action {
            RegistryAction::Create | RegistryAction::Update => {
                let outcome = self.sync_device(&event.device_id).await;
                if outcome == SyncOutcome::Failed {
                    error!(device_id = %event.device_id, ?event.action, "Failed to sync device after event");
                } else {
                    debug!(device_id = %event.device_id, ?event.action, ?outcome, "Synced device after event");
                }
            }
            RegistryAction::Remove => {
                self.mark_removed(&event.device_id).await;
            }
        }
    }
}
