//! Asset reconciliation: device inventory → remote catalog.
//!
//! ## What this does
//! - [`sync_device`] upserts one device into the catalog: search by the
//!   DeviceId join key, update when found, create when not. The update
//!   overwrites every attribute (including now-empty ones), so the same
//!   inputs always produce the same remote state.
//! - [`sync_all`] sweeps the whole registry sequentially, tallying outcomes;
//!   a failing device is counted and the sweep continues. Afterwards the
//!   orphan cleanup retires assets whose device is gone or no longer
//!   physical.
//! - [`mark_asset_deleted`] handles a removal notification for one device.
//!
//! Assets are retired by writing the `deleted` status, never hard-deleted.
//! There is no locking on the remote side: a concurrent sweep can race
//! search-then-create for the same device and duplicate an asset.

use std::collections::HashSet;

use tracing::{debug, error, info, warn};

use rt_gateway::api::RtApi;
use rt_gateway::fields::{ASSET_STATUS_DELETED, DEVICE_ID_FIELD};
use rt_gateway::models::AssetProperties;

use crate::registry::{Device, DeviceRegistry};

/// Outcome of syncing one device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Asset created or updated.
    Synced,
    /// Device unknown, or the remote write failed.
    Failed,
    /// Non-physical device, excluded from the catalog.
    Skipped,
}

/// Tallies of a full sweep.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    pub synced: usize,
    pub failed: usize,
    pub skipped: usize,
    pub deleted: usize,
}

/// Options for a full sweep.
pub struct SweepOptions {
    /// Retire orphaned assets after the sweep.
    pub cleanup: bool,
}

impl Default for SweepOptions {
    fn default() -> Self {
        Self { cleanup: true }
    }
}

/// The attribute set written for `device`. Missing attributes become empty
/// strings so an update clears stale remote values.
fn asset_properties<R: DeviceRegistry + ?Sized>(
    device: &Device,
    registry: &R,
    address: Option<&str>,
) -> AssetProperties {
    let area_name = device
        .area_id
        .as_deref()
        .and_then(|id| registry.area(id))
        .map(|area| area.name)
        .unwrap_or_default();

    AssetProperties {
        name: Some(device.display_name().to_string()),
        manufacturer: Some(device.manufacturer.clone().unwrap_or_default()),
        model: Some(device.model.clone().unwrap_or_default()),
        serial_number: Some(device.serial_number.clone().unwrap_or_default()),
        sw_version: Some(device.sw_version.clone().unwrap_or_default()),
        hw_version: Some(device.hw_version.clone().unwrap_or_default()),
        config_url: Some(device.configuration_url.clone().unwrap_or_default()),
        mac_address: Some(device.mac_address().unwrap_or_default().to_string()),
        area: Some(area_name),
        address: Some(address.unwrap_or_default().to_string()),
        status: None,
    }
}

/// Syncs a single device into the catalog.
pub async fn sync_device<G, R>(
    rt: &G,
    registry: &R,
    catalog: &str,
    device_id: &str,
    address: Option<&str>,
) -> SyncOutcome
where
    G: RtApi + ?Sized,
    R: DeviceRegistry + ?Sized,
{
    let Some(device) = registry.device(device_id) else {
        warn!(device_id, "Device not found");
        return SyncOutcome::Failed;
    };

    if !device.is_physical() {
        debug!(device_id, entry_type = ?device.entry_type, "Skipping non-physical device");
        return SyncOutcome::Skipped;
    }

    let props = asset_properties(&device, registry, address);

    match rt.search_asset(catalog, device_id).await {
        Some(existing) => {
            if rt.update_asset(existing.id, &props).await {
                debug!(asset_id = existing.id, device_id, "Updated asset");
                SyncOutcome::Synced
            } else {
                SyncOutcome::Failed
            }
        }
        None => match rt.create_asset(catalog, device_id, &props).await {
            Some(asset_id) => {
                debug!(asset_id, device_id, "Created asset");
                SyncOutcome::Synced
            }
            None => SyncOutcome::Failed,
        },
    }
}

/// Sweeps every registry device, then retires orphans.
pub async fn sync_all<G, R>(
    rt: &G,
    registry: &R,
    catalog: &str,
    address: Option<&str>,
    options: &SweepOptions,
) -> SyncReport
where
    G: RtApi + ?Sized,
    R: DeviceRegistry + ?Sized,
{
    let mut report = SyncReport::default();

    for device in registry.devices() {
        match sync_device(rt, registry, catalog, &device.id, address).await {
            SyncOutcome::Synced => report.synced += 1,
            SyncOutcome::Failed => {
                error!(device_id = %device.id, "Failed to sync device");
                report.failed += 1;
            }
            SyncOutcome::Skipped => report.skipped += 1,
        }
    }

    if options.cleanup {
        report.deleted = cleanup_orphaned_assets(rt, registry, catalog).await;
    }

    info!(
        synced = report.synced,
        failed = report.failed,
        skipped = report.skipped,
        deleted = report.deleted,
        "Asset sync complete"
    );
    report
}

/// Retires the asset of a removed device. Returns whether an asset was
/// found and updated.
pub async fn mark_asset_deleted<G>(rt: &G, catalog: &str, device_id: &str) -> bool
where
    G: RtApi + ?Sized,
{
    let Some(existing) = rt.search_asset(catalog, device_id).await else {
        debug!(device_id, "No asset found for removed device");
        return false;
    };

    let props = AssetProperties {
        status: Some(ASSET_STATUS_DELETED.to_string()),
        ..AssetProperties::default()
    };
    let success = rt.update_asset(existing.id, &props).await;

    if success {
        info!(asset_id = existing.id, device_id, "Marked asset as deleted");
    } else {
        warn!(asset_id = existing.id, device_id, "Failed to mark asset as deleted");
    }
    success
}

/// Retires catalog assets whose DeviceId is missing, unknown, or points at a
/// non-physical device. Each asset is handled independently; a failed detail
/// fetch skips only that asset. Returns the number retired.
pub async fn cleanup_orphaned_assets<G, R>(rt: &G, registry: &R, catalog: &str) -> usize
where
    G: RtApi + ?Sized,
    R: DeviceRegistry + ?Sized,
{
    let valid_device_ids: HashSet<String> = registry
        .devices()
        .into_iter()
        .filter(Device::is_physical)
        .map(|device| device.id)
        .collect();

    let retire = AssetProperties {
        status: Some(ASSET_STATUS_DELETED.to_string()),
        ..AssetProperties::default()
    };

    let mut deleted = 0;
    for asset_ref in rt.list_assets(catalog).await {
        let Some(asset) = rt.get_asset(asset_ref.id).await else {
            continue;
        };
        let device_id = asset.custom_field(DEVICE_ID_FIELD);
        // An asset with no join key cannot belong to any device; retire it
        // along with assets whose device is gone or no longer physical.
        if device_id.is_some_and(|id| valid_device_ids.contains(id)) {
            continue;
        }
        if rt.update_asset(asset.id, &retire).await {
            info!(
                asset_id = asset.id,
                device_id = device_id.unwrap_or("<none>"),
                "Marked asset as deleted (device missing or non-physical)"
            );
            deleted += 1;
        }
    }
    deleted
}
