//! Bridge settings and the TOML device inventory.
//!
//! Settings mirror what a deployment's connection form collects: service
//! base URL, queue, catalog, optional UI base URL and site address label,
//! and the sweep interval. [`BridgeSettings::validate`] runs the endpoint
//! validator on the base URL *before* any client is constructed, at load and
//! again whenever settings change.
//!
//! The inventory file describes devices and areas for deployments that
//! reconcile a file-described fleet (and for the CLI):
//!
//! ```toml
//! ui_base = "https://home.example.com"
//!
//! [areas]
//! cellar = "Cellar"
//!
//! [devices.dev-1]
//! name = "Boiler"
//! manufacturer = "Acme"
//! area_id = "cellar"
//!   [[devices.dev-1.connections]]
//!   type = "mac"
//!   value = "aa:bb:cc:dd:ee:ff"
//! ```

use anyhow::{Context, bail};
use indexmap::IndexMap;
use serde::Deserialize;

use rt_gateway::validate_endpoint;

use crate::registry::{Device, StaticRegistry};

/// Default ticket queue.
pub const DEFAULT_QUEUE: &str = "Facility Management";
/// Default asset catalog.
pub const DEFAULT_CATALOG: &str = "Devices";
/// Default full-sweep interval in hours.
pub const DEFAULT_SYNC_INTERVAL_HOURS: u32 = 1;

/// Connection and sync settings for one bridge instance.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BridgeSettings {
    /// Service base URL, e.g. `https://rt.example.com`.
    pub base_url: String,
    /// Ticket queue for filed tickets.
    #[serde(default = "default_queue")]
    pub queue: String,
    /// Asset catalog mirroring the device inventory.
    #[serde(default = "default_catalog")]
    pub catalog: String,
    /// UI base URL for device-information links; overrides whatever the
    /// registry advertises. Never fetched by the bridge, only embedded.
    #[serde(default)]
    pub ui_url: Option<String>,
    /// Site address label attached to tickets and assets.
    #[serde(default)]
    pub address: Option<String>,
    /// Hours between full sweeps (driven by an external timer).
    #[serde(default = "default_sync_interval")]
    pub sync_interval_hours: u32,
    /// Permit a plaintext endpoint. Test deployments only.
    #[serde(default)]
    pub allow_http: bool,
}

fn default_queue() -> String {
    DEFAULT_QUEUE.to_string()
}

fn default_catalog() -> String {
    DEFAULT_CATALOG.to_string()
}

fn default_sync_interval() -> u32 {
    DEFAULT_SYNC_INTERVAL_HOURS
}

impl BridgeSettings {
    /// Checks the endpoint policy and value ranges.
    pub fn validate(&self) -> anyhow::Result<()> {
        validate_endpoint(&self.base_url, self.allow_http)?;
        if !(1..=24).contains(&self.sync_interval_hours) {
            bail!(
                "sync_interval_hours must be within 1..=24, got {}",
                self.sync_interval_hours
            );
        }
        Ok(())
    }

    /// The site address, when configured non-empty.
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref().filter(|a| !a.is_empty())
    }
}

/// Parses and validates settings from a TOML string.
pub fn load_settings_str(raw: &str) -> anyhow::Result<BridgeSettings> {
    let settings: BridgeSettings =
        toml::from_str(raw).context("failed to parse bridge settings")?;
    settings.validate()?;
    Ok(settings)
}

/// Reads, parses, and validates settings from a TOML file.
pub fn load_settings_path(path: &str) -> anyhow::Result<BridgeSettings> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read settings file {path}"))?;
    load_settings_str(&raw)
}

/// TOML-described device inventory.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Inventory {
    /// Platform UI base URL advertised to the engines.
    #[serde(default)]
    pub ui_base: Option<String>,
    /// Area identifier → display label.
    #[serde(default)]
    pub areas: IndexMap<String, String>,
    /// Device identifier → device attributes.
    #[serde(default)]
    pub devices: IndexMap<String, Device>,
}

impl Inventory {
    /// Builds the in-memory registry, stamping each device with its key.
    pub fn into_registry(self) -> StaticRegistry {
        let devices = self
            .devices
            .into_iter()
            .map(|(id, mut device)| {
                device.id = id.clone();
                (id, device)
            })
            .collect();
        StaticRegistry::new(devices, self.areas, self.ui_base)
    }
}

/// Parses an inventory from a TOML string.
pub fn load_inventory_str(raw: &str) -> anyhow::Result<Inventory> {
    toml::from_str(raw).context("failed to parse device inventory")
}

/// Reads and parses an inventory from a TOML file.
pub fn load_inventory_path(path: &str) -> anyhow::Result<Inventory> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read inventory file {path}"))?;
    load_inventory_str(&raw)
}

#[cfg(test)]
mod tests {
    use crate::registry::DeviceRegistry;

    use super::*;

    #[test]
    fn settings_defaults_apply() {
        let settings =
            load_settings_str(r#"base_url = "https://rt.example.com""#).expect("load");
        assert_eq!(settings.queue, DEFAULT_QUEUE);
        assert_eq!(settings.catalog, DEFAULT_CATALOG);
        assert_eq!(settings.sync_interval_hours, 1);
        assert!(!settings.allow_http);
        assert_eq!(settings.address(), None);
    }

    #[test]
    fn settings_reject_unsafe_endpoint() {
        assert!(load_settings_str(r#"base_url = "http://rt.example.com""#).is_err());
        assert!(load_settings_str(r#"base_url = "https://10.0.0.5""#).is_err());
        let raw = "base_url = \"https://rt.example.com\"\nsync_interval_hours = 48\n";
        assert!(load_settings_str(raw).is_err());
    }

    #[test]
    fn settings_reject_unknown_keys() {
        let raw = "base_url = \"https://rt.example.com\"\nqueeu = \"typo\"\n";
        assert!(load_settings_str(raw).is_err());
    }

    #[test]
    fn inventory_round_trip() {
        let raw = r#"
ui_base = "https://home.example.com"

[areas]
cellar = "Cellar"

[devices.dev-1]
name = "Boiler"
manufacturer = "Acme"
area_id = "cellar"
  [[devices.dev-1.connections]]
  type = "mac"
  value = "aa:bb:cc:dd:ee:ff"

[devices.helper-1]
name = "Helper"
entry_type = "service"
"#;
        let registry = load_inventory_str(raw).expect("parse").into_registry();
        let boiler = registry.device("dev-1").expect("dev-1");
        assert_eq!(boiler.id, "dev-1");
        assert_eq!(boiler.display_name(), "Boiler");
        assert_eq!(boiler.mac_address(), Some("aa:bb:cc:dd:ee:ff"));
        assert!(boiler.is_physical());
        assert!(!registry.device("helper-1").expect("helper").is_physical());
        assert_eq!(registry.area("cellar").expect("area").name, "Cellar");
        assert_eq!(registry.ui_base(), Some("https://home.example.com".into()));
        assert_eq!(registry.devices().len(), 2);
    }
}
