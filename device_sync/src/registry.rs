//! Device and area model plus the registry interface.
//!
//! The registry is a read-only external collaborator: the engines look
//! devices up by identifier, enumerate them for sweeps, and resolve area
//! labels. [`StaticRegistry`] is the in-memory implementation used by the
//! CLI (fed from a TOML inventory) and by tests.

use indexmap::IndexMap;
use serde::Deserialize;

/// One tagged connection of a device, e.g. `("mac", "aa:bb:…")`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Connection {
    /// Connection type tag.
    #[serde(rename = "type")]
    pub kind: String,
    /// Connection value, e.g. the MAC address itself.
    pub value: String,
}

/// A device as reported by the registry.
///
/// `entry_type` is `None` for physical hardware; integrations, services and
/// other non-physical entries carry a tag and are excluded from asset sync.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Device {
    /// Stable unique identifier; assigned by the registry, never by us.
    #[serde(skip)]
    pub id: String,
    pub name: Option<String>,
    /// Operator-assigned name override; takes precedence over `name`.
    pub name_by_user: Option<String>,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub sw_version: Option<String>,
    pub hw_version: Option<String>,
    pub configuration_url: Option<String>,
    pub connections: Vec<Connection>,
    pub area_id: Option<String>,
    pub entry_type: Option<String>,
}

impl Device {
    /// Whether this entry describes physical hardware.
    pub fn is_physical(&self) -> bool {
        self.entry_type.is_none()
    }

    /// User override, then vendor-reported name, then the identifier.
    pub fn display_name(&self) -> &str {
        self.name_by_user
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or(&self.id)
    }

    /// First `mac`-typed connection value, if any.
    pub fn mac_address(&self) -> Option<&str> {
        self.connections
            .iter()
            .find(|c| c.kind == "mac")
            .map(|c| c.value.as_str())
    }
}

/// An area: identifier plus human-readable label.
#[derive(Debug, Clone)]
pub struct Area {
    pub id: String,
    pub name: String,
}

/// Change notification from the registry's event stream.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistryEvent {
    pub action: RegistryAction,
    pub device_id: String,
}

/// What happened to the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistryAction {
    Create,
    Update,
    Remove,
}

/// Read-only access to the device/area inventory.
///
/// Lookups are local in-memory reads; only the remote service is awaited.
pub trait DeviceRegistry: Send + Sync {
    /// The device with the given identifier, if known.
    fn device(&self, device_id: &str) -> Option<Device>;

    /// Every device known to the registry.
    fn devices(&self) -> Vec<Device>;

    /// The area with the given identifier, if known.
    fn area(&self, area_id: &str) -> Option<Area>;

    /// Base URL of the platform UI, when the registry can advertise one.
    /// Used to build device-information links in tickets.
    fn ui_base(&self) -> Option<String> {
        None
    }
}

/// In-memory registry over a fixed inventory.
#[derive(Debug, Default)]
pub struct StaticRegistry {
    devices: IndexMap<String, Device>,
    areas: IndexMap<String, String>,
    ui_base: Option<String>,
}

impl StaticRegistry {
    pub fn new(
        devices: IndexMap<String, Device>,
        areas: IndexMap<String, String>,
        ui_base: Option<String>,
    ) -> Self {
        Self {
            devices,
            areas,
            ui_base,
        }
    }

    /// Adds or replaces a device, keyed by its identifier.
    pub fn insert_device(&mut self, device: Device) {
        self.devices.insert(device.id.clone(), device);
    }

    /// Removes a device, returning whether it was present.
    pub fn remove_device(&mut self, device_id: &str) -> bool {
        self.devices.shift_remove(device_id).is_some()
    }

    /// Adds or replaces an area label.
    pub fn insert_area(&mut self, id: &str, name: &str) {
        self.areas.insert(id.to_string(), name.to_string());
    }
}

impl DeviceRegistry for StaticRegistry {
    fn device(&self, device_id: &str) -> Option<Device> {
        self.devices.get(device_id).cloned()
    }

    fn devices(&self) -> Vec<Device> {
        self.devices.values().cloned().collect()
    }

    fn area(&self, area_id: &str) -> Option<Area> {
        self.areas.get(area_id).map(|name| Area {
            id: area_id.to_string(),
            name: name.clone(),
        })
    }

    fn ui_base(&self) -> Option<String> {
        self.ui_base.clone()
    }
}
