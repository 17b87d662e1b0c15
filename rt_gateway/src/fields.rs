//! Field names and status sets used on the remote service.
//!
//! Custom fields are the join keys between the local registry and the remote
//! records; the names here must match the fields configured on the service.

/// Custom field holding the registry device identifier (the join key).
pub const DEVICE_ID_FIELD: &str = "DeviceId";
/// Custom field holding a link to the device page in the local UI.
pub const DEVICE_INFO_FIELD: &str = "Device Information";
/// Custom field holding the human-readable area label.
pub const AREA_FIELD: &str = "Area";
/// Custom field holding the site address label.
pub const ADDRESS_FIELD: &str = "Address";

/// Asset attribute custom fields.
pub const MANUFACTURER_FIELD: &str = "Manufacturer";
pub const MODEL_FIELD: &str = "Model";
pub const SERIAL_FIELD: &str = "Serial Number";
pub const SW_VERSION_FIELD: &str = "Firmware Version";
pub const HW_VERSION_FIELD: &str = "Hardware Version";
pub const MAC_ADDRESS_FIELD: &str = "MAC Address";

/// Ticket statuses considered unresolved for deduplication purposes.
pub const OPEN_STATUSES: [&str; 3] = ["new", "open", "stalled"];

/// Asset status written when a device disappears from the registry.
pub const ASSET_STATUS_DELETED: &str = "deleted";
