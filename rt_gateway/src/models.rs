//! Wire types for the remote service's REST interface.

use indexmap::IndexMap;
use serde::Deserialize;

use crate::fields::{
    ADDRESS_FIELD, AREA_FIELD, DEVICE_INFO_FIELD, HW_VERSION_FIELD, MAC_ADDRESS_FIELD,
    MANUFACTURER_FIELD, MODEL_FIELD, SERIAL_FIELD, SW_VERSION_FIELD,
};

/// List envelope returned by the search endpoints.
#[derive(Debug, Deserialize)]
pub struct Items<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

/// Identifier envelope returned by the create endpoints.
#[derive(Debug, Deserialize)]
pub struct IdEnvelope {
    pub id: u64,
}

/// A ticket search hit. Search results carry references, not full records;
/// matches arrive in the service's order (lowest id first).
#[derive(Debug, Clone, Deserialize)]
pub struct TicketRef {
    pub id: u64,
}

/// An asset search hit.
#[derive(Debug, Clone, Deserialize)]
pub struct AssetRef {
    pub id: u64,
}

/// One custom-field entry on a full record: a name and its values.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomField {
    pub name: String,
    #[serde(default)]
    pub values: Vec<String>,
}

/// A full asset record as returned by the detail endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Asset {
    pub id: u64,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "Status", default)]
    pub status: String,
    #[serde(rename = "CustomFields", default)]
    pub custom_fields: Vec<CustomField>,
}

impl Asset {
    /// First value of the named custom field, if present and non-empty.
    pub fn custom_field(&self, name: &str) -> Option<&str> {
        self.custom_fields
            .iter()
            .find(|cf| cf.name == name)
            .and_then(|cf| cf.values.first())
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

/// Optional attribute set written onto an asset. Only present fields are
/// sent; `name` and `status` are top-level record fields, everything else
/// lands in the custom-field bag.
#[derive(Debug, Clone, Default)]
pub struct AssetProperties {
    pub name: Option<String>,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub sw_version: Option<String>,
    pub hw_version: Option<String>,
    pub config_url: Option<String>,
    pub mac_address: Option<String>,
    pub area: Option<String>,
    pub address: Option<String>,
    pub status: Option<String>,
}

impl AssetProperties {
    /// The custom-field portion of the attribute set, in declaration order.
    pub fn custom_fields(&self) -> IndexMap<&'static str, String> {
        let mut fields = IndexMap::new();
        let pairs = [
            (MANUFACTURER_FIELD, &self.manufacturer),
            (MODEL_FIELD, &self.model),
            (SERIAL_FIELD, &self.serial_number),
            (SW_VERSION_FIELD, &self.sw_version),
            (HW_VERSION_FIELD, &self.hw_version),
            (DEVICE_INFO_FIELD, &self.config_url),
            (MAC_ADDRESS_FIELD, &self.mac_address),
            (AREA_FIELD, &self.area),
            (ADDRESS_FIELD, &self.address),
        ];
        for (field, value) in pairs {
            if let Some(value) = value {
                fields.insert(field, value.clone());
            }
        }
        fields
    }
}

/// Parameters for creating a ticket. Optional fields are omitted from the
/// payload when `None`.
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub queue: String,
    pub subject: String,
    pub text: String,
    pub device_id: String,
    pub device_info_url: Option<String>,
    pub area: Option<String>,
    pub address: Option<String>,
}

impl NewTicket {
    /// Ticket body: the free text, then a blank line and `Location:`/`Area:`
    /// lines when a location is known.
    pub fn content(&self) -> String {
        let mut parts = vec![self.text.clone()];
        if self.area.is_some() || self.address.is_some() {
            parts.push(String::new());
            if let Some(address) = &self.address {
                parts.push(format!("Location: {address}"));
            }
            if let Some(area) = &self.area {
                parts.push(format!("Area: {area}"));
            }
        }
        parts.join("\n")
    }
}
