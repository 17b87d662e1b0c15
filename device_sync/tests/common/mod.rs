#![allow(dead_code)]

//! Scripted in-memory stand-in for the remote service, plus fixtures.
//!
//! `MockRt` models the documented remote behavior the engines rely on:
//! searches see prior creates, retired assets disappear from search and
//! listing results, and failure knobs let tests script partial outages.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use indexmap::IndexMap;

use device_sync::config::BridgeSettings;
use device_sync::registry::{Connection, Device, StaticRegistry};
use rt_gateway::api::{GatewayError, RtApi};
use rt_gateway::fields::{ASSET_STATUS_DELETED, DEVICE_ID_FIELD, OPEN_STATUSES};
use rt_gateway::models::{Asset, AssetProperties, AssetRef, CustomField, NewTicket, TicketRef};

#[derive(Debug, Clone)]
pub struct StoredAsset {
    pub id: u64,
    pub catalog: String,
    pub name: String,
    pub status: String,
    pub custom_fields: IndexMap<String, String>,
}

impl StoredAsset {
    pub fn device_id(&self) -> Option<&str> {
        self.custom_fields.get(DEVICE_ID_FIELD).map(String::as_str)
    }

    fn is_active(&self) -> bool {
        self.status != ASSET_STATUS_DELETED
    }

    fn apply(&mut self, props: &AssetProperties) {
        if let Some(name) = &props.name {
            self.name = name.clone();
        }
        if let Some(status) = &props.status {
            self.status = status.clone();
        }
        for (field, value) in props.custom_fields() {
            self.custom_fields.insert(field.to_string(), value);
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoredTicket {
    pub id: u64,
    pub queue: String,
    pub subject: String,
    pub status: String,
    pub content: String,
    pub custom_fields: IndexMap<String, String>,
    pub asset_ref: Option<u64>,
    pub comments: Vec<String>,
}

#[derive(Debug, Default)]
pub struct State {
    next_id: u64,
    pub assets: Vec<StoredAsset>,
    pub tickets: Vec<StoredTicket>,
    pub calls: Vec<String>,
    /// Device ids whose asset create fails.
    pub fail_create_asset_for: HashSet<String>,
    /// All asset updates fail.
    pub fail_update_asset: bool,
    /// Asset search is unavailable (degrades to not-found).
    pub fail_search_asset: bool,
    /// Ticket↔asset linking fails.
    pub fail_link: bool,
    /// Asset ids whose detail fetch fails.
    pub unreadable_assets: HashSet<u64>,
}

impl State {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    pub fn asset(&self, asset_id: u64) -> Option<&StoredAsset> {
        self.assets.iter().find(|a| a.id == asset_id)
    }

    pub fn asset_for_device(&self, device_id: &str) -> Option<&StoredAsset> {
        self.assets
            .iter()
            .find(|a| a.device_id() == Some(device_id))
    }

    pub fn count_calls(&self, prefix: &str) -> usize {
        self.calls.iter().filter(|c| c.starts_with(prefix)).count()
    }
}

/// Scripted [`RtApi`] double sharing its state with the test body.
#[derive(Clone, Default)]
pub struct MockRt {
    state: Arc<Mutex<State>>,
}

impl MockRt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("mock state")
    }

    /// Seeds an asset record, returning its identifier.
    pub fn seed_asset(&self, catalog: &str, device_id: Option<&str>, name: &str) -> u64 {
        let mut state = self.state();
        let id = state.next_id();
        let mut custom_fields = IndexMap::new();
        if let Some(device_id) = device_id {
            custom_fields.insert(DEVICE_ID_FIELD.to_string(), device_id.to_string());
        }
        state.assets.push(StoredAsset {
            id,
            catalog: catalog.to_string(),
            name: name.to_string(),
            status: "active".to_string(),
            custom_fields,
        });
        id
    }
}

#[async_trait]
impl RtApi for MockRt {
    async fn probe(&self) -> Result<(), GatewayError> {
        self.state().calls.push("probe".to_string());
        Ok(())
    }

    async fn search_tickets(
        &self,
        queue: &str,
        device_id: &str,
        subject: Option<&str>,
    ) -> Result<Vec<TicketRef>, GatewayError> {
        let mut state = self.state();
        state.calls.push(format!("search_tickets {device_id}"));
        Ok(state
            .tickets
            .iter()
            .filter(|t| {
                t.queue == queue
                    && OPEN_STATUSES.contains(&t.status.as_str())
                    && t.custom_fields.get(DEVICE_ID_FIELD).map(String::as_str) == Some(device_id)
                    && subject.is_none_or(|s| t.subject == s)
            })
            .map(|t| TicketRef { id: t.id })
            .collect())
    }

    async fn search_tickets_for_asset(
        &self,
        queue: &str,
        asset_id: u64,
        subject: Option<&str>,
    ) -> Result<Vec<TicketRef>, GatewayError> {
        let mut state = self.state();
        state.calls.push(format!("search_tickets_for_asset {asset_id}"));
        Ok(state
            .tickets
            .iter()
            .filter(|t| {
                t.queue == queue
                    && OPEN_STATUSES.contains(&t.status.as_str())
                    && t.asset_ref == Some(asset_id)
                    && subject.is_none_or(|s| t.subject == s)
            })
            .map(|t| TicketRef { id: t.id })
            .collect())
    }

    async fn search_asset(&self, catalog: &str, device_id: &str) -> Option<AssetRef> {
        let mut state = self.state();
        state.calls.push(format!("search_asset {device_id}"));
        if state.fail_search_asset {
            return None;
        }
        state
            .assets
            .iter()
            .find(|a| a.catalog == catalog && a.is_active() && a.device_id() == Some(device_id))
            .map(|a| AssetRef { id: a.id })
    }

    async fn create_asset(
        &self,
        catalog: &str,
        device_id: &str,
        props: &AssetProperties,
    ) -> Option<u64> {
        let mut state = self.state();
        state.calls.push(format!("create_asset {device_id}"));
        if state.fail_create_asset_for.contains(device_id) {
            return None;
        }
        let id = state.next_id();
        let mut asset = StoredAsset {
            id,
            catalog: catalog.to_string(),
            name: String::new(),
            status: "active".to_string(),
            custom_fields: IndexMap::from([(
                DEVICE_ID_FIELD.to_string(),
                device_id.to_string(),
            )]),
        };
        asset.apply(props);
        state.assets.push(asset);
        Some(id)
    }

    async fn update_asset(&self, asset_id: u64, props: &AssetProperties) -> bool {
        let mut state = self.state();
        state.calls.push(format!("update_asset {asset_id}"));
        if state.fail_update_asset {
            return false;
        }
        match state.assets.iter_mut().find(|a| a.id == asset_id) {
            Some(asset) => {
                asset.apply(props);
                true
            }
            None => false,
        }
    }

    async fn create_ticket(&self, ticket: &NewTicket) -> Result<u64, GatewayError> {
        let mut state = self.state();
        state.calls.push(format!("create_ticket {}", ticket.device_id));
        let id = state.next_id();
        let mut custom_fields = IndexMap::from([(
            DEVICE_ID_FIELD.to_string(),
            ticket.device_id.clone(),
        )]);
        if let Some(url) = &ticket.device_info_url {
            custom_fields.insert("Device Information".to_string(), url.clone());
        }
        if let Some(area) = &ticket.area {
            custom_fields.insert("Area".to_string(), area.clone());
        }
        if let Some(address) = &ticket.address {
            custom_fields.insert("Address".to_string(), address.clone());
        }
        state.tickets.push(StoredTicket {
            id,
            queue: ticket.queue.clone(),
            subject: ticket.subject.clone(),
            status: "new".to_string(),
            content: ticket.content(),
            custom_fields,
            asset_ref: None,
            comments: Vec::new(),
        });
        Ok(id)
    }

    async fn add_comment(&self, ticket_id: u64, text: &str) -> Result<(), GatewayError> {
        let mut state = self.state();
        state.calls.push(format!("add_comment {ticket_id}"));
        if let Some(ticket) = state.tickets.iter_mut().find(|t| t.id == ticket_id) {
            ticket.comments.push(text.to_string());
        }
        Ok(())
    }

    async fn link_ticket_to_asset(&self, ticket_id: u64, asset_id: u64) -> bool {
        let mut state = self.state();
        state.calls.push(format!("link {ticket_id}->{asset_id}"));
        if state.fail_link {
            return false;
        }
        match state.tickets.iter_mut().find(|t| t.id == ticket_id) {
            Some(ticket) => {
                ticket.asset_ref = Some(asset_id);
                true
            }
            None => false,
        }
    }

    async fn list_assets(&self, catalog: &str) -> Vec<AssetRef> {
        let mut state = self.state();
        state.calls.push("list_assets".to_string());
        state
            .assets
            .iter()
            .filter(|a| a.catalog == catalog && a.is_active())
            .map(|a| AssetRef { id: a.id })
            .collect()
    }

    async fn get_asset(&self, asset_id: u64) -> Option<Asset> {
        let mut state = self.state();
        state.calls.push(format!("get_asset {asset_id}"));
        if state.unreadable_assets.contains(&asset_id) {
            return None;
        }
        state.asset(asset_id).map(|a| Asset {
            id: a.id,
            name: a.name.clone(),
            status: a.status.clone(),
            custom_fields: a
                .custom_fields
                .iter()
                .map(|(name, value)| CustomField {
                    name: name.clone(),
                    values: vec![value.clone()],
                })
                .collect(),
        })
    }
}

/// Settings pointing at a fictional deployment.
pub fn settings() -> BridgeSettings {
    BridgeSettings {
        base_url: "https://rt.example.com".to_string(),
        queue: "Facilities".to_string(),
        catalog: "Devices".to_string(),
        ui_url: Some("https://home.example.com".to_string()),
        address: Some("Main St 1".to_string()),
        sync_interval_hours: 1,
        allow_http: false,
    }
}

/// A boiler in the cellar plus a non-physical helper entry.
pub fn boiler_registry() -> StaticRegistry {
    let mut registry = StaticRegistry::default();
    registry.insert_area("cellar", "Cellar");
    registry.insert_device(Device {
        id: "dev-1".to_string(),
        name: Some("Boiler".to_string()),
        manufacturer: Some("Acme".to_string()),
        model: Some("W100".to_string()),
        serial_number: Some("SN001".to_string()),
        sw_version: Some("1.0".to_string()),
        hw_version: Some("2.0".to_string()),
        configuration_url: Some("http://10.0.0.9/setup".to_string()),
        connections: vec![Connection {
            kind: "mac".to_string(),
            value: "aa:bb:cc:dd:ee:ff".to_string(),
        }],
        area_id: Some("cellar".to_string()),
        ..Device::default()
    });
    registry.insert_device(Device {
        id: "helper-1".to_string(),
        name: Some("Helper".to_string()),
        entry_type: Some("service".to_string()),
        ..Device::default()
    });
    registry
}
