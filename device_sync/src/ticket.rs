//! Ticket filing with deduplication.
//!
//! A (device, subject) occurrence maps to at most one open ticket: filing
//! searches the queue first and appends a comment to the first open match
//! instead of creating a duplicate. Device attributes, the area label, the
//! device-information link, and the linked asset are all best-effort
//! enrichments; only the search, create, and comment calls can fail the
//! operation.
//!
//! Idempotence holds as far as the remote search sees a prior create; two
//! concurrent filings for the same (device, subject) can race and open two
//! tickets.

use tracing::{debug, warn};

use rt_gateway::api::{GatewayError, RtApi};
use rt_gateway::models::NewTicket;

use crate::config::BridgeSettings;
use crate::registry::DeviceRegistry;

/// How the occurrence was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketAction {
    /// A new ticket was opened.
    Created,
    /// A comment was appended to an existing open ticket.
    Commented,
}

/// Result of filing an occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiledTicket {
    pub ticket_id: u64,
    /// Display URL for operators, on the service's UI.
    pub ticket_url: String,
    pub action: TicketAction,
}

/// Device-information link: operator-configured UI base wins, then whatever
/// the registry advertises; without either the field is omitted.
fn device_info_url<R: DeviceRegistry + ?Sized>(
    registry: &R,
    settings: &BridgeSettings,
    device_id: &str,
) -> Option<String> {
    let base = settings
        .ui_url
        .clone()
        .filter(|url| !url.is_empty())
        .or_else(|| registry.ui_base());
    match base {
        Some(base) => Some(format!("{}/devices/{device_id}", base.trim_end_matches('/'))),
        None => {
            warn!(device_id, "No UI base URL available, omitting device link");
            None
        }
    }
}

/// Files an occurrence of `subject` for `device_id`, deduplicating against
/// open tickets.
pub async fn file_ticket<G, R>(
    rt: &G,
    registry: &R,
    settings: &BridgeSettings,
    device_id: &str,
    subject: &str,
    text: &str,
) -> Result<FiledTicket, GatewayError>
where
    G: RtApi + ?Sized,
    R: DeviceRegistry + ?Sized,
{
    // Best-effort registry lookup: an unknown device still gets a ticket,
    // identified by its id alone.
    let device = registry.device(device_id);
    let device_name = device
        .as_ref()
        .map(|d| d.display_name().to_string())
        .unwrap_or_else(|| device_id.to_string());
    let area_name = device
        .as_ref()
        .and_then(|d| d.area_id.as_deref())
        .and_then(|id| registry.area(id))
        .map(|area| area.name);

    let info_url = device_info_url(registry, settings, device_id);

    let asset_id = match rt.search_asset(&settings.catalog, device_id).await {
        Some(asset) => {
            debug!(asset_id = asset.id, device_id, "Found asset for device");
            Some(asset.id)
        }
        None => {
            warn!(device_id, "Asset not found for device; run a sync");
            None
        }
    };

    // Dedup key: the linked asset when one resolved, the device id otherwise.
    let existing = match asset_id {
        Some(asset_id) => {
            rt.search_tickets_for_asset(&settings.queue, asset_id, Some(subject))
                .await?
        }
        None => {
            rt.search_tickets(&settings.queue, device_id, Some(subject))
                .await?
        }
    };

    let (ticket_id, action) = match existing.first() {
        Some(open_ticket) => {
            rt.add_comment(open_ticket.id, text).await?;
            debug!(ticket_id = open_ticket.id, %device_name, "Commented on open ticket");
            (open_ticket.id, TicketAction::Commented)
        }
        None => {
            let ticket = NewTicket {
                queue: settings.queue.clone(),
                subject: subject.to_string(),
                text: text.to_string(),
                device_id: device_id.to_string(),
                device_info_url: info_url,
                area: area_name.filter(|a| !a.is_empty()),
                address: settings.address().map(str::to_string),
            };
            let ticket_id = rt.create_ticket(&ticket).await?;
            if let Some(asset_id) = asset_id {
                if rt.link_ticket_to_asset(ticket_id, asset_id).await {
                    debug!(ticket_id, asset_id, "Linked ticket to asset");
                }
            }
            (ticket_id, TicketAction::Created)
        }
    };

    let ticket_url = format!(
        "{}/Ticket/Display.html?id={ticket_id}",
        settings.base_url.trim_end_matches('/')
    );

    Ok(FiledTicket {
        ticket_id,
        ticket_url,
        action,
    })
}
