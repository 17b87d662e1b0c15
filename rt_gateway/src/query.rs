//! Search-query construction for the remote service.
//!
//! The service's search language embeds string operands in double-quoted
//! literals. [`escape_query_value`] is the sole injection defense: every
//! caller- or device-supplied value must pass through it before being
//! interpolated, which is why the query builders live in this module and
//! nothing else assembles query strings.

use crate::fields::{DEVICE_ID_FIELD, OPEN_STATUSES};

/// Escapes a string for embedding in a double-quoted query literal.
///
/// Backslashes are escaped before quotes; swapping the order would
/// double-escape the backslash introduced for the quote.
///
/// Total for any input, including empty strings.
pub fn escape_query_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Disjunction of the open-status set, e.g. `(Status="new" OR ...)`.
fn open_status_clause() -> String {
    let alternatives: Vec<String> = OPEN_STATUSES
        .iter()
        .map(|s| format!("Status=\"{s}\""))
        .collect();
    format!("({})", alternatives.join(" OR "))
}

/// Query matching open tickets in `queue` carrying `device_id` in the
/// DeviceId custom field, optionally narrowed to an exact subject.
pub fn tickets_by_device(queue: &str, device_id: &str, subject: Option<&str>) -> String {
    let mut query = format!(
        "Queue=\"{}\" AND {} AND CF.{{{}}}=\"{}\"",
        escape_query_value(queue),
        open_status_clause(),
        DEVICE_ID_FIELD,
        escape_query_value(device_id),
    );
    if let Some(subject) = subject {
        query.push_str(&format!(" AND Subject=\"{}\"", escape_query_value(subject)));
    }
    query
}

/// Query matching open tickets in `queue` that refer to `asset_id`,
/// optionally narrowed to an exact subject.
pub fn tickets_by_asset(queue: &str, asset_id: u64, subject: Option<&str>) -> String {
    let mut query = format!(
        "Queue=\"{}\" AND {} AND RefersTo=\"asset:{}\"",
        escape_query_value(queue),
        open_status_clause(),
        asset_id,
    );
    if let Some(subject) = subject {
        query.push_str(&format!(" AND Subject=\"{}\"", escape_query_value(subject)));
    }
    query
}

/// Query matching assets in `catalog` carrying `device_id` in the DeviceId
/// custom field.
pub fn assets_by_device(catalog: &str, device_id: &str) -> String {
    format!(
        "Catalog=\"{}\" AND CF.{{{}}}=\"{}\"",
        escape_query_value(catalog),
        DEVICE_ID_FIELD,
        escape_query_value(device_id),
    )
}

/// Query matching every asset in `catalog`. The service excludes retired
/// records from search results, so this enumerates the active set.
pub fn assets_in_catalog(catalog: &str) -> String {
    format!("Catalog=\"{}\"", escape_query_value(catalog))
}
