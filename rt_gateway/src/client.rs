//! Reqwest-backed implementation of [`RtApi`] against the REST 2.0 interface.

use async_trait::async_trait;
use indexmap::IndexMap;
use reqwest::{Client, StatusCode, header};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::json;
use snafu::{ResultExt, ensure};
use tracing::warn;

use crate::api::{
    ApiSnafu, AuthSnafu, ClientBuildSnafu, ConnectSnafu, GatewayError, GatewayInitError,
    InvalidTokenSnafu, RtApi,
};
use crate::fields::{ADDRESS_FIELD, AREA_FIELD, DEVICE_ID_FIELD, DEVICE_INFO_FIELD};
use crate::models::{Asset, AssetProperties, AssetRef, IdEnvelope, Items, NewTicket, TicketRef};
use crate::query;

/// HTTP client for the ticketing service.
///
/// Holds only the base URL and credential; every operation is a single HTTP
/// call. The base URL must already have passed
/// [`crate::endpoint::validate_endpoint`] — settings loading runs the
/// validator before any client is constructed, and again on every
/// configuration change.
pub struct RtClient {
    client: Client,
    base_url: String,
    _token: SecretString,
}

impl RtClient {
    /// Creates a client for the validated base URL `url`, authenticating
    /// with `token`.
    pub fn new(url: &str, token: SecretString) -> Result<Self, GatewayInitError> {
        let mut auth =
            header::HeaderValue::from_str(&format!("token {}", token.expose_secret()))
                .context(InvalidTokenSnafu)?;
        auth.set_sensitive(true);

        let mut headers = header::HeaderMap::new();
        headers.insert(header::AUTHORIZATION, auth);
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .context(ClientBuildSnafu)?;

        Ok(Self {
            client,
            base_url: url.trim_end_matches('/').to_string(),
            _token: token,
        })
    }

    /// The validated base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/REST/2.0/{path}", self.base_url)
    }

    /// Runs a search query and unwraps the list envelope.
    async fn search<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &str,
    ) -> Result<Vec<T>, GatewayError> {
        let response = self
            .client
            .get(self.url(endpoint))
            .query(&[("query", query)])
            .send()
            .await
            .context(ConnectSnafu)?;
        ensure!(
            response.status() == StatusCode::OK,
            ApiSnafu {
                message: format!("Search failed: {}", response.status().as_u16()),
            }
        );
        let data: Items<T> = response.json().await.map_err(decode_failure)?;
        Ok(data.items)
    }
}

fn decode_failure(err: reqwest::Error) -> GatewayError {
    ApiSnafu {
        message: format!("Invalid response body: {err}"),
    }
    .build()
}

async fn failure_text(response: reqwest::Response) -> String {
    response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown API error".to_string())
}

#[async_trait]
impl RtApi for RtClient {
    async fn probe(&self) -> Result<(), GatewayError> {
        let response = self
            .client
            .get(self.url("rt"))
            .send()
            .await
            .context(ConnectSnafu)?;
        match response.status() {
            StatusCode::OK => Ok(()),
            StatusCode::UNAUTHORIZED => AuthSnafu {
                message: "Invalid API token",
            }
            .fail(),
            StatusCode::FORBIDDEN => AuthSnafu {
                message: "API token lacks permissions",
            }
            .fail(),
            status => ApiSnafu {
                message: format!("RT API error: {}", status.as_u16()),
            }
            .fail(),
        }
    }

    async fn search_tickets(
        &self,
        queue: &str,
        device_id: &str,
        subject: Option<&str>,
    ) -> Result<Vec<TicketRef>, GatewayError> {
        let query = query::tickets_by_device(queue, device_id, subject);
        self.search("tickets", &query).await
    }

    async fn search_tickets_for_asset(
        &self,
        queue: &str,
        asset_id: u64,
        subject: Option<&str>,
    ) -> Result<Vec<TicketRef>, GatewayError> {
        let query = query::tickets_by_asset(queue, asset_id, subject);
        self.search("tickets", &query).await
    }

    async fn search_asset(&self, catalog: &str, device_id: &str) -> Option<AssetRef> {
        let query = query::assets_by_device(catalog, device_id);
        match self.search::<AssetRef>("assets", &query).await {
            Ok(items) => items.into_iter().next(),
            Err(err) => {
                warn!(catalog, device_id, error = %err, "Asset search failed");
                None
            }
        }
    }

    async fn create_asset(
        &self,
        catalog: &str,
        device_id: &str,
        props: &AssetProperties,
    ) -> Option<u64> {
        let mut custom_fields: IndexMap<&str, String> = IndexMap::new();
        custom_fields.insert(DEVICE_ID_FIELD, device_id.to_string());
        custom_fields.extend(props.custom_fields());

        let payload = json!({
            "Name": props.name.clone().unwrap_or_default(),
            "Catalog": catalog,
            "CustomFields": custom_fields,
        });

        match self.client.post(self.url("asset")).json(&payload).send().await {
            Ok(response) if response.status().is_success() => {
                match response.json::<IdEnvelope>().await {
                    Ok(envelope) => Some(envelope.id),
                    Err(err) => {
                        warn!(device_id, error = %err, "Asset create returned an unreadable body");
                        None
                    }
                }
            }
            Ok(response) => {
                let status = response.status().as_u16();
                let body = failure_text(response).await;
                warn!(device_id, status, %body, "Asset create failed");
                None
            }
            Err(err) => {
                warn!(device_id, error = %err, "Asset create error");
                None
            }
        }
    }

    async fn update_asset(&self, asset_id: u64, props: &AssetProperties) -> bool {
        let mut payload = serde_json::Map::new();
        if let Some(name) = &props.name {
            payload.insert("Name".to_string(), json!(name));
        }
        if let Some(status) = &props.status {
            payload.insert("Status".to_string(), json!(status));
        }
        let custom_fields = props.custom_fields();
        if !custom_fields.is_empty() {
            payload.insert("CustomFields".to_string(), json!(custom_fields));
        }

        match self
            .client
            .put(self.url(&format!("asset/{asset_id}")))
            .json(&payload)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                let status = response.status().as_u16();
                let body = failure_text(response).await;
                warn!(asset_id, status, %body, "Asset update failed");
                false
            }
            Err(err) => {
                warn!(asset_id, error = %err, "Asset update error");
                false
            }
        }
    }

    async fn create_ticket(&self, ticket: &NewTicket) -> Result<u64, GatewayError> {
        let mut custom_fields: IndexMap<&str, String> = IndexMap::new();
        custom_fields.insert(DEVICE_ID_FIELD, ticket.device_id.clone());
        if let Some(url) = &ticket.device_info_url {
            custom_fields.insert(DEVICE_INFO_FIELD, url.clone());
        }
        if let Some(area) = &ticket.area {
            custom_fields.insert(AREA_FIELD, area.clone());
        }
        if let Some(address) = &ticket.address {
            custom_fields.insert(ADDRESS_FIELD, address.clone());
        }

        let payload = json!({
            "Queue": ticket.queue,
            "Subject": ticket.subject,
            "Content": ticket.content(),
            "CustomFields": custom_fields,
        });

        let response = self
            .client
            .post(self.url("ticket"))
            .json(&payload)
            .send()
            .await
            .context(ConnectSnafu)?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = failure_text(response).await;
            return ApiSnafu {
                message: format!("Create failed: {status} - {body}"),
            }
            .fail();
        }
        let envelope: IdEnvelope = response.json().await.map_err(decode_failure)?;
        Ok(envelope.id)
    }

    async fn add_comment(&self, ticket_id: u64, text: &str) -> Result<(), GatewayError> {
        let response = self
            .client
            .post(self.url(&format!("ticket/{ticket_id}/comment")))
            .header(header::CONTENT_TYPE, "text/plain")
            .body(text.to_string())
            .send()
            .await
            .context(ConnectSnafu)?;
        ensure!(
            response.status().is_success(),
            ApiSnafu {
                message: format!("Comment failed: {}", response.status().as_u16()),
            }
        );
        Ok(())
    }

    async fn link_ticket_to_asset(&self, ticket_id: u64, asset_id: u64) -> bool {
        let payload = json!({ "RefersTo": format!("asset:{asset_id}") });
        match self
            .client
            .put(self.url(&format!("ticket/{ticket_id}")))
            .json(&payload)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                let status = response.status().as_u16();
                let body = failure_text(response).await;
                warn!(ticket_id, asset_id, status, %body, "Ticket link failed");
                false
            }
            Err(err) => {
                warn!(ticket_id, asset_id, error = %err, "Ticket link error");
                false
            }
        }
    }

    async fn list_assets(&self, catalog: &str) -> Vec<AssetRef> {
        let query = query::assets_in_catalog(catalog);
        match self.search::<AssetRef>("assets", &query).await {
            Ok(items) => items,
            Err(err) => {
                warn!(catalog, error = %err, "Asset listing failed");
                Vec::new()
            }
        }
    }

    async fn get_asset(&self, asset_id: u64) -> Option<Asset> {
        match self
            .client
            .get(self.url(&format!("asset/{asset_id}")))
            .send()
            .await
        {
            Ok(response) if response.status() == StatusCode::OK => {
                match response.json::<Asset>().await {
                    Ok(asset) => Some(asset),
                    Err(err) => {
                        warn!(asset_id, error = %err, "Asset detail returned an unreadable body");
                        None
                    }
                }
            }
            Ok(response) => {
                warn!(asset_id, status = response.status().as_u16(), "Asset fetch failed");
                None
            }
            Err(err) => {
                warn!(asset_id, error = %err, "Asset fetch error");
                None
            }
        }
    }
}
