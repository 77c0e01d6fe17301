//! HTTP client for the inventory API

use std::collections::HashSet;
use std::future::Future;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::collection::{Collection, first_page_url};
use super::error::ApiError;
use super::models::{Device, DeviceRequest, IpAddressRequest, Page, VlanRequest};

/// Calls the rest of the application depends on.
///
/// Everything that needs the backend takes this trait rather than the concrete
/// client, so refresh cycles and bulk imports can run against an in-memory fake.
#[async_trait]
pub trait InventoryApi: Send + Sync {
    /// Fetch every record of a collection, following pagination to the end
    async fn fetch_collection(&self, collection: Collection) -> Result<Vec<Value>, ApiError>;

    /// Submit one device create-request, returning the created record
    async fn create_device(&self, request: &DeviceRequest) -> Result<Value, ApiError>;

    async fn create_ip_address(&self, request: &IpAddressRequest) -> Result<Value, ApiError>;

    async fn create_vlan(&self, request: &VlanRequest) -> Result<Value, ApiError>;

    /// Fetch a single device by its remote id
    async fn get_device(&self, id: u64) -> Result<Device, ApiError>;

    /// Validate the credentials against the status endpoint
    async fn status(&self) -> Result<Value, ApiError>;
}

/// Connection settings for [`InventoryClient`]
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub token: String,
    pub auth_scheme: String,
    pub page_size: usize,
}

/// reqwest-backed inventory client
#[derive(Debug, Clone)]
pub struct InventoryClient {
    http: reqwest::Client,
    settings: ClientSettings,
}

impl InventoryClient {
    pub fn new(settings: ClientSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            settings,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.settings.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.settings.base_url.trim_end_matches('/'), path)
    }

    fn auth_header(&self) -> String {
        format!("{} {}", self.settings.auth_scheme, self.settings.token)
    }

    async fn get_text(&self, url: &str) -> Result<String, ApiError> {
        debug!("GET {}", url);
        let response = self
            .http
            .get(url)
            .header(AUTHORIZATION, self.auth_header())
            .header(ACCEPT, "application/json")
            .send()
            .await?;
        read_body(response).await
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value, ApiError> {
        let url = self.url(path);
        debug!("POST {}", url);
        let response = self
            .http
            .post(&url)
            .header(AUTHORIZATION, self.auth_header())
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .json(body)
            .send()
            .await?;
        let text = read_body(response).await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }

    /// Fetch a collection and decode each record into `T`.
    ///
    /// Records that do not decode are dropped with a warning; the rest of the
    /// collection is still returned.
    pub async fn fetch_records<T: DeserializeOwned>(
        &self,
        collection: Collection,
    ) -> Result<Vec<T>, ApiError> {
        let raw = self.fetch_collection(collection).await?;
        Ok(decode_records(collection, raw))
    }

}

#[async_trait]
impl InventoryApi for InventoryClient {
    async fn fetch_collection(&self, collection: Collection) -> Result<Vec<Value>, ApiError> {
        let first = first_page_url(&self.settings.base_url, collection, self.settings.page_size);
        collect_pages(collection, first, |url| async move { self.get_text(&url).await }).await
    }

    async fn create_device(&self, request: &DeviceRequest) -> Result<Value, ApiError> {
        self.post(Collection::Devices.path(), request).await
    }

    async fn create_ip_address(&self, request: &IpAddressRequest) -> Result<Value, ApiError> {
        self.post(Collection::IpAddresses.path(), request).await
    }

    async fn create_vlan(&self, request: &VlanRequest) -> Result<Value, ApiError> {
        self.post(Collection::Vlans.path(), request).await
    }

    async fn get_device(&self, id: u64) -> Result<Device, ApiError> {
        let path = format!("{}{}/", Collection::Devices.path(), id);
        let text = self.get_text(&self.url(&path)).await?;
        Ok(serde_json::from_str(&text)?)
    }

    async fn status(&self) -> Result<Value, ApiError> {
        let text = self.get_text(&self.url("/api/status/")).await?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// Walk a paginated collection from `first`, following `next` links until
/// they run out or loop back.
///
/// Any failing page fails the whole walk; records of earlier pages are dropped.
pub async fn collect_pages<F, Fut>(
    collection: Collection,
    first: String,
    mut get: F,
) -> Result<Vec<Value>, ApiError>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<String, ApiError>>,
{
    let mut url = first;
    let mut seen = HashSet::new();
    let mut records = Vec::new();
    let mut expected = None;

    loop {
        seen.insert(url.clone());
        let text = get(url).await?;
        let page = decode_page(&text)?;
        expected = expected.or(page.count);
        records.extend(page.results);

        match page.next {
            Some(next) if !next.is_empty() => {
                if seen.contains(&next) {
                    warn!(
                        "Pagination for {} loops back to {}, stopping after {} records",
                        collection,
                        next,
                        records.len()
                    );
                    break;
                }
                url = next;
            }
            _ => break,
        }
    }

    match expected {
        Some(count) => debug!("Fetched {} of {} {}", records.len(), count, collection),
        None => debug!("Fetched {} {}", records.len(), collection),
    }
    Ok(records)
}

/// Read a response body, turning non-success statuses into errors
async fn read_body(response: reqwest::Response) -> Result<String, ApiError> {
    let status = response.status();
    let body = response.text().await?;
    check_status(status.as_u16(), body)
}

/// Classify a status code; the body is passed through on success
pub fn check_status(status: u16, body: String) -> Result<String, ApiError> {
    if (200..300).contains(&status) {
        Ok(body)
    } else {
        Err(ApiError::from_status(status, body))
    }
}

/// Decode one list envelope
pub fn decode_page(body: &str) -> Result<Page<Value>, ApiError> {
    serde_json::from_str(body).map_err(ApiError::from)
}

/// Decode raw records into typed rows, dropping the ones that do not fit
pub fn decode_records<T: DeserializeOwned>(collection: Collection, raw: Vec<Value>) -> Vec<T> {
    raw.into_iter()
        .enumerate()
        .filter_map(|(position, record)| match serde_json::from_value(record) {
            Ok(row) => Some(row),
            Err(e) => {
                warn!("Skipping {} record #{}: {}", collection, position, e);
                None
            }
        })
        .collect()
}
