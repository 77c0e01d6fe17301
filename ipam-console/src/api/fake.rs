//! In-memory [`InventoryApi`] for unit tests

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use super::client::InventoryApi;
use super::collection::Collection;
use super::error::ApiError;
use super::models::{Device, DeviceRequest, IpAddressRequest, VlanRequest};

#[derive(Default)]
pub struct FakeApi {
    collections: HashMap<Collection, Vec<Value>>,
    failing_collections: HashMap<Collection, u16>,
    failing_names: HashSet<String>,
    fetch_delay: Option<Duration>,
    fetches: Mutex<Vec<Collection>>,
    created: Mutex<Vec<DeviceRequest>>,
    ip_requests: Mutex<Vec<IpAddressRequest>>,
    vlan_requests: Mutex<Vec<VlanRequest>>,
    next_id: AtomicUsize,
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            next_id: AtomicUsize::new(1000),
            ..Default::default()
        }
    }

    pub fn with_collection(mut self, collection: Collection, records: Vec<Value>) -> Self {
        self.collections.insert(collection, records);
        self
    }

    pub fn failing_collection(mut self, collection: Collection, status: u16) -> Self {
        self.failing_collections.insert(collection, status);
        self
    }

    /// Reject device creates whose name equals `name`
    pub fn failing_device(mut self, name: &str) -> Self {
        self.failing_names.insert(name.to_string());
        self
    }

    pub fn with_fetch_delay(mut self, delay: Duration) -> Self {
        self.fetch_delay = Some(delay);
        self
    }

    pub fn fetches(&self) -> Vec<Collection> {
        self.fetches.lock().unwrap().clone()
    }

    pub fn created(&self) -> Vec<DeviceRequest> {
        self.created.lock().unwrap().clone()
    }

    pub fn ip_requests(&self) -> Vec<IpAddressRequest> {
        self.ip_requests.lock().unwrap().clone()
    }

    pub fn vlan_requests(&self) -> Vec<VlanRequest> {
        self.vlan_requests.lock().unwrap().clone()
    }

    fn next_record(&self, name: &str) -> Value {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        json!({"id": id, "name": name})
    }
}

#[async_trait]
impl InventoryApi for FakeApi {
    async fn fetch_collection(&self, collection: Collection) -> Result<Vec<Value>, ApiError> {
        self.fetches.lock().unwrap().push(collection);
        if let Some(delay) = self.fetch_delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(status) = self.failing_collections.get(&collection) {
            return Err(ApiError::from_status(*status, String::new()));
        }
        Ok(self.collections.get(&collection).cloned().unwrap_or_default())
    }

    async fn create_device(&self, request: &DeviceRequest) -> Result<Value, ApiError> {
        self.created.lock().unwrap().push(request.clone());
        if self.failing_names.contains(&request.name) {
            return Err(ApiError::from_status(
                400,
                r#"{"name": ["device with this name already exists."]}"#.to_string(),
            ));
        }
        Ok(self.next_record(&request.name))
    }

    async fn create_ip_address(&self, request: &IpAddressRequest) -> Result<Value, ApiError> {
        self.ip_requests.lock().unwrap().push(request.clone());
        Ok(self.next_record(&request.address))
    }

    async fn create_vlan(&self, request: &VlanRequest) -> Result<Value, ApiError> {
        self.vlan_requests.lock().unwrap().push(request.clone());
        Ok(self.next_record(&request.name))
    }

    async fn get_device(&self, id: u64) -> Result<Device, ApiError> {
        let record = self
            .collections
            .get(&Collection::Devices)
            .and_then(|records| {
                records
                    .iter()
                    .find(|r| r.get("id").and_then(Value::as_u64) == Some(id))
            })
            .cloned()
            .ok_or_else(|| ApiError::from_status(404, r#"{"detail": "Not found."}"#.to_string()))?;
        Ok(serde_json::from_value(record)?)
    }

    async fn status(&self) -> Result<Value, ApiError> {
        Ok(json!({"netbox-version": "4.1.0"}))
    }
}
