//! Segment Warehouses
//!
//! Wire types and calls for `/warehouses`.

use super::client::{item_path, SegmentClient};
use super::error::ApiResult;
use super::models::Metadata;
use serde::{Deserialize, Serialize};

/// Connection settings of a warehouse
///
/// The API stores the port as a string and never echoes the password back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WarehouseSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Server-assigned
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ciphertext: Option<String>,
    /// Server-assigned copy of the warehouse name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A warehouse as returned by the API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Warehouse {
    pub id: String,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub workspace_id: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub settings: WarehouseSettings,
}

/// Body of `POST /warehouses` and `PATCH /warehouses/{id}`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WarehouseRequest {
    pub name: String,
    /// Only sent on create
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata_id: Option<String>,
    pub enabled: bool,
    pub settings: WarehouseSettings,
}

impl From<&Warehouse> for WarehouseRequest {
    fn from(warehouse: &Warehouse) -> Self {
        Self {
            name: warehouse.name.clone(),
            metadata_id: None,
            enabled: warehouse.enabled,
            settings: warehouse.settings.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WarehouseData {
    warehouse: Warehouse,
}

impl Warehouse {
    /// Some warehouse types only carry their name inside the settings
    fn with_settings_name_fallback(mut self) -> Self {
        if self.name.is_empty() {
            if let Some(name) = &self.settings.name {
                self.name = name.clone();
            }
        }
        self
    }
}

impl SegmentClient {
    pub async fn get_warehouse(&self, warehouse_id: &str) -> ApiResult<Warehouse> {
        let data: WarehouseData = self
            .get_data(&item_path("warehouses", warehouse_id), &[])
            .await?;
        Ok(data.warehouse.with_settings_name_fallback())
    }

    pub async fn create_warehouse(&self, request: &WarehouseRequest) -> ApiResult<Warehouse> {
        let data: WarehouseData = self.post_data("/warehouses", request).await?;
        Ok(data.warehouse)
    }

    pub async fn update_warehouse(
        &self,
        warehouse_id: &str,
        request: &WarehouseRequest,
    ) -> ApiResult<Warehouse> {
        let data: WarehouseData = self
            .patch_data(&item_path("warehouses", warehouse_id), request)
            .await?;
        Ok(data.warehouse)
    }

    pub async fn delete_warehouse(&self, warehouse_id: &str) -> ApiResult<()> {
        self.http.delete(&item_path("warehouses", warehouse_id)).await
    }
}
