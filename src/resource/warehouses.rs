//! `segment_warehouse` lifecycle
//!
//! The API never returns the warehouse password, so Read carries the last
//! known password over from the state it refreshes.

use super::error::ProviderResult;
use super::mappers::{from_api_warehouse_settings, to_api_warehouse_settings, WarehouseSettingsBlock};
use super::state;
use crate::segment::warehouses::{Warehouse, WarehouseRequest};
use crate::segment::{CatalogKind, SegmentClient};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const TYPE_NAME: &str = "segment_warehouse";

/// Host state of a warehouse
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WarehouseModel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub enabled: bool,
    pub warehouse_slug: String,
    pub settings: Vec<WarehouseSettingsBlock>,
}

impl WarehouseModel {
    fn from_api(warehouse: &Warehouse) -> ProviderResult<Self> {
        Ok(Self {
            id: Some(warehouse.id.clone()),
            name: warehouse.name.clone(),
            enabled: warehouse.enabled,
            warehouse_slug: warehouse.metadata.slug.clone(),
            settings: from_api_warehouse_settings(&warehouse.settings)?,
        })
    }

    fn password(&self) -> Option<&str> {
        self.settings
            .first()
            .map(|block| block.password.as_str())
            .filter(|password| !password.is_empty())
    }
}

pub fn changed_attributes(prior: &WarehouseModel, planned: &WarehouseModel) -> Vec<&'static str> {
    let mut changed = Vec::new();
    if prior.name != planned.name {
        changed.push("name");
    }
    if prior.enabled != planned.enabled {
        changed.push("enabled");
    }
    if prior.warehouse_slug != planned.warehouse_slug {
        changed.push("warehouse_slug");
    }
    if to_api_warehouse_settings(&prior.settings) != to_api_warehouse_settings(&planned.settings) {
        changed.push("settings");
    }
    changed
}

pub fn diff(prior: &Value, planned: &Value) -> ProviderResult<Vec<&'static str>> {
    let prior: WarehouseModel = state::decode(TYPE_NAME, prior)?;
    let planned: WarehouseModel = state::decode(TYPE_NAME, planned)?;
    Ok(changed_attributes(&prior, &planned))
}

async fn read_by_id(
    client: &SegmentClient,
    warehouse_id: &str,
    known_password: Option<&str>,
) -> ProviderResult<Value> {
    let warehouse = client.get_warehouse(warehouse_id).await?;
    let mut model = WarehouseModel::from_api(&warehouse)?;

    if let (Some(password), Some(block)) = (known_password, model.settings.first_mut()) {
        if block.password.is_empty() {
            block.password = password.to_string();
        }
    }

    state::encode(TYPE_NAME, &model)
}

pub async fn create(client: &SegmentClient, planned: &Value) -> ProviderResult<Value> {
    let model: WarehouseModel = state::decode(TYPE_NAME, planned)?;

    let metadata = client
        .resolve_by_slug(CatalogKind::Warehouses, &model.warehouse_slug)
        .await?;

    let request = WarehouseRequest {
        name: model.name.clone(),
        metadata_id: Some(metadata.id),
        enabled: model.enabled,
        settings: to_api_warehouse_settings(&model.settings),
    };
    let warehouse = client.create_warehouse(&request).await?;
    tracing::info!("created warehouse {} ({})", warehouse.id, model.warehouse_slug);

    read_by_id(client, &warehouse.id, model.password()).await
}

pub async fn read(client: &SegmentClient, current: &Value) -> ProviderResult<Value> {
    let model: WarehouseModel = state::decode(TYPE_NAME, current)?;
    let warehouse_id = state::require_id(TYPE_NAME, model.id.as_deref())?;
    read_by_id(client, warehouse_id, model.password()).await
}

pub async fn update(client: &SegmentClient, prior: &Value, planned: &Value) -> ProviderResult<Value> {
    let prior_model: WarehouseModel = state::decode(TYPE_NAME, prior)?;
    let planned_model: WarehouseModel = state::decode(TYPE_NAME, planned)?;
    let warehouse_id = state::require_id(TYPE_NAME, prior_model.id.as_deref())?;

    let changed = changed_attributes(&prior_model, &planned_model);
    let changed = state::in_place_changes(TYPE_NAME, &changed)?;
    if changed.is_empty() {
        tracing::debug!("warehouse {} unchanged", warehouse_id);
        return Ok(prior.clone());
    }

    let current = client.get_warehouse(warehouse_id).await?;
    let mut request = WarehouseRequest::from(&current);
    for attribute in &changed {
        match *attribute {
            "name" => request.name = planned_model.name.clone(),
            "enabled" => request.enabled = planned_model.enabled,
            "settings" => request.settings = to_api_warehouse_settings(&planned_model.settings),
            _ => {}
        }
    }

    client.update_warehouse(warehouse_id, &request).await?;
    tracing::info!("updated warehouse {}: {:?}", warehouse_id, changed);

    let password = planned_model.password().or(prior_model.password());
    read_by_id(client, warehouse_id, password).await
}

pub async fn delete(client: &SegmentClient, current: &Value) -> ProviderResult<()> {
    let model: WarehouseModel = state::decode(TYPE_NAME, current)?;
    let warehouse_id = state::require_id(TYPE_NAME, model.id.as_deref())?;
    client.delete_warehouse(warehouse_id).await?;
    tracing::info!("deleted warehouse {}", warehouse_id);
    Ok(())
}

/// The password cannot be imported; it stays empty until configured
pub async fn import(client: &SegmentClient, warehouse_id: &str) -> ProviderResult<Value> {
    read(client, &json!({ "id": warehouse_id })).await
}
