//! `segment_destination` lifecycle

use super::error::ProviderResult;
use super::mappers::{from_api_destination_settings, to_api_destination_settings};
use super::state;
use crate::segment::destinations::{Destination, DestinationRequest};
use crate::segment::{CatalogKind, SegmentClient};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

pub const TYPE_NAME: &str = "segment_destination";

/// Host state of a destination
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DestinationModel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub enabled: bool,
    pub destination_slug: String,
    pub source_id: String,
    pub settings: BTreeMap<String, String>,
}

impl From<&Destination> for DestinationModel {
    fn from(destination: &Destination) -> Self {
        Self {
            id: Some(destination.id.clone()),
            name: destination.name.clone(),
            enabled: destination.enabled,
            destination_slug: destination.metadata.slug.clone(),
            source_id: destination.source_id.clone(),
            settings: from_api_destination_settings(&destination.settings),
        }
    }
}

pub fn changed_attributes(prior: &DestinationModel, planned: &DestinationModel) -> Vec<&'static str> {
    let mut changed = Vec::new();
    if prior.name != planned.name {
        changed.push("name");
    }
    if prior.enabled != planned.enabled {
        changed.push("enabled");
    }
    if prior.destination_slug != planned.destination_slug {
        changed.push("destination_slug");
    }
    if prior.source_id != planned.source_id {
        changed.push("source_id");
    }
    if prior.settings != planned.settings {
        changed.push("settings");
    }
    changed
}

pub fn diff(prior: &Value, planned: &Value) -> ProviderResult<Vec<&'static str>> {
    let prior: DestinationModel = state::decode(TYPE_NAME, prior)?;
    let planned: DestinationModel = state::decode(TYPE_NAME, planned)?;
    Ok(changed_attributes(&prior, &planned))
}

async fn read_by_id(client: &SegmentClient, destination_id: &str) -> ProviderResult<Value> {
    let destination = client.get_destination(destination_id).await?;
    state::encode(TYPE_NAME, &DestinationModel::from(&destination))
}

pub async fn create(client: &SegmentClient, planned: &Value) -> ProviderResult<Value> {
    let model: DestinationModel = state::decode(TYPE_NAME, planned)?;

    let metadata = client
        .resolve_by_slug(CatalogKind::Destinations, &model.destination_slug)
        .await?;

    let request = DestinationRequest {
        source_id: model.source_id.clone(),
        name: model.name.clone(),
        metadata_id: Some(metadata.id),
        enabled: model.enabled,
        settings: to_api_destination_settings(&model.settings),
    };
    let destination = client.create_destination(&request).await?;
    tracing::info!(
        "created destination {} on source {}",
        destination.id,
        model.source_id
    );

    read_by_id(client, &destination.id).await
}

pub async fn read(client: &SegmentClient, current: &Value) -> ProviderResult<Value> {
    let model: DestinationModel = state::decode(TYPE_NAME, current)?;
    let destination_id = state::require_id(TYPE_NAME, model.id.as_deref())?;
    read_by_id(client, destination_id).await
}

pub async fn update(client: &SegmentClient, prior: &Value, planned: &Value) -> ProviderResult<Value> {
    let prior_model: DestinationModel = state::decode(TYPE_NAME, prior)?;
    let planned_model: DestinationModel = state::decode(TYPE_NAME, planned)?;
    let destination_id = state::require_id(TYPE_NAME, prior_model.id.as_deref())?;

    let changed = changed_attributes(&prior_model, &planned_model);
    let changed = state::in_place_changes(TYPE_NAME, &changed)?;
    if changed.is_empty() {
        tracing::debug!("destination {} unchanged", destination_id);
        return Ok(prior.clone());
    }

    let current = client.get_destination(destination_id).await?;
    let mut request = DestinationRequest::from(&current);
    for attribute in &changed {
        match *attribute {
            "name" => request.name = planned_model.name.clone(),
            "enabled" => request.enabled = planned_model.enabled,
            "settings" => request.settings = to_api_destination_settings(&planned_model.settings),
            _ => {}
        }
    }

    client.update_destination(destination_id, &request).await?;
    tracing::info!("updated destination {}: {:?}", destination_id, changed);

    read_by_id(client, destination_id).await
}

pub async fn delete(client: &SegmentClient, current: &Value) -> ProviderResult<()> {
    let model: DestinationModel = state::decode(TYPE_NAME, current)?;
    let destination_id = state::require_id(TYPE_NAME, model.id.as_deref())?;
    client.delete_destination(destination_id).await?;
    tracing::info!("deleted destination {}", destination_id);
    Ok(())
}

pub async fn import(client: &SegmentClient, destination_id: &str) -> ProviderResult<Value> {
    read(client, &json!({ "id": destination_id })).await
}
