//! `segment_source` lifecycle

use super::error::ProviderResult;
use super::mappers::{from_api_source_settings, to_api_source_settings, SourceSettingsBlock};
use super::state;
use crate::segment::sources::{CreateSourceRequest, Source, UpdateSourceRequest};
use crate::segment::{CatalogKind, SegmentClient};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const TYPE_NAME: &str = "segment_source";

/// Host state of a source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceModel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub slug: String,
    pub name: String,
    pub enabled: bool,
    pub source_slug: String,
    pub settings: Vec<SourceSettingsBlock>,
}

impl From<&Source> for SourceModel {
    fn from(source: &Source) -> Self {
        Self {
            id: Some(source.id.clone()),
            slug: source.slug.clone(),
            name: source.name.clone(),
            enabled: source.enabled,
            source_slug: source.metadata.slug.clone(),
            settings: from_api_source_settings(&source.settings),
        }
    }
}

/// Tracked attributes that differ between two states
pub fn changed_attributes(prior: &SourceModel, planned: &SourceModel) -> Vec<&'static str> {
    let mut changed = Vec::new();
    if prior.slug != planned.slug {
        changed.push("slug");
    }
    if prior.name != planned.name {
        changed.push("name");
    }
    if prior.enabled != planned.enabled {
        changed.push("enabled");
    }
    if prior.source_slug != planned.source_slug {
        changed.push("source_slug");
    }
    if to_api_source_settings(&prior.settings) != to_api_source_settings(&planned.settings) {
        changed.push("settings");
    }
    changed
}

pub fn diff(prior: &Value, planned: &Value) -> ProviderResult<Vec<&'static str>> {
    let prior: SourceModel = state::decode(TYPE_NAME, prior)?;
    let planned: SourceModel = state::decode(TYPE_NAME, planned)?;
    Ok(changed_attributes(&prior, &planned))
}

async fn read_by_id(client: &SegmentClient, source_id: &str) -> ProviderResult<Value> {
    let source = client.get_source(source_id).await?;
    state::encode(TYPE_NAME, &SourceModel::from(&source))
}

pub async fn create(client: &SegmentClient, planned: &Value) -> ProviderResult<Value> {
    let model: SourceModel = state::decode(TYPE_NAME, planned)?;

    let metadata = client
        .resolve_by_slug(CatalogKind::Sources, &model.source_slug)
        .await?;

    let request = CreateSourceRequest {
        slug: model.slug.clone(),
        name: model.name.clone(),
        enabled: model.enabled,
        metadata_id: metadata.id,
        settings: to_api_source_settings(&model.settings),
    };
    let source = client.create_source(&request).await?;
    tracing::info!("created source {} ({})", source.id, source.slug);

    read_by_id(client, &source.id).await
}

pub async fn read(client: &SegmentClient, current: &Value) -> ProviderResult<Value> {
    let model: SourceModel = state::decode(TYPE_NAME, current)?;
    let source_id = state::require_id(TYPE_NAME, model.id.as_deref())?;
    read_by_id(client, source_id).await
}

pub async fn update(client: &SegmentClient, prior: &Value, planned: &Value) -> ProviderResult<Value> {
    let prior_model: SourceModel = state::decode(TYPE_NAME, prior)?;
    let planned_model: SourceModel = state::decode(TYPE_NAME, planned)?;
    let source_id = state::require_id(TYPE_NAME, prior_model.id.as_deref())?;

    let changed = changed_attributes(&prior_model, &planned_model);
    let changed = state::in_place_changes(TYPE_NAME, &changed)?;
    if changed.is_empty() {
        tracing::debug!("source {} unchanged", source_id);
        return Ok(prior.clone());
    }

    let current = client.get_source(source_id).await?;
    let mut request = UpdateSourceRequest::from(&current);
    for attribute in &changed {
        match *attribute {
            "slug" => request.slug = planned_model.slug.clone(),
            "name" => request.name = planned_model.name.clone(),
            "enabled" => request.enabled = planned_model.enabled,
            "settings" => request.settings = to_api_source_settings(&planned_model.settings),
            _ => {}
        }
    }

    client.update_source(source_id, &request).await?;
    tracing::info!("updated source {}: {:?}", source_id, changed);

    read_by_id(client, source_id).await
}

pub async fn delete(client: &SegmentClient, current: &Value) -> ProviderResult<()> {
    let model: SourceModel = state::decode(TYPE_NAME, current)?;
    let source_id = state::require_id(TYPE_NAME, model.id.as_deref())?;
    client.delete_source(source_id).await?;
    tracing::info!("deleted source {}", source_id);
    Ok(())
}

pub async fn import(client: &SegmentClient, source_id: &str) -> ProviderResult<Value> {
    read(client, &json!({ "id": source_id })).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::mappers::TrackBlock;

    fn model() -> SourceModel {
        SourceModel {
            id: Some("s1".to_string()),
            slug: "abcd".to_string(),
            name: "ABCD".to_string(),
            enabled: false,
            source_slug: "facebook-ads".to_string(),
            settings: Vec::new(),
        }
    }

    #[test]
    fn test_default_settings_block_is_not_a_change() {
        let prior = model();
        let mut planned = model();
        planned.settings = from_api_source_settings(&Default::default());
        assert!(changed_attributes(&prior, &planned).is_empty());
    }

    #[test]
    fn test_changed_attributes() {
        let prior = model();
        let mut planned = model();
        planned.enabled = true;
        planned.source_slug = "javascript".to_string();
        planned.settings = vec![SourceSettingsBlock {
            track: vec![TrackBlock {
                allow_unplanned_events: true,
                ..Default::default()
            }],
            ..Default::default()
        }];
        assert_eq!(
            changed_attributes(&prior, &planned),
            vec!["enabled", "source_slug", "settings"]
        );
    }

    #[test]
    fn test_model_from_api_source() {
        let source: Source = serde_json::from_value(json!({
            "id": "s1",
            "slug": "abcd",
            "name": "ABCD",
            "enabled": false,
            "metadata": {"id": "m1", "slug": "facebook-ads"},
            "writeKeys": ["wk"],
            "settings": {}
        }))
        .unwrap();
        let host = serde_json::to_value(SourceModel::from(&source)).unwrap();
        assert_eq!(host["id"], "s1");
        assert_eq!(host["source_slug"], "facebook-ads");
        assert_eq!(host["settings"][0]["identify"].as_array().map(Vec::len), Some(1));
    }
}
