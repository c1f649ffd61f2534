//! Lifecycle Dispatch
//!
//! Maps host resource type names onto the lifecycle handlers.

use super::error::{Diagnostic, ProviderError, ProviderResult};
use super::registry::{self, SchemaDef};
use super::{destinations, roles, sources, users, warehouses};
use crate::segment::SegmentClient;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Managed resource types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceType {
    Source,
    Destination,
    Warehouse,
    User,
}

impl ResourceType {
    pub const ALL: [ResourceType; 4] = [
        ResourceType::Source,
        ResourceType::Destination,
        ResourceType::Warehouse,
        ResourceType::User,
    ];

    pub fn parse(type_name: &str) -> ProviderResult<Self> {
        ResourceType::ALL
            .into_iter()
            .find(|resource_type| resource_type.as_str() == type_name)
            .ok_or_else(|| ProviderError::UnknownResourceType(type_name.to_string()))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Source => sources::TYPE_NAME,
            ResourceType::Destination => destinations::TYPE_NAME,
            ResourceType::Warehouse => warehouses::TYPE_NAME,
            ResourceType::User => users::TYPE_NAME,
        }
    }

    fn schema(&self) -> ProviderResult<&'static SchemaDef> {
        registry::get_resource(self.as_str())
            .ok_or_else(|| ProviderError::UnknownResourceType(self.as_str().to_string()))
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of comparing prior and planned state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Plan {
    pub changes: Vec<&'static str>,
    /// Subset of `changes` that cannot be applied in place
    pub requires_replace: Vec<&'static str>,
}

impl Plan {
    pub fn is_noop(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Validate a resource or data source configuration
pub fn validate(type_name: &str, config: &Value) -> ProviderResult<Vec<Diagnostic>> {
    let schema = registry::get_resource(type_name)
        .or_else(|| registry::get_data_source(type_name))
        .ok_or_else(|| ProviderError::UnknownResourceType(type_name.to_string()))?;
    Ok(registry::validate_config(schema, config))
}

fn ensure_valid(resource_type: ResourceType, config: &Value) -> ProviderResult<()> {
    let diagnostics = registry::validate_config(resource_type.schema()?, config);
    let errors: Vec<Diagnostic> = diagnostics.into_iter().filter(Diagnostic::is_error).collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ProviderError::Validation(errors))
    }
}

/// Compare prior and planned state without calling the API
pub fn plan(type_name: &str, prior: &Value, planned: &Value) -> ProviderResult<Plan> {
    let resource_type = ResourceType::parse(type_name)?;

    let changes = match resource_type {
        ResourceType::Source => sources::diff(prior, planned)?,
        ResourceType::Destination => destinations::diff(prior, planned)?,
        ResourceType::Warehouse => warehouses::diff(prior, planned)?,
        ResourceType::User => users::diff(prior, planned)?,
    };

    let force_new = resource_type.schema()?.force_new_attributes();
    let requires_replace = changes
        .iter()
        .copied()
        .filter(|attribute| force_new.contains(attribute))
        .collect();

    Ok(Plan {
        changes,
        requires_replace,
    })
}

pub async fn create(client: &SegmentClient, type_name: &str, planned: &Value) -> ProviderResult<Value> {
    let resource_type = ResourceType::parse(type_name)?;
    ensure_valid(resource_type, planned)?;
    tracing::info!("create: type={}", resource_type);

    match resource_type {
        ResourceType::Source => sources::create(client, planned).await,
        ResourceType::Destination => destinations::create(client, planned).await,
        ResourceType::Warehouse => warehouses::create(client, planned).await,
        ResourceType::User => users::create(client, planned).await,
    }
}

pub async fn read(client: &SegmentClient, type_name: &str, current: &Value) -> ProviderResult<Value> {
    let resource_type = ResourceType::parse(type_name)?;
    tracing::info!("read: type={}", resource_type);

    match resource_type {
        ResourceType::Source => sources::read(client, current).await,
        ResourceType::Destination => destinations::read(client, current).await,
        ResourceType::Warehouse => warehouses::read(client, current).await,
        ResourceType::User => users::read(client, current).await,
    }
}

pub async fn update(
    client: &SegmentClient,
    type_name: &str,
    prior: &Value,
    planned: &Value,
) -> ProviderResult<Value> {
    let resource_type = ResourceType::parse(type_name)?;
    ensure_valid(resource_type, planned)?;
    tracing::info!("update: type={}", resource_type);

    match resource_type {
        ResourceType::Source => sources::update(client, prior, planned).await,
        ResourceType::Destination => destinations::update(client, prior, planned).await,
        ResourceType::Warehouse => warehouses::update(client, prior, planned).await,
        ResourceType::User => users::update(client, prior, planned).await,
    }
}

pub async fn delete(client: &SegmentClient, type_name: &str, current: &Value) -> ProviderResult<()> {
    let resource_type = ResourceType::parse(type_name)?;
    tracing::info!("delete: type={}", resource_type);

    match resource_type {
        ResourceType::Source => sources::delete(client, current).await,
        ResourceType::Destination => destinations::delete(client, current).await,
        ResourceType::Warehouse => warehouses::delete(client, current).await,
        ResourceType::User => users::delete(client, current).await,
    }
}

pub async fn import(client: &SegmentClient, type_name: &str, id: &str) -> ProviderResult<Value> {
    let resource_type = ResourceType::parse(type_name)?;
    tracing::info!("import: type={}, id={}", resource_type, id);

    match resource_type {
        ResourceType::Source => sources::import(client, id).await,
        ResourceType::Destination => destinations::import(client, id).await,
        ResourceType::Warehouse => warehouses::import(client, id).await,
        ResourceType::User => users::import(client, id).await,
    }
}

/// Read a data source
pub async fn read_data_source(
    client: &SegmentClient,
    type_name: &str,
    config: &Value,
) -> ProviderResult<Value> {
    let schema = registry::get_data_source(type_name)
        .ok_or_else(|| ProviderError::UnknownResourceType(type_name.to_string()))?;

    let errors: Vec<Diagnostic> = registry::validate_config(schema, config)
        .into_iter()
        .filter(Diagnostic::is_error)
        .collect();
    if !errors.is_empty() {
        return Err(ProviderError::Validation(errors));
    }

    tracing::info!("read data source: type={}", type_name);
    match type_name {
        roles::TYPE_NAME => roles::read(client, config).await,
        _ => Err(ProviderError::UnknownResourceType(type_name.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resource_type_names() {
        for resource_type in ResourceType::ALL {
            assert_eq!(ResourceType::parse(resource_type.as_str()).unwrap(), resource_type);
            assert!(registry::get_resource(resource_type.as_str()).is_some());
        }
        assert!(matches!(
            ResourceType::parse("segment_tracking_plan"),
            Err(ProviderError::UnknownResourceType(_))
        ));
    }

    #[test]
    fn test_plan_flags_replacement() {
        let prior = json!({
            "id": "d1",
            "name": "GA",
            "enabled": true,
            "destination_slug": "google-analytics",
            "source_id": "s1",
            "settings": {}
        });
        let mut planned = prior.clone();
        planned["enabled"] = json!(false);
        planned["destination_slug"] = json!("mixpanel");

        let result = plan("segment_destination", &prior, &planned).unwrap();
        assert_eq!(result.changes, vec!["enabled", "destination_slug"]);
        assert_eq!(result.requires_replace, vec!["destination_slug"]);

        assert!(plan("segment_destination", &prior, &prior).unwrap().is_noop());
    }

    #[test]
    fn test_validate_covers_data_sources() {
        let diagnostics = validate("segment_role", &json!({})).unwrap();
        assert_eq!(diagnostics[0].attribute.as_deref(), Some("name"));
        assert!(validate("segment_nothing", &json!({})).is_err());
    }

    #[tokio::test]
    async fn test_invalid_config_never_reaches_the_api() {
        // Nothing listens here; validation must fail first
        let client = SegmentClient::new("http://127.0.0.1:9", "t").unwrap();
        let err = create(&client, "segment_source", &json!({"slug": "abcd"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Validation(_)));
    }
}
