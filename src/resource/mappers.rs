//! Settings mappers
//!
//! Pure conversions between the host's block representation (an optional
//! structured block is a list holding at most one object) and the nested
//! settings objects the Segment API speaks.

use super::error::{ProviderError, ProviderResult};
use crate::segment::sources::{SourceSettings, TrackSettings, TraitSettings, ViolationPolicy};
use crate::segment::warehouses::WarehouseSettings;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

// =============================================================================
// Host blocks
// =============================================================================

/// `settings` block of a source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSettingsBlock {
    pub forwarding_violations_to: String,
    pub forwarding_blocked_events_to: String,
    pub track: Vec<TrackBlock>,
    pub identify: Vec<TraitsBlock>,
    pub group: Vec<TraitsBlock>,
}

/// `settings.track` block of a source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackBlock {
    pub allow_unplanned_events: bool,
    pub allow_unplanned_event_properties: bool,
    pub allow_event_on_violations: bool,
    pub allow_properties_on_violations: bool,
    #[serde(with = "policy_or_empty")]
    pub common_event_on_violations: Option<ViolationPolicy>,
}

/// `settings.identify` and `settings.group` blocks of a source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraitsBlock {
    pub allow_unplanned_traits: bool,
    pub allow_traits_on_violations: bool,
    #[serde(with = "policy_or_empty")]
    pub common_event_on_violations: Option<ViolationPolicy>,
}

/// `settings` block of a warehouse
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WarehouseSettingsBlock {
    pub hostname: String,
    pub database: String,
    pub port: Option<u16>,
    pub username: String,
    pub password: String,
    /// Computed
    pub ciphertext: String,
    /// Computed
    pub name: String,
}

/// The host writes an unset policy as the empty string
mod policy_or_empty {
    use crate::segment::sources::ViolationPolicy;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        policy: &Option<ViolationPolicy>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(policy.as_ref().map(ViolationPolicy::as_str).unwrap_or(""))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<ViolationPolicy>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(s) if s.is_empty() => Ok(None),
            Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

// =============================================================================
// Sources
// =============================================================================

/// Host source settings to the API shape; missing blocks mean defaults
pub fn to_api_source_settings(blocks: &[SourceSettingsBlock]) -> SourceSettings {
    let Some(block) = blocks.first() else {
        return SourceSettings::default();
    };

    let track = block.track.first().cloned().unwrap_or_default();
    let identify = block.identify.first().cloned().unwrap_or_default();
    let group = block.group.first().cloned().unwrap_or_default();

    SourceSettings {
        forwarding_violations_to: non_empty(&block.forwarding_violations_to),
        forwarding_blocked_events_to: non_empty(&block.forwarding_blocked_events_to),
        track: TrackSettings {
            allow_unplanned_events: track.allow_unplanned_events,
            allow_unplanned_event_properties: track.allow_unplanned_event_properties,
            allow_event_on_violations: track.allow_event_on_violations,
            allow_properties_on_violations: track.allow_properties_on_violations,
            common_event_on_violations: track.common_event_on_violations,
        },
        identify: traits_to_api(&identify),
        group: traits_to_api(&group),
    }
}

/// API source settings to host blocks; always exactly one of each block
pub fn from_api_source_settings(settings: &SourceSettings) -> Vec<SourceSettingsBlock> {
    let track = &settings.track;
    vec![SourceSettingsBlock {
        forwarding_violations_to: settings.forwarding_violations_to.clone().unwrap_or_default(),
        forwarding_blocked_events_to: settings
            .forwarding_blocked_events_to
            .clone()
            .unwrap_or_default(),
        track: vec![TrackBlock {
            allow_unplanned_events: track.allow_unplanned_events,
            allow_unplanned_event_properties: track.allow_unplanned_event_properties,
            allow_event_on_violations: track.allow_event_on_violations,
            allow_properties_on_violations: track.allow_properties_on_violations,
            common_event_on_violations: track.common_event_on_violations,
        }],
        identify: vec![traits_from_api(&settings.identify)],
        group: vec![traits_from_api(&settings.group)],
    }]
}

fn traits_to_api(block: &TraitsBlock) -> TraitSettings {
    TraitSettings {
        allow_unplanned_traits: block.allow_unplanned_traits,
        allow_traits_on_violations: block.allow_traits_on_violations,
        common_event_on_violations: block.common_event_on_violations,
    }
}

fn traits_from_api(settings: &TraitSettings) -> TraitsBlock {
    TraitsBlock {
        allow_unplanned_traits: settings.allow_unplanned_traits,
        allow_traits_on_violations: settings.allow_traits_on_violations,
        common_event_on_violations: settings.common_event_on_violations,
    }
}

// =============================================================================
// Destinations
// =============================================================================

/// Host destination settings to the API; values always travel as strings
pub fn to_api_destination_settings(settings: &BTreeMap<String, String>) -> Map<String, Value> {
    settings
        .iter()
        .map(|(key, value)| (key.clone(), Value::String(value.clone())))
        .collect()
}

/// API destination settings to the host's string map
///
/// Booleans become `true`/`false`, numbers their decimal text, nested
/// values compact JSON. Nulls are dropped.
pub fn from_api_destination_settings(settings: &Map<String, Value>) -> BTreeMap<String, String> {
    settings
        .iter()
        .filter_map(|(key, value)| {
            let text = match value {
                Value::Null => return None,
                Value::String(s) => s.clone(),
                Value::Bool(b) => b.to_string(),
                Value::Number(n) => n.to_string(),
                nested => nested.to_string(),
            };
            Some((key.clone(), text))
        })
        .collect()
}

// =============================================================================
// Warehouses
// =============================================================================

/// Host warehouse settings to the API shape
///
/// Computed fields (ciphertext, name) are never sent.
pub fn to_api_warehouse_settings(blocks: &[WarehouseSettingsBlock]) -> WarehouseSettings {
    let Some(block) = blocks.first() else {
        return WarehouseSettings::default();
    };

    WarehouseSettings {
        hostname: non_empty(&block.hostname),
        database: non_empty(&block.database),
        port: block.port.filter(|port| *port != 0).map(port_to_api),
        username: non_empty(&block.username),
        password: non_empty(&block.password),
        ciphertext: None,
        name: None,
    }
}

/// API warehouse settings to host blocks
pub fn from_api_warehouse_settings(
    settings: &WarehouseSettings,
) -> ProviderResult<Vec<WarehouseSettingsBlock>> {
    let port = match settings.port.as_deref() {
        Some(port) => port_from_api(port)?,
        None => None,
    };

    Ok(vec![WarehouseSettingsBlock {
        hostname: settings.hostname.clone().unwrap_or_default(),
        database: settings.database.clone().unwrap_or_default(),
        port,
        username: settings.username.clone().unwrap_or_default(),
        password: settings.password.clone().unwrap_or_default(),
        ciphertext: settings.ciphertext.clone().unwrap_or_default(),
        name: settings.name.clone().unwrap_or_default(),
    }])
}

pub fn port_to_api(port: u16) -> String {
    port.to_string()
}

/// Parse the API's string port; empty means unset
pub fn port_from_api(port: &str) -> ProviderResult<Option<u16>> {
    let trimmed = port.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    trimmed
        .parse::<u16>()
        .map(Some)
        .map_err(|e| ProviderError::InvalidValue {
            attribute: "settings.0.port".to_string(),
            message: format!("port '{}' is not a valid TCP port: {}", port, e),
        })
}
