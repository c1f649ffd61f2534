//! Segment Sources
//!
//! Wire types and calls for `/sources`.

use super::client::{item_path, SegmentClient};
use super::error::ApiResult;
use super::models::{Label, Metadata};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a source treats events that violate its tracking plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViolationPolicy {
    Allow,
    Block,
    OmitProperties,
}

impl ViolationPolicy {
    pub const ALL: [ViolationPolicy; 3] = [
        ViolationPolicy::Allow,
        ViolationPolicy::Block,
        ViolationPolicy::OmitProperties,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationPolicy::Allow => "ALLOW",
            ViolationPolicy::Block => "BLOCK",
            ViolationPolicy::OmitProperties => "OMIT_PROPERTIES",
        }
    }
}

impl fmt::Display for ViolationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViolationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ViolationPolicy::ALL
            .into_iter()
            .find(|policy| policy.as_str() == s)
            .ok_or_else(|| {
                format!("expected one of ALLOW, BLOCK, OMIT_PROPERTIES, got '{}'", s)
            })
    }
}

/// Tracking-plan settings for `track` events
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrackSettings {
    pub allow_unplanned_events: bool,
    pub allow_unplanned_event_properties: bool,
    pub allow_event_on_violations: bool,
    pub allow_properties_on_violations: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub common_event_on_violations: Option<ViolationPolicy>,
}

/// Tracking-plan settings for `identify` and `group` calls
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TraitSettings {
    pub allow_unplanned_traits: bool,
    pub allow_traits_on_violations: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub common_event_on_violations: Option<ViolationPolicy>,
}

/// Source settings as the API nests them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SourceSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forwarding_violations_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forwarding_blocked_events_to: Option<String>,
    pub track: TrackSettings,
    pub identify: TraitSettings,
    pub group: TraitSettings,
}

/// A source as returned by the API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    pub id: String,
    pub slug: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub workspace_id: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub write_keys: Vec<String>,
    #[serde(default)]
    pub settings: SourceSettings,
    #[serde(default)]
    pub labels: Vec<Label>,
}

/// Body of `POST /sources`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSourceRequest {
    pub slug: String,
    pub name: String,
    pub enabled: bool,
    pub metadata_id: String,
    pub settings: SourceSettings,
}

/// Body of `PATCH /sources/{id}`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSourceRequest {
    pub slug: String,
    pub name: String,
    pub enabled: bool,
    pub settings: SourceSettings,
}

impl From<&Source> for UpdateSourceRequest {
    fn from(source: &Source) -> Self {
        Self {
            slug: source.slug.clone(),
            name: source.name.clone(),
            enabled: source.enabled,
            settings: source.settings.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SourceData {
    source: Source,
}

impl SegmentClient {
    pub async fn get_source(&self, source_id: &str) -> ApiResult<Source> {
        let data: SourceData = self.get_data(&item_path("sources", source_id), &[]).await?;
        Ok(data.source)
    }

    pub async fn create_source(&self, request: &CreateSourceRequest) -> ApiResult<Source> {
        let data: SourceData = self.post_data("/sources", request).await?;
        Ok(data.source)
    }

    pub async fn update_source(
        &self,
        source_id: &str,
        request: &UpdateSourceRequest,
    ) -> ApiResult<Source> {
        let data: SourceData = self
            .patch_data(&item_path("sources", source_id), request)
            .await?;
        Ok(data.source)
    }

    pub async fn delete_source(&self, source_id: &str) -> ApiResult<()> {
        self.http.delete(&item_path("sources", source_id)).await
    }
}
