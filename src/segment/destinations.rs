//! Segment Destinations
//!
//! Wire types and calls for `/destinations`.

use super::client::{item_path, SegmentClient};
use super::error::ApiResult;
use super::models::Metadata;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A destination as returned by the API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub source_id: String,
    /// Free-form settings; value types vary per destination
    #[serde(default)]
    pub settings: Map<String, Value>,
}

/// Body of `POST /destinations` and `PATCH /destinations/{id}`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationRequest {
    pub source_id: String,
    pub name: String,
    /// Only sent on create
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata_id: Option<String>,
    pub enabled: bool,
    pub settings: Map<String, Value>,
}

impl From<&Destination> for DestinationRequest {
    fn from(destination: &Destination) -> Self {
        Self {
            source_id: destination.source_id.clone(),
            name: destination.name.clone(),
            metadata_id: None,
            enabled: destination.enabled,
            settings: destination.settings.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct DestinationData {
    destination: Destination,
}

impl SegmentClient {
    pub async fn get_destination(&self, destination_id: &str) -> ApiResult<Destination> {
        let data: DestinationData = self
            .get_data(&item_path("destinations", destination_id), &[])
            .await?;
        Ok(data.destination)
    }

    pub async fn create_destination(&self, request: &DestinationRequest) -> ApiResult<Destination> {
        let data: DestinationData = self.post_data("/destinations", request).await?;
        Ok(data.destination)
    }

    pub async fn update_destination(
        &self,
        destination_id: &str,
        request: &DestinationRequest,
    ) -> ApiResult<Destination> {
        let data: DestinationData = self
            .patch_data(&item_path("destinations", destination_id), request)
            .await?;
        Ok(data.destination)
    }

    pub async fn delete_destination(&self, destination_id: &str) -> ApiResult<()> {
        self.http
            .delete(&item_path("destinations", destination_id))
            .await
    }
}
