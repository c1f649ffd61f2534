//! `segment_role` data source

use super::error::ProviderResult;
use super::state;
use crate::segment::SegmentClient;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const TYPE_NAME: &str = "segment_role";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleModel {
    pub name: String,
    pub id: String,
    pub description: String,
}

pub async fn read(client: &SegmentClient, config: &Value) -> ProviderResult<Value> {
    let model: RoleModel = state::decode(TYPE_NAME, config)?;
    let role = client.role_by_name(&model.name).await?;
    tracing::debug!("resolved role '{}' to {}", role.name, role.id);

    state::encode(
        TYPE_NAME,
        &RoleModel {
            name: role.name,
            id: role.id,
            description: role.description,
        },
    )
}
