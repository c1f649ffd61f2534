//! Host state helpers shared by the lifecycle handlers

use super::error::{ProviderError, ProviderResult};
use super::registry::{self, SchemaDef};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Decode host state into a typed model
pub(crate) fn decode<T: DeserializeOwned>(resource: &'static str, state: &Value) -> ProviderResult<T> {
    T::deserialize(state).map_err(|source| ProviderError::InvalidState { resource, source })
}

/// Encode a typed model back into host state
pub(crate) fn encode<T: Serialize>(resource: &'static str, model: &T) -> ProviderResult<Value> {
    serde_json::to_value(model).map_err(|source| ProviderError::InvalidState { resource, source })
}

/// The remote ID recorded in state
pub(crate) fn require_id<'a>(resource: &'static str, id: Option<&'a str>) -> ProviderResult<&'a str> {
    match id {
        Some(id) if !id.is_empty() => Ok(id),
        _ => Err(ProviderError::MissingId { resource }),
    }
}

/// Changed attributes that can be patched in place
///
/// Replace-only attributes are dropped. A change set made only of them is
/// `RequiresReplacement`.
pub(crate) fn in_place_changes(
    resource: &'static str,
    changed: &[&'static str],
) -> ProviderResult<Vec<&'static str>> {
    let force_new = registry::get_resource(resource)
        .map(SchemaDef::force_new_attributes)
        .unwrap_or_default();

    let (replace, in_place): (Vec<&'static str>, Vec<&'static str>) = changed
        .iter()
        .copied()
        .partition(|attribute| force_new.contains(attribute));

    if in_place.is_empty() && !replace.is_empty() {
        return Err(ProviderError::RequiresReplacement {
            resource,
            attributes: replace,
        });
    }
    if !replace.is_empty() {
        tracing::warn!("{} ignoring replace-only changes {:?}", resource, replace);
    }
    Ok(in_place)
}
