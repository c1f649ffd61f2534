//! Shared wire types for the Segment public API

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Standard `{"data": ...}` response envelope
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

/// Cursor pagination block returned by list endpoints
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(default)]
    pub current: Option<String>,
    /// Cursor of the following page; absent or empty on the last page
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub total_entries: Option<u64>,
}

impl Pagination {
    /// The cursor to request next, `None` once the listing is exhausted
    pub fn next_cursor(&self) -> Option<&str> {
        self.next.as_deref().filter(|next| !next.is_empty())
    }
}

/// A configurable option advertised by a catalog entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationOption {
    pub name: String,
    #[serde(rename = "type", default)]
    pub option_type: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub default_value: Value,
    #[serde(default)]
    pub label: String,
}

/// Catalog metadata for a source, destination or warehouse type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: String,
    /// Shape differs between endpoints (object or list), kept opaque
    #[serde(default)]
    pub logos: Value,
    #[serde(default)]
    pub options: Vec<IntegrationOption>,
    #[serde(default)]
    pub categories: Vec<String>,
}

/// Key/value label attached to a source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub key: String,
    pub value: String,
    #[serde(default)]
    pub description: String,
}

/// Workspace the API token belongs to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    pub id: String,
    pub name: String,
    pub slug: String,
}

/// Grants a role (optionally scoped to resources) to a user or invite
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    pub role_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<Value>,
}

impl Permission {
    pub fn for_role(role_id: &str) -> Self {
        Self {
            role_id: role_id.to_string(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_next_cursor_absent_or_empty_ends_listing() {
        let missing: Pagination = serde_json::from_value(json!({"current": "MA=="})).unwrap();
        assert_eq!(missing.next_cursor(), None);

        let null: Pagination = serde_json::from_value(json!({"next": null})).unwrap();
        assert_eq!(null.next_cursor(), None);

        let empty: Pagination = serde_json::from_value(json!({"next": ""})).unwrap();
        assert_eq!(empty.next_cursor(), None);

        let more: Pagination = serde_json::from_value(json!({"next": "MTAw"})).unwrap();
        assert_eq!(more.next_cursor(), Some("MTAw"));
    }

    #[test]
    fn test_metadata_tolerates_both_logo_shapes() {
        let object: Metadata = serde_json::from_value(json!({
            "id": "m1", "slug": "snowflake", "logos": {"default": "a.svg"}
        }))
        .unwrap();
        assert_eq!(object.slug, "snowflake");

        let list: Metadata = serde_json::from_value(json!({
            "id": "m2", "slug": "javascript", "logos": [{"default": "b.svg"}]
        }))
        .unwrap();
        assert!(list.logos.is_array());
    }
}
