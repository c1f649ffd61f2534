//! Resource Registry - Load schema definitions from JSON
//!
//! This module loads every resource and data source schema, plus the
//! enumerated value lists they reference, from embedded JSON files and
//! validates host configuration against them.

use super::error::Diagnostic;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

/// Embedded schema JSON files (compiled into the binary)
const SCHEMA_FILES: &[&str] = &[
    include_str!("../resources/catalog.json"),
    include_str!("../resources/schemas.json"),
];

/// Value type of an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    String,
    Bool,
    Int,
    /// String to string map
    Map,
    /// List of nested blocks
    List,
}

impl AttributeType {
    fn describe(self) -> &'static str {
        match self {
            AttributeType::String => "a string",
            AttributeType::Bool => "a boolean",
            AttributeType::Int => "an integer",
            AttributeType::Map => "a map of strings",
            AttributeType::List => "a list of blocks",
        }
    }
}

/// Attribute definition from JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeDef {
    #[serde(rename = "type")]
    pub kind: AttributeType,
    #[serde(default)]
    pub required: bool,
    /// Set by the provider; configuration may omit it
    #[serde(default)]
    pub computed: bool,
    #[serde(default)]
    pub sensitive: bool,
    /// Changing this attribute replaces the resource
    #[serde(default)]
    pub force_new: bool,
    #[serde(default)]
    pub description: String,
    /// Name of an enum in the catalog the value must belong to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub one_of: Option<String>,
    #[serde(default)]
    pub lowercase: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
    /// Nested attributes of a list block
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub block: BTreeMap<String, AttributeDef>,
}

/// Resource or data source schema from JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaDef {
    pub description: String,
    pub version: u32,
    pub attributes: BTreeMap<String, AttributeDef>,
}

impl SchemaDef {
    /// Top-level attributes whose change forces replacement
    pub fn force_new_attributes(&self) -> Vec<&str> {
        self.attributes
            .iter()
            .filter(|(_, attr)| attr.force_new)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

/// Root structure of resources/*.json
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderSchema {
    #[serde(default)]
    pub enums: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub resources: HashMap<String, SchemaDef>,
    #[serde(default)]
    pub data_sources: HashMap<String, SchemaDef>,
}

/// Global registry loaded from JSON
static REGISTRY: OnceLock<ProviderSchema> = OnceLock::new();

/// Get the schema registry (loads from embedded JSON on first access)
pub fn get_registry() -> &'static ProviderSchema {
    REGISTRY.get_or_init(|| {
        let mut final_schema = ProviderSchema::default();

        for content in SCHEMA_FILES {
            let partial: ProviderSchema = serde_json::from_str(content)
                .unwrap_or_else(|e| panic!("Failed to parse embedded schema JSON: {}", e));
            final_schema.enums.extend(partial.enums);
            final_schema.resources.extend(partial.resources);
            final_schema.data_sources.extend(partial.data_sources);
        }

        final_schema
    })
}

/// Get a resource schema by type name
pub fn get_resource(type_name: &str) -> Option<&'static SchemaDef> {
    get_registry().resources.get(type_name)
}

/// Get a data source schema by type name
pub fn get_data_source(type_name: &str) -> Option<&'static SchemaDef> {
    get_registry().data_sources.get(type_name)
}

/// Get an enumerated value list by name
pub fn get_enum(name: &str) -> Option<&'static [String]> {
    get_registry().enums.get(name).map(|values| values.as_slice())
}

/// Get all resource type names, sorted
pub fn get_all_resource_keys() -> Vec<&'static str> {
    let mut keys: Vec<&str> = get_registry()
        .resources
        .keys()
        .map(|s| s.as_str())
        .collect();
    keys.sort_unstable();
    keys
}

// =============================================================================
// Validation
// =============================================================================

/// Validate a configuration object against a schema
///
/// Returns one diagnostic per problem, each carrying the dotted attribute
/// path (`settings.0.track.0.common_event_on_violations`). Computed
/// attributes may appear in the configuration and are not checked.
pub fn validate_config(schema: &SchemaDef, config: &Value) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    validate_object(&schema.attributes, config, "", &mut diagnostics);
    diagnostics
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

fn validate_object(
    attributes: &BTreeMap<String, AttributeDef>,
    value: &Value,
    prefix: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let Some(object) = value.as_object() else {
        let diagnostic = Diagnostic::error(
            "Invalid configuration",
            format!("expected an object, got {}", value),
        );
        diagnostics.push(if prefix.is_empty() {
            diagnostic
        } else {
            diagnostic.with_attribute(prefix)
        });
        return;
    };

    for name in object.keys() {
        if !attributes.contains_key(name) {
            diagnostics.push(
                Diagnostic::error(
                    "Unsupported attribute",
                    format!("an attribute named '{}' is not expected here", name),
                )
                .with_attribute(&join_path(prefix, name)),
            );
        }
    }

    for (name, attr) in attributes {
        let path = join_path(prefix, name);
        match object.get(name) {
            None | Some(Value::Null) => {
                if attr.required {
                    diagnostics.push(
                        Diagnostic::error(
                            "Missing required attribute",
                            format!("the attribute '{}' is required", path),
                        )
                        .with_attribute(&path),
                    );
                }
            }
            Some(_) if attr.computed && !attr.required => {}
            Some(value) => validate_value(attr, value, &path, diagnostics),
        }
    }
}

fn validate_value(attr: &AttributeDef, value: &Value, path: &str, diagnostics: &mut Vec<Diagnostic>) {
    let type_error = || {
        Diagnostic::error(
            "Incorrect attribute value type",
            format!("'{}' must be {}", path, attr.kind.describe()),
        )
        .with_attribute(path)
    };

    match attr.kind {
        AttributeType::String => {
            let Some(text) = value.as_str() else {
                diagnostics.push(type_error());
                return;
            };
            validate_string(attr, text, path, diagnostics);
        }
        AttributeType::Bool => {
            if !value.is_boolean() {
                diagnostics.push(type_error());
            }
        }
        AttributeType::Int => {
            let Some(number) = value.as_i64() else {
                diagnostics.push(type_error());
                return;
            };
            let below = attr.min.is_some_and(|min| number < min);
            let above = attr.max.is_some_and(|max| number > max);
            if below || above {
                diagnostics.push(
                    Diagnostic::error(
                        "Value out of range",
                        format!(
                            "'{}' must be between {} and {}, got {}",
                            path,
                            attr.min.unwrap_or(i64::MIN),
                            attr.max.unwrap_or(i64::MAX),
                            number
                        ),
                    )
                    .with_attribute(path),
                );
            }
        }
        AttributeType::Map => {
            let Some(map) = value.as_object() else {
                diagnostics.push(type_error());
                return;
            };
            for (key, entry) in map {
                if !entry.is_string() {
                    diagnostics.push(
                        Diagnostic::error(
                            "Incorrect attribute value type",
                            format!("'{}.{}' must be a string", path, key),
                        )
                        .with_attribute(&format!("{}.{}", path, key)),
                    );
                }
            }
        }
        AttributeType::List => {
            let Some(items) = value.as_array() else {
                diagnostics.push(type_error());
                return;
            };
            if let Some(max_items) = attr.max_items {
                if items.len() > max_items {
                    diagnostics.push(
                        Diagnostic::error(
                            "Too many list items",
                            format!("'{}' allows at most {} block(s), got {}", path, max_items, items.len()),
                        )
                        .with_attribute(path),
                    );
                }
            }
            for (index, item) in items.iter().enumerate() {
                validate_object(&attr.block, item, &format!("{}.{}", path, index), diagnostics);
            }
        }
    }
}

fn validate_string(attr: &AttributeDef, text: &str, path: &str, diagnostics: &mut Vec<Diagnostic>) {
    // An empty optional string means unset
    if text.is_empty() && !attr.required {
        return;
    }

    if attr.lowercase && text.to_lowercase() != text {
        diagnostics.push(
            Diagnostic::error(
                "Value must be lower case",
                format!("'{}' must be lower case, got '{}'", path, text),
            )
            .with_attribute(path),
        );
    }

    if let Some(enum_name) = &attr.one_of {
        let Some(allowed) = get_enum(enum_name) else {
            tracing::warn!("schema references unknown enum '{}'", enum_name);
            return;
        };
        if !allowed.iter().any(|candidate| candidate == text) {
            diagnostics.push(
                Diagnostic::error(
                    "Value not allowed",
                    format!("'{}' is not a valid value for '{}'", text, path),
                )
                .with_attribute(path),
            );
        }
    }
}
