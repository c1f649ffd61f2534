//! Property-based tests using proptest
//!
//! These tests verify the settings mappers and schema validation using
//! randomized inputs.

use proptest::prelude::*;
use segment_provider::resource::mappers::{
    from_api_destination_settings, from_api_source_settings, from_api_warehouse_settings,
    port_from_api, port_to_api, to_api_destination_settings, to_api_source_settings,
    to_api_warehouse_settings, SourceSettingsBlock, TrackBlock, TraitsBlock,
    WarehouseSettingsBlock,
};
use segment_provider::resource::{get_resource, validate_config};
use segment_provider::segment::sources::ViolationPolicy;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

fn arb_policy() -> impl Strategy<Value = Option<ViolationPolicy>> {
    prop_oneof![
        Just(None),
        Just(Some(ViolationPolicy::Allow)),
        Just(Some(ViolationPolicy::Block)),
        Just(Some(ViolationPolicy::OmitProperties)),
    ]
}

fn arb_traits() -> impl Strategy<Value = TraitsBlock> {
    (any::<bool>(), any::<bool>(), arb_policy()).prop_map(|(unplanned, on_violations, policy)| {
        TraitsBlock {
            allow_unplanned_traits: unplanned,
            allow_traits_on_violations: on_violations,
            common_event_on_violations: policy,
        }
    })
}

fn arb_source_settings() -> impl Strategy<Value = SourceSettingsBlock> {
    (
        "[a-zA-Z0-9]{0,12}",
        "[a-zA-Z0-9]{0,12}",
        any::<[bool; 4]>(),
        arb_policy(),
        arb_traits(),
        arb_traits(),
    )
        .prop_map(|(violations_to, blocked_to, flags, policy, identify, group)| {
            SourceSettingsBlock {
                forwarding_violations_to: violations_to,
                forwarding_blocked_events_to: blocked_to,
                track: vec![TrackBlock {
                    allow_unplanned_events: flags[0],
                    allow_unplanned_event_properties: flags[1],
                    allow_event_on_violations: flags[2],
                    allow_properties_on_violations: flags[3],
                    common_event_on_violations: policy,
                }],
                identify: vec![identify],
                group: vec![group],
            }
        })
}

/// Arbitrary JSON scalars and shallow containers as the API might return them
fn arb_api_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        "[ -~]{0,20}".prop_map(Value::String),
        prop::collection::vec("[a-z]{0,5}", 0..4).prop_map(|v| json!(v)),
    ]
}

proptest! {
    /// Every valid port survives the trip to the API's string form and back
    #[test]
    fn port_round_trip(port in 1u16..=65535) {
        prop_assert_eq!(port_from_api(&port_to_api(port)).unwrap(), Some(port));

        let blocks = vec![WarehouseSettingsBlock { port: Some(port), ..Default::default() }];
        let back = from_api_warehouse_settings(&to_api_warehouse_settings(&blocks)).unwrap();
        prop_assert_eq!(back[0].port, Some(port));
    }

    /// Out of range ports are refused, never wrapped
    #[test]
    fn port_out_of_range_rejected(port in 65536u32..10_000_000) {
        prop_assert!(port_from_api(&port.to_string()).is_err());
    }

    /// Host settings are always transmitted as strings
    #[test]
    fn destination_settings_sent_as_strings(
        settings in prop::collection::btree_map("[a-zA-Z]{1,10}", "[ -~]{0,20}", 0..10)
    ) {
        let api = to_api_destination_settings(&settings);
        prop_assert!(api.values().all(Value::is_string));
        prop_assert_eq!(from_api_destination_settings(&api), settings);
    }

    /// Whatever the API returns, the host sees only strings and no nulls
    #[test]
    fn destination_settings_read_back_as_strings(
        entries in prop::collection::btree_map("[a-zA-Z]{1,10}", arb_api_value(), 0..10)
    ) {
        let api: Map<String, Value> = entries.clone().into_iter().collect();
        let host: BTreeMap<String, String> = from_api_destination_settings(&api);

        for (key, value) in &entries {
            match value {
                Value::Null => prop_assert!(!host.contains_key(key)),
                Value::String(s) => prop_assert_eq!(&host[key], s),
                Value::Bool(b) => prop_assert_eq!(&host[key], &b.to_string()),
                other => prop_assert_eq!(&host[key], &other.to_string()),
            }
        }
    }

    /// A fully populated block survives API conversion both ways
    #[test]
    fn source_settings_round_trip(block in arb_source_settings()) {
        let api = to_api_source_settings(std::slice::from_ref(&block));
        let back = from_api_source_settings(&api);
        prop_assert_eq!(back, vec![block]);
    }

    /// Mapped-back settings always validate against the schema
    #[test]
    fn mapped_source_settings_validate(block in arb_source_settings(), slug in "[a-z]{1,12}") {
        let settings = from_api_source_settings(&to_api_source_settings(&[block]));
        let config = json!({
            "slug": slug,
            "name": "Generated",
            "enabled": true,
            "source_slug": "javascript",
            "settings": settings,
        });
        let schema = get_resource("segment_source").unwrap();
        prop_assert!(validate_config(schema, &config).is_empty());
    }
}
