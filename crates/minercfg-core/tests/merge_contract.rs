//! Codec Contract Test: Fragment Merging
//!
//! Constraints verified:
//! - `merge(a, a) == a`
//! - Neither input is modified by a merge
//! - Nested tables are unioned; leaf collisions go to the right operand
//! - Vendor encoders that share top-level tables keep both aspects' keys
//!
//! If this test fails, aspects overwrite each other in encoded payloads.

mod common;

use common::*;
use minercfg_core::{ConfigValue, Fragment, Vendor, merge, union};
use serde_json::json;

fn fragment(value: serde_json::Value) -> Fragment {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("fixture must be an object, got {other}"),
    }
}

#[test]
fn merge_is_idempotent() {
    let fixtures = [
        fragment(json!({})),
        fragment(json!({"a": 1})),
        fragment(json!({"temp_control": {"mode": "auto", "target_temp": 70}, "x": [1, 2]})),
        full_config().as_bosminer(None),
    ];
    for a in fixtures {
        assert_eq!(merge(&a, &a), a);
    }
}

#[test]
fn merge_does_not_mutate_inputs() {
    let a = fragment(json!({"Fans": {"Fan Mode": {"Auto": {}}}, "keep": true}));
    let b = fragment(json!({"Fans": {"Fan Mode": {"Auto": {"Target Temperature": 70}}}}));
    let (a_before, b_before) = (a.clone(), b.clone());

    let merged = merge(&a, &b);

    assert_eq!(a, a_before);
    assert_eq!(b, b_before);
    assert_eq!(
        as_value(merged),
        json!({"Fans": {"Fan Mode": {"Auto": {"Target Temperature": 70}}}, "keep": true})
    );
}

#[test]
fn right_operand_wins_on_leaf_collision() {
    let a = fragment(json!({"t": {"mode": "auto", "speed": 1}}));
    let b = fragment(json!({"t": {"mode": "manual"}}));
    assert_eq!(
        as_value(merge(&a, &b)),
        json!({"t": {"mode": "manual", "speed": 1}})
    );

    let scalar_over_table = fragment(json!({"t": 3}));
    assert_eq!(as_value(merge(&a, &scalar_over_table)), json!({"t": 3}));
}

#[test]
fn union_is_flat() {
    let a = fragment(json!({"t": {"mode": "auto", "speed": 1}}));
    let b = fragment(json!({"t": {"mode": "manual"}, "u": 1}));
    assert_eq!(
        as_value(union([a, b])),
        json!({"t": {"mode": "manual"}, "u": 1})
    );
}

#[test]
fn bosminer_fan_and_temperature_share_a_table() {
    let config = full_config();
    let fan = config.fan_mode.encode(Vendor::BosMiner);
    let temperature = config.temperature.encode(Vendor::BosMiner);
    assert!(fan.contains_key("temp_control") && temperature.contains_key("temp_control"));

    let frag = as_value(config.encode(Vendor::BosMiner, None));
    assert_eq!(
        frag["temp_control"],
        json!({"mode": "manual", "target_temp": 70, "hot_temp": 85, "dangerous_temp": 95})
    );
}
