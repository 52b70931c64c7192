//! Codec Contract Test: Canonical Round Trips
//!
//! Constraints verified:
//! - Every variant of every aspect survives encode → decode in canonical form
//! - The aggregate survives the same trip, through serde and through the
//!   explicit `to_canonical` / `from_canonical` pair
//! - Pools with an empty URL are kept by the canonical form
//! - A BOSminer payload survives a trip through its TOML wire text
//!
//! If this test fails, persisted configurations no longer load back.

mod common;

use common::*;
use minercfg_core::{
    FanMode, MinerConfig, MiningMode, Pool, PoolConfig, PoolGroup, PowerScaling,
    TemperatureConfig, VariantOption, Vendor,
};
use serde_json::json;

#[test]
fn every_fan_mode_round_trips() {
    for mode in every_fan_mode() {
        let encoded = serde_json::to_value(mode).unwrap();
        assert_eq!(encoded["mode"], json!(mode.mode()));
        assert_eq!(FanMode::from_canonical(Some(&encoded)), mode);
        assert_eq!(FanMode::try_from_canonical(Some(&encoded)).unwrap(), mode);
    }
}

#[test]
fn every_mining_mode_round_trips() {
    for mode in every_mining_mode() {
        let encoded = serde_json::to_value(&mode).unwrap();
        assert_eq!(MiningMode::from_canonical(Some(&encoded)), mode);
    }
}

#[test]
fn every_power_scaling_round_trips() {
    for scaling in every_power_scaling() {
        let encoded = serde_json::to_value(scaling).unwrap();
        assert_eq!(
            PowerScaling::from_canonical(Some(&encoded)),
            scaling,
            "canonical form was {encoded}"
        );
    }
}

#[test]
fn every_temperature_round_trips() {
    for temp in every_temperature() {
        let encoded = serde_json::to_value(temp).unwrap();
        assert_eq!(TemperatureConfig::from_canonical(Some(&encoded)), temp);
    }
}

#[test]
fn pools_round_trip() {
    let encoded = serde_json::to_value(sample_pools()).unwrap();
    assert_eq!(PoolConfig::from_canonical(Some(&encoded)), sample_pools());
}

#[test]
fn aggregate_round_trips() {
    let config = full_config();

    let canonical = config.to_canonical();
    assert_eq!(MinerConfig::from_canonical(&canonical), config);
    assert_eq!(MinerConfig::try_from_canonical(&canonical).unwrap(), config);

    let text = serde_json::to_string(&config).unwrap();
    let parsed: MinerConfig = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed, config);
}

#[test]
fn empty_url_pool_round_trips() {
    let config = MinerConfig {
        pools: PoolConfig::new(vec![PoolGroup::new(vec![
            Pool::new("", "", ""),
            Pool::new("stratum+tcp://a.example:1", "acct", "x"),
        ])]),
        ..MinerConfig::default()
    };

    let canonical = config.to_canonical();
    assert_eq!(MinerConfig::from_canonical(&canonical), config);
    assert_eq!(MinerConfig::try_from_canonical(&canonical).unwrap(), config);
}

#[test]
fn missing_aspects_take_defaults() {
    let canonical = json!({"fan_mode": {"mode": "immersion"}});
    let config = MinerConfig::from_canonical(&canonical);
    assert_eq!(config.fan_mode, FanMode::immersion());
    assert_eq!(config.mining_mode, MiningMode::default());
    assert_eq!(config.power_scaling, PowerScaling::default());
    assert_eq!(config.pools, PoolConfig::default());
}

#[test]
fn bosminer_toml_round_trips() {
    let config = full_config();
    let payload = as_value(config.as_bosminer(None));

    let text = Vendor::BosMiner.render_payload(&payload).unwrap();
    let parsed = Vendor::BosMiner.parse_payload(&text).unwrap();

    assert_eq!(parsed, payload);
    assert_eq!(MinerConfig::from_bosminer(&parsed), config);
}
