//! Shared fixtures for the codec contract tests
//!
//! One value per variant of every aspect, plus a fully populated
//! configuration. Each contract file uses a different subset.

#![allow(dead_code)]

use minercfg_core::config::ManualBoardSettings;
use minercfg_core::config::MiningModeManual;
use minercfg_core::{
    FanMode, Fragment, MinerConfig, MiningMode, Pool, PoolConfig, PoolGroup, PowerScaling,
    ShutdownPolicy, TemperatureConfig,
};
use serde_json::Value;
use std::collections::BTreeMap;

pub fn every_fan_mode() -> Vec<FanMode> {
    vec![
        FanMode::normal(),
        FanMode::manual(100, 1),
        FanMode::manual(35, 4),
        FanMode::immersion(),
    ]
}

pub fn every_mining_mode() -> Vec<MiningMode> {
    let mut boards = BTreeMap::new();
    boards.insert(1, ManualBoardSettings { freq: 490.0, volt: 13.4 });
    vec![
        MiningMode::normal(),
        MiningMode::sleep(),
        MiningMode::low(),
        MiningMode::high(),
        MiningMode::power_tuning(Some(3400)),
        MiningMode::power_tuning(None),
        MiningMode::hashrate_tuning(Some(120.0)),
        MiningMode::hashrate_tuning(None),
        MiningMode::Manual(MiningModeManual::default()),
        MiningMode::Manual(MiningModeManual {
            global_freq: Some(500.0),
            global_volt: Some(13.5),
            boards,
        }),
    ]
}

pub fn every_power_scaling() -> Vec<PowerScaling> {
    vec![
        PowerScaling::disabled(),
        PowerScaling::enabled(None, None, None),
        PowerScaling::enabled(Some(100), Some(1800), None),
        PowerScaling::enabled(Some(100), Some(1800), Some(ShutdownPolicy::disabled())),
        PowerScaling::enabled(None, Some(1800), Some(ShutdownPolicy::enabled(None))),
        PowerScaling::enabled(Some(200), None, Some(ShutdownPolicy::enabled(Some(6)))),
    ]
}

pub fn every_temperature() -> Vec<TemperatureConfig> {
    vec![
        TemperatureConfig::default(),
        TemperatureConfig::new(Some(70), None, None),
        TemperatureConfig::new(None, Some(85), None),
        TemperatureConfig::new(Some(65), Some(80), Some(95)),
    ]
}

pub fn sample_pools() -> PoolConfig {
    PoolConfig::new(vec![
        PoolGroup::new(vec![
            Pool::new("stratum+tcp://pool-a.example:3333", "farm", "x"),
            Pool::new("stratum+tcp://pool-b.example:3333", "farm", "x"),
        ])
        .named("primary"),
    ])
}

pub fn full_config() -> MinerConfig {
    MinerConfig {
        pools: sample_pools(),
        fan_mode: FanMode::manual(60, 2),
        temperature: TemperatureConfig::new(Some(70), Some(85), Some(95)),
        mining_mode: MiningMode::power_tuning(Some(3200)),
        power_scaling: PowerScaling::enabled(
            Some(100),
            Some(2000),
            Some(ShutdownPolicy::enabled(Some(3))),
        ),
    }
}

/// View a fragment as a JSON value for whole-payload comparisons
pub fn as_value(frag: Fragment) -> Value {
    Value::Object(frag)
}
