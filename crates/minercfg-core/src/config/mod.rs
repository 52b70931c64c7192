//! Miner configuration model
//!
//! [`MinerConfig`] aggregates five independent aspects. Each aspect knows how
//! to render itself for every vendor; the aggregate only decides how the
//! per-aspect fragments are folded into one payload.
//!
//! # Canonical form
//!
//! ```json
//! {
//!   "pools": {"groups": [{"pools": [{"url": "...", "user": "...", "password": "x"}], "quota": 1}]},
//!   "fan_mode": {"mode": "manual", "speed": 80, "minimum_fans": 1},
//!   "temperature": {"target": 70},
//!   "mining_mode": {"mode": "normal"},
//!   "power_scaling": {"mode": "disabled"}
//! }
//! ```

pub mod fans;
pub mod mining;
pub mod pools;
pub mod power_scaling;
pub mod temperature;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::trace;

use crate::error::{Error, Result};
use crate::fragment::{Fragment, nested};
use crate::merge::{merge, merge_all, union};
use crate::traits::{ConfigAspect, ConfigValue, VariantOption};
use crate::vendor::Vendor;

pub use fans::{FanMode, FanModeImmersion, FanModeManual, FanModeNormal};
pub use mining::{
    ManualBoardSettings, MiningMode, MiningModeHashrateTune, MiningModeHigh, MiningModeLow,
    MiningModeManual, MiningModeNormal, MiningModePowerTune, MiningModeSleep,
};
pub use pools::{Pool, PoolConfig, PoolGroup};
pub use power_scaling::{
    PowerScaling, PowerScalingDisabled, PowerScalingEnabled, ShutdownDisabled, ShutdownEnabled,
    ShutdownPolicy,
};
pub use temperature::TemperatureConfig;

/// Complete miner configuration
///
/// Deserializing always succeeds on well-formed JSON: it goes through the
/// lenient canonical decoder. Use [`MinerConfig::try_from_canonical`] to
/// reject unrecognized `mode` tags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct MinerConfig {
    pub pools: PoolConfig,
    pub fan_mode: FanMode,
    pub temperature: TemperatureConfig,
    pub mining_mode: MiningMode,
    pub power_scaling: PowerScaling,
}

impl MinerConfig {
    /// Canonical mapping of this configuration
    pub fn to_canonical(&self) -> Value {
        json!({
            "pools": self.pools,
            "fan_mode": self.fan_mode,
            "temperature": self.temperature,
            "mining_mode": self.mining_mode,
            "power_scaling": self.power_scaling,
        })
    }

    /// Lenient canonical decode
    ///
    /// Missing aspects, missing tags and unrecognized tags all fall back to
    /// the aspect default.
    pub fn from_canonical(conf: &Value) -> Self {
        Self {
            pools: PoolConfig::from_canonical(conf.get(PoolConfig::NAME)),
            fan_mode: FanMode::from_canonical(conf.get(FanMode::NAME)),
            temperature: TemperatureConfig::from_canonical(conf.get(TemperatureConfig::NAME)),
            mining_mode: MiningMode::from_canonical(conf.get(MiningMode::NAME)),
            power_scaling: PowerScaling::from_canonical(conf.get(PowerScaling::NAME)),
        }
    }

    /// Strict canonical decode
    ///
    /// Fails on a non-object input and on the first aspect whose `mode` tag
    /// is not recognized. The nested shutdown policy stays lenient.
    pub fn try_from_canonical(conf: &Value) -> Result<Self> {
        if !conf.is_object() {
            return Err(Error::malformed("canonical configuration must be an object"));
        }
        Ok(Self {
            pools: PoolConfig::from_canonical(conf.get(PoolConfig::NAME)),
            fan_mode: FanMode::try_from_canonical(conf.get(FanMode::NAME))?,
            temperature: TemperatureConfig::from_canonical(conf.get(TemperatureConfig::NAME)),
            mining_mode: MiningMode::try_from_canonical(conf.get(MiningMode::NAME))?,
            power_scaling: PowerScaling::try_from_canonical(conf.get(PowerScaling::NAME))?,
        })
    }

    /// Decode one vendor's raw payload
    ///
    /// Aspects the vendor does not carry keep their own defaults.
    pub fn decode(vendor: Vendor, raw: &Value) -> Self {
        let mut config = Self::default();
        match vendor {
            Vendor::Api | Vendor::Goldshell | Vendor::Innosilicon => {
                config.pools = PoolConfig::decode(vendor, raw);
            }
            Vendor::AntminerModern | Vendor::AntminerOld => {
                config.pools = PoolConfig::decode(vendor, raw);
                config.mining_mode = MiningMode::decode(vendor, raw);
                config.fan_mode = FanMode::decode(vendor, raw);
            }
            Vendor::BosMiner => {
                config.pools = PoolConfig::decode(vendor, raw);
                config.fan_mode = FanMode::decode(vendor, raw);
                config.temperature = TemperatureConfig::decode(vendor, raw);
                config.mining_mode = MiningMode::decode(vendor, raw);
                config.power_scaling = PowerScaling::decode(vendor, raw);
            }
            Vendor::Epic => {
                config.pools = PoolConfig::decode(vendor, raw);
                config.fan_mode = FanMode::decode(vendor, raw);
                config.temperature = TemperatureConfig::decode(vendor, raw);
                config.mining_mode = MiningMode::decode(vendor, raw);
            }
            Vendor::Whatsminer | Vendor::Avalon | Vendor::BosGrpc => {
                trace!(%vendor, "no decoder for vendor, using defaults");
            }
        }
        config
    }

    /// Render the whole configuration for `vendor`
    ///
    /// `user_suffix` is appended to every pool worker name.
    pub fn encode(&self, vendor: Vendor, user_suffix: Option<&str>) -> Fragment {
        let fan = self.fan_mode.encode(vendor);
        let temperature = self.temperature_for(vendor).encode(vendor);
        let mining = self.mining_mode.encode(vendor);
        let pools = self.pools.encode_with_suffix(vendor, user_suffix);
        let power = self.power_scaling.encode(vendor);

        trace!(%vendor, "folding aspect fragments");
        match vendor {
            Vendor::AntminerModern => union([
                fan,
                nested(&["freq-level"], json!("100")),
                mining,
                pools,
                temperature,
                power,
            ]),
            Vendor::AntminerOld => union([fan, mining, pools, temperature, power]),
            Vendor::BosMiner => union([merge(&fan, &temperature), mining, pools, power]),
            Vendor::Epic => merge_all([merge(&fan, &temperature), mining, pools, power]),
            _ => union([fan, temperature, mining, pools, power]),
        }
    }

    /// ePIC nests the target under `Fan Mode.Auto`, which only a normal fan owns
    fn temperature_for(&self, vendor: Vendor) -> TemperatureConfig {
        match (vendor, &self.fan_mode) {
            (Vendor::Epic, FanMode::Manual(_) | FanMode::Immersion(_)) => TemperatureConfig {
                target: None,
                ..self.temperature
            },
            _ => self.temperature,
        }
    }

    pub fn from_api(raw: &Value) -> Self {
        Self::decode(Vendor::Api, raw)
    }

    pub fn from_am_modern(raw: &Value) -> Self {
        Self::decode(Vendor::AntminerModern, raw)
    }

    pub fn from_am_old(raw: &Value) -> Self {
        Self::decode(Vendor::AntminerOld, raw)
    }

    pub fn from_goldshell(raw: &Value) -> Self {
        Self::decode(Vendor::Goldshell, raw)
    }

    pub fn from_inno(raw: &Value) -> Self {
        Self::decode(Vendor::Innosilicon, raw)
    }

    pub fn from_bosminer(raw: &Value) -> Self {
        Self::decode(Vendor::BosMiner, raw)
    }

    pub fn from_epic(raw: &Value) -> Self {
        Self::decode(Vendor::Epic, raw)
    }

    pub fn as_am_modern(&self, user_suffix: Option<&str>) -> Fragment {
        self.encode(Vendor::AntminerModern, user_suffix)
    }

    pub fn as_am_old(&self, user_suffix: Option<&str>) -> Fragment {
        self.encode(Vendor::AntminerOld, user_suffix)
    }

    pub fn as_wm(&self, user_suffix: Option<&str>) -> Fragment {
        self.encode(Vendor::Whatsminer, user_suffix)
    }

    pub fn as_goldshell(&self, user_suffix: Option<&str>) -> Fragment {
        self.encode(Vendor::Goldshell, user_suffix)
    }

    pub fn as_avalon(&self, user_suffix: Option<&str>) -> Fragment {
        self.encode(Vendor::Avalon, user_suffix)
    }

    pub fn as_inno(&self, user_suffix: Option<&str>) -> Fragment {
        self.encode(Vendor::Innosilicon, user_suffix)
    }

    pub fn as_bosminer(&self, user_suffix: Option<&str>) -> Fragment {
        self.encode(Vendor::BosMiner, user_suffix)
    }

    pub fn as_bos_grpc(&self, user_suffix: Option<&str>) -> Fragment {
        self.encode(Vendor::BosGrpc, user_suffix)
    }

    pub fn as_epic(&self, user_suffix: Option<&str>) -> Fragment {
        self.encode(Vendor::Epic, user_suffix)
    }
}

impl From<Value> for MinerConfig {
    fn from(conf: Value) -> Self {
        Self::from_canonical(&conf)
    }
}
