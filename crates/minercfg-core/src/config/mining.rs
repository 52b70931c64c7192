//! Mining mode
//!
//! Fixed presets (`normal`, `sleep`, `low`, `high`), autotuner targets
//! (`power_tuning`, `hashrate_tuning`) and fully `manual` clocks.

use serde::Serialize;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::sync::LazyLock;

use crate::fragment::{
    Fragment, as_u32, as_u32_or_numeric_str, insert_some, lookup, lookup_bool, lookup_f64,
    nested,
};
use crate::proto::{self, PerformanceMode, TeraHashrate, TunerMode};
use crate::registry::VariantRegistry;
use crate::traits::aspect::or_default;
use crate::traits::{ConfigAspect, ConfigValue, VariantOption, VariantValue};
use crate::vendor::Vendor;

/// Antminer `miner-mode` values
const ANTMINER_NORMAL: &str = "0";
const ANTMINER_SLEEP: &str = "1";
const ANTMINER_LOW: &str = "3";

fn antminer_mode(value: &str) -> Fragment {
    nested(&["miner-mode"], json!(value))
}

fn whatsminer_mode(mode: &str) -> Fragment {
    nested(&["mode"], json!(mode))
}

macro_rules! preset_variant {
    ($(#[$doc:meta])* $name:ident, $mode:literal, $antminer:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
        pub struct $name;

        impl VariantValue for $name {
            const MODE: &'static str = $mode;

            fn from_canonical(_conf: &Fragment) -> Self {
                Self
            }
        }

        impl $name {
            fn encode_preset(&self, vendor: Vendor) -> Fragment {
                match vendor {
                    Vendor::AntminerModern | Vendor::AntminerOld => antminer_mode($antminer),
                    Vendor::Whatsminer => whatsminer_mode(Self::MODE),
                    _ => Fragment::new(),
                }
            }
        }
    };
}

preset_variant!(
    /// Stock clocks
    MiningModeNormal, "normal", ANTMINER_NORMAL
);
preset_variant!(
    /// Hashing paused, control plane up
    MiningModeSleep, "sleep", ANTMINER_SLEEP
);
preset_variant!(
    /// Low power preset
    MiningModeLow, "low", ANTMINER_LOW
);
preset_variant!(
    /// High performance preset
    MiningModeHigh, "high", ANTMINER_NORMAL
);

impl ConfigValue for MiningModeNormal {
    fn encode(&self, vendor: Vendor) -> Fragment {
        match vendor {
            Vendor::BosMiner => nested(&["autotuning", "enabled"], json!(false)),
            Vendor::Epic => nested(&["PerpetualTune", "Running"], json!(false)),
            _ => self.encode_preset(vendor),
        }
    }
}

impl ConfigValue for MiningModeSleep {
    fn encode(&self, vendor: Vendor) -> Fragment {
        self.encode_preset(vendor)
    }
}

impl ConfigValue for MiningModeLow {
    fn encode(&self, vendor: Vendor) -> Fragment {
        self.encode_preset(vendor)
    }
}

impl ConfigValue for MiningModeHigh {
    fn encode(&self, vendor: Vendor) -> Fragment {
        self.encode_preset(vendor)
    }
}

/// Autotune towards a power target
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MiningModePowerTune {
    /// Target in watts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power: Option<u32>,
}

impl VariantValue for MiningModePowerTune {
    const MODE: &'static str = "power_tuning";

    fn from_canonical(conf: &Fragment) -> Self {
        Self {
            power: conf.get("power").and_then(as_u32),
        }
    }
}

impl ConfigValue for MiningModePowerTune {
    fn encode(&self, vendor: Vendor) -> Fragment {
        match vendor {
            Vendor::AntminerModern | Vendor::AntminerOld => antminer_mode(ANTMINER_NORMAL),
            Vendor::Whatsminer => {
                let mut frag = whatsminer_mode(Self::MODE);
                insert_some(&mut frag, "power", self.power);
                frag
            }
            Vendor::BosMiner => {
                let mut table = Fragment::new();
                table.insert("enabled".to_string(), json!(true));
                table.insert("mode".to_string(), json!("power_target"));
                insert_some(&mut table, "power_target", self.power);
                nested(&["autotuning"], Value::Object(table))
            }
            Vendor::BosGrpc => {
                let mode = PerformanceMode {
                    tuner_mode: TunerMode::PowerTarget {
                        power_target: proto::watts(self.power),
                    },
                };
                proto::message_fragment("performance_mode", &mode)
            }
            _ => Fragment::new(),
        }
    }
}

/// Autotune towards a hashrate target
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MiningModeHashrateTune {
    /// Target in TH/s
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hashrate: Option<f64>,
}

impl VariantValue for MiningModeHashrateTune {
    const MODE: &'static str = "hashrate_tuning";

    fn from_canonical(conf: &Fragment) -> Self {
        Self {
            hashrate: conf.get("hashrate").and_then(Value::as_f64),
        }
    }
}

impl ConfigValue for MiningModeHashrateTune {
    fn encode(&self, vendor: Vendor) -> Fragment {
        match vendor {
            Vendor::AntminerModern | Vendor::AntminerOld => antminer_mode(ANTMINER_NORMAL),
            Vendor::Whatsminer => whatsminer_mode(Self::MODE),
            Vendor::BosMiner => {
                let mut table = Fragment::new();
                table.insert("enabled".to_string(), json!(true));
                table.insert("mode".to_string(), json!("hashrate_target"));
                insert_some(&mut table, "hashrate_target", self.hashrate);
                nested(&["autotuning"], Value::Object(table))
            }
            Vendor::BosGrpc => {
                let mode = PerformanceMode {
                    tuner_mode: TunerMode::HashrateTarget {
                        hashrate_target: self.hashrate.map(|terahash_per_second| TeraHashrate {
                            terahash_per_second,
                        }),
                    },
                };
                proto::message_fragment("performance_mode", &mode)
            }
            Vendor::Epic => {
                let mut tune = Fragment::new();
                tune.insert("Running".to_string(), json!(true));
                if let Some(target) = self.hashrate {
                    tune.insert(
                        "Algorithm".to_string(),
                        json!({"VoltageOptimizer": {"Target": target}}),
                    );
                }
                nested(&["PerpetualTune"], Value::Object(tune))
            }
            _ => Fragment::new(),
        }
    }
}

/// Clocks for one hashboard
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ManualBoardSettings {
    /// Frequency in MHz
    pub freq: f64,
    /// Voltage in volts
    pub volt: f64,
}

/// Fixed clocks, optionally per board
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MiningModeManual {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global_freq: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global_volt: Option<f64>,
    /// Per-board overrides, keyed by board index
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub boards: BTreeMap<u32, ManualBoardSettings>,
}

impl VariantValue for MiningModeManual {
    const MODE: &'static str = "manual";

    fn from_canonical(conf: &Fragment) -> Self {
        let boards = conf
            .get("boards")
            .and_then(Value::as_object)
            .map(|boards| {
                boards
                    .iter()
                    .filter_map(|(idx, board)| {
                        let idx = idx.parse::<u32>().ok()?;
                        let freq = board.get("freq")?.as_f64()?;
                        let volt = board.get("volt")?.as_f64()?;
                        Some((idx, ManualBoardSettings { freq, volt }))
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self {
            global_freq: conf.get("global_freq").and_then(Value::as_f64),
            global_volt: conf.get("global_volt").and_then(Value::as_f64),
            boards,
        }
    }
}

impl ConfigValue for MiningModeManual {
    fn encode(&self, vendor: Vendor) -> Fragment {
        match vendor {
            Vendor::AntminerModern | Vendor::AntminerOld => antminer_mode(ANTMINER_NORMAL),
            Vendor::Whatsminer => whatsminer_mode(Self::MODE),
            _ => Fragment::new(),
        }
    }
}

/// Mining mode aspect
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum MiningMode {
    Normal(MiningModeNormal),
    Sleep(MiningModeSleep),
    Low(MiningModeLow),
    High(MiningModeHigh),
    PowerTuning(MiningModePowerTune),
    HashrateTuning(MiningModeHashrateTune),
    Manual(MiningModeManual),
}

static REGISTRY: LazyLock<VariantRegistry<MiningMode>> = LazyLock::new(|| {
    VariantRegistry::new("mining_mode", MiningModeNormal::MODE, |conf| {
        MiningMode::Normal(MiningModeNormal::from_canonical(conf))
    })
    .with_variant(MiningModeSleep::MODE, |conf| {
        MiningMode::Sleep(MiningModeSleep::from_canonical(conf))
    })
    .with_variant(MiningModeLow::MODE, |conf| {
        MiningMode::Low(MiningModeLow::from_canonical(conf))
    })
    .with_variant(MiningModeHigh::MODE, |conf| {
        MiningMode::High(MiningModeHigh::from_canonical(conf))
    })
    .with_variant(MiningModePowerTune::MODE, |conf| {
        MiningMode::PowerTuning(MiningModePowerTune::from_canonical(conf))
    })
    .with_variant(MiningModeHashrateTune::MODE, |conf| {
        MiningMode::HashrateTuning(MiningModeHashrateTune::from_canonical(conf))
    })
    .with_variant(MiningModeManual::MODE, |conf| {
        MiningMode::Manual(MiningModeManual::from_canonical(conf))
    })
});

impl MiningMode {
    pub fn normal() -> Self {
        Self::Normal(MiningModeNormal)
    }

    pub fn sleep() -> Self {
        Self::Sleep(MiningModeSleep)
    }

    pub fn low() -> Self {
        Self::Low(MiningModeLow)
    }

    pub fn high() -> Self {
        Self::High(MiningModeHigh)
    }

    pub fn power_tuning(power: Option<u32>) -> Self {
        Self::PowerTuning(MiningModePowerTune { power })
    }

    pub fn hashrate_tuning(hashrate: Option<f64>) -> Self {
        Self::HashrateTuning(MiningModeHashrateTune { hashrate })
    }

    /// Antminer web UI: `bitmain-work-mode`, a number or a numeric string
    pub fn from_am_modern(raw: &Value) -> Self {
        or_default(Self::parse_antminer(raw), Vendor::AntminerModern)
    }

    /// Legacy Antminer web UI, same key as the modern one
    pub fn from_am_old(raw: &Value) -> Self {
        or_default(Self::parse_antminer(raw), Vendor::AntminerOld)
    }

    /// BOSminer TOML: the `autotuning` table
    pub fn from_bosminer(raw: &Value) -> Self {
        or_default(Self::parse_bosminer(raw), Vendor::BosMiner)
    }

    /// ePIC: the `PerpetualTune` section
    pub fn from_epic(raw: &Value) -> Self {
        or_default(Self::parse_epic(raw), Vendor::Epic)
    }

    fn parse_antminer(raw: &Value) -> Option<Self> {
        match as_u32_or_numeric_str(raw.get("bitmain-work-mode")?)? {
            0 => Some(Self::normal()),
            1 => Some(Self::sleep()),
            3 => Some(Self::low()),
            _ => None,
        }
    }

    fn parse_bosminer(raw: &Value) -> Option<Self> {
        let autotuning = raw.get("autotuning")?.as_object()?;
        if !autotuning.get("enabled")?.as_bool()? {
            return None;
        }
        let power = autotuning
            .get("psu_power_limit")
            .or_else(|| autotuning.get("power_target"))
            .and_then(as_u32);
        if power.is_some() {
            return Some(Self::power_tuning(power));
        }
        if let Some(hashrate) = autotuning.get("hashrate_target").and_then(Value::as_f64) {
            return Some(Self::hashrate_tuning(Some(hashrate)));
        }
        match autotuning.get("mode").and_then(Value::as_str) {
            Some("hashrate_target") => Some(Self::hashrate_tuning(None)),
            _ => Some(Self::power_tuning(None)),
        }
    }

    fn parse_epic(raw: &Value) -> Option<Self> {
        if !lookup_bool(raw, &["PerpetualTune", "Running"])? {
            return Some(Self::normal());
        }
        let algorithm = lookup(raw, &["PerpetualTune", "Algorithm"])?;
        let target = match algorithm.get("VoltageOptimizer") {
            Some(optimizer) => optimizer.get("Target").and_then(Value::as_f64),
            None => Some(lookup_f64(algorithm, &["ChipTune", "Target"])?),
        };
        Some(Self::hashrate_tuning(target))
    }
}

impl Default for MiningMode {
    fn default() -> Self {
        Self::default_variant()
    }
}

impl VariantOption for MiningMode {
    fn registry() -> &'static VariantRegistry<Self> {
        &REGISTRY
    }

    fn mode(&self) -> &'static str {
        match self {
            Self::Normal(v) => v.mode(),
            Self::Sleep(v) => v.mode(),
            Self::Low(v) => v.mode(),
            Self::High(v) => v.mode(),
            Self::PowerTuning(v) => v.mode(),
            Self::HashrateTuning(v) => v.mode(),
            Self::Manual(v) => v.mode(),
        }
    }
}

impl ConfigValue for MiningMode {
    fn encode(&self, vendor: Vendor) -> Fragment {
        match self {
            Self::Normal(v) => v.encode(vendor),
            Self::Sleep(v) => v.encode(vendor),
            Self::Low(v) => v.encode(vendor),
            Self::High(v) => v.encode(vendor),
            Self::PowerTuning(v) => v.encode(vendor),
            Self::HashrateTuning(v) => v.encode(vendor),
            Self::Manual(v) => v.encode(vendor),
        }
    }
}

impl ConfigAspect for MiningMode {
    const NAME: &'static str = "mining_mode";

    fn decode(vendor: Vendor, raw: &Value) -> Self {
        match vendor {
            Vendor::AntminerModern => Self::from_am_modern(raw),
            Vendor::AntminerOld => Self::from_am_old(raw),
            Vendor::BosMiner => Self::from_bosminer(raw),
            Vendor::Epic => Self::from_epic(raw),
            _ => Self::default(),
        }
    }
}
