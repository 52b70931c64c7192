//! Dynamic power scaling
//!
//! When enabled, the firmware lowers its power target in `power_step`
//! increments down to `minimum_power` as the miner overheats, and may shut
//! down entirely for a while once the floor is reached.
//!
//! The shutdown policy is three-valued: `None` (the source never mentioned
//! it), `Some(Enabled)` or `Some(Disabled)`. Vendor decoders keep the first
//! state distinct so that re-encoding does not invent a shutdown setting.

use serde::Serialize;
use serde_json::{Value, json};
use std::sync::LazyLock;

use crate::fragment::{Fragment, as_u32, insert_some};
use crate::proto::{self, DpsConfiguration, DpsPowerTarget, DpsTarget};
use crate::registry::VariantRegistry;
use crate::traits::aspect::or_default;
use crate::traits::{ConfigAspect, ConfigValue, VariantOption, VariantValue};
use crate::vendor::Vendor;

// ---------------------------------------------------------------------------
// Shutdown policy
// ---------------------------------------------------------------------------

/// Shut down at the power floor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ShutdownEnabled {
    /// How long to stay shut down, in hours
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
}

impl VariantValue for ShutdownEnabled {
    const MODE: &'static str = "enabled";

    fn from_canonical(conf: &Fragment) -> Self {
        Self {
            duration: conf.get("duration").and_then(as_u32),
        }
    }
}

impl ConfigValue for ShutdownEnabled {
    fn encode(&self, vendor: Vendor) -> Fragment {
        let mut frag = Fragment::new();
        match vendor {
            Vendor::BosMiner => {
                frag.insert("shutdown_enabled".to_string(), json!(true));
                insert_some(&mut frag, "shutdown_duration", self.duration);
            }
            Vendor::BosGrpc => {
                frag.insert("enable_shutdown".to_string(), json!(true));
                if let Some(hours) = proto::hours(self.duration) {
                    frag.insert("shutdown_duration".to_string(), json!({"hours": hours.hours}));
                }
            }
            _ => {}
        }
        frag
    }
}

/// Never shut down
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ShutdownDisabled;

impl VariantValue for ShutdownDisabled {
    const MODE: &'static str = "disabled";

    fn from_canonical(_conf: &Fragment) -> Self {
        Self
    }
}

impl ConfigValue for ShutdownDisabled {
    fn encode(&self, vendor: Vendor) -> Fragment {
        let mut frag = Fragment::new();
        match vendor {
            Vendor::BosMiner => {
                frag.insert("shutdown_enabled".to_string(), json!(false));
            }
            Vendor::BosGrpc => {
                frag.insert("enable_shutdown".to_string(), json!(false));
            }
            _ => {}
        }
        frag
    }
}

/// Shutdown behaviour once power scaling hits its floor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ShutdownPolicy {
    Enabled(ShutdownEnabled),
    Disabled(ShutdownDisabled),
}

static SHUTDOWN_REGISTRY: LazyLock<VariantRegistry<ShutdownPolicy>> = LazyLock::new(|| {
    VariantRegistry::new("shutdown_policy", ShutdownDisabled::MODE, |conf| {
        ShutdownPolicy::Disabled(ShutdownDisabled::from_canonical(conf))
    })
    .with_variant(ShutdownEnabled::MODE, |conf| {
        ShutdownPolicy::Enabled(ShutdownEnabled::from_canonical(conf))
    })
});

impl ShutdownPolicy {
    pub fn enabled(duration: Option<u32>) -> Self {
        Self::Enabled(ShutdownEnabled { duration })
    }

    pub fn disabled() -> Self {
        Self::Disabled(ShutdownDisabled)
    }

    /// Read `shutdown_enabled` / `shutdown_duration` from a BOSminer
    /// `power_scaling` table
    ///
    /// Returns `None` when the table does not mention shutdown at all.
    pub fn from_bosminer(power_scaling: &Fragment) -> Option<Self> {
        let enabled = power_scaling.get("shutdown_enabled")?.as_bool()?;
        if enabled {
            let duration = power_scaling.get("shutdown_duration").and_then(as_u32);
            Some(Self::enabled(duration))
        } else {
            Some(Self::disabled())
        }
    }

    /// Shutdown duration, if enabled with one
    pub fn duration(&self) -> Option<u32> {
        match self {
            Self::Enabled(v) => v.duration,
            Self::Disabled(_) => None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Enabled(_))
    }
}

impl Default for ShutdownPolicy {
    fn default() -> Self {
        Self::default_variant()
    }
}

impl VariantOption for ShutdownPolicy {
    fn registry() -> &'static VariantRegistry<Self> {
        &SHUTDOWN_REGISTRY
    }

    fn mode(&self) -> &'static str {
        match self {
            Self::Enabled(v) => v.mode(),
            Self::Disabled(v) => v.mode(),
        }
    }
}

impl ConfigValue for ShutdownPolicy {
    fn encode(&self, vendor: Vendor) -> Fragment {
        match self {
            Self::Enabled(v) => v.encode(vendor),
            Self::Disabled(v) => v.encode(vendor),
        }
    }
}

// ---------------------------------------------------------------------------
// Power scaling
// ---------------------------------------------------------------------------

/// Power scaling active
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PowerScalingEnabled {
    /// Watts removed from the power target per step
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power_step: Option<u32>,
    /// Lowest power target, in watts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_power: Option<u32>,
    /// `None` when no source specified a shutdown policy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shutdown_policy: Option<ShutdownPolicy>,
}

impl PowerScalingEnabled {
    /// Read an enabled BOSminer `power_scaling` table
    fn from_bosminer(table: &Fragment) -> Self {
        Self {
            power_step: table.get("power_step").and_then(as_u32),
            minimum_power: table.get("min_psu_power_limit").and_then(as_u32),
            shutdown_policy: ShutdownPolicy::from_bosminer(table),
        }
    }

    fn as_bosminer(&self) -> Fragment {
        let mut table = Fragment::new();
        table.insert("enabled".to_string(), json!(true));
        insert_some(&mut table, "power_step", self.power_step);
        insert_some(&mut table, "min_psu_power_limit", self.minimum_power);
        if let Some(policy) = &self.shutdown_policy {
            table.extend(policy.encode(Vendor::BosMiner));
        }

        let mut frag = Fragment::new();
        frag.insert("power_scaling".to_string(), Value::Object(table));
        frag
    }

    fn as_bos_grpc(&self) -> Fragment {
        let dps = DpsConfiguration {
            enable: true,
            target: Some(DpsTarget {
                power_target: DpsPowerTarget {
                    power_step: proto::watts(self.power_step),
                    min_power_target: proto::watts(self.minimum_power),
                },
            }),
            enable_shutdown: self.shutdown_policy.map(|p| p.is_enabled()),
            shutdown_duration: proto::hours(self.shutdown_policy.and_then(|p| p.duration())),
        };
        proto::message_fragment("dps", &dps)
    }
}

impl VariantValue for PowerScalingEnabled {
    const MODE: &'static str = "enabled";

    fn from_canonical(conf: &Fragment) -> Self {
        let shutdown_policy = match conf.get("shutdown_policy") {
            None | Some(Value::Null) => None,
            Some(policy) => Some(ShutdownPolicy::from_canonical(Some(policy))),
        };
        Self {
            power_step: conf.get("power_step").and_then(as_u32),
            minimum_power: conf.get("minimum_power").and_then(as_u32),
            shutdown_policy,
        }
    }
}

impl ConfigValue for PowerScalingEnabled {
    fn encode(&self, vendor: Vendor) -> Fragment {
        match vendor {
            Vendor::BosMiner => self.as_bosminer(),
            Vendor::BosGrpc => self.as_bos_grpc(),
            _ => Fragment::new(),
        }
    }
}

/// Power scaling off; the firmware keeps its configured power target
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PowerScalingDisabled;

impl VariantValue for PowerScalingDisabled {
    const MODE: &'static str = "disabled";

    fn from_canonical(_conf: &Fragment) -> Self {
        Self
    }
}

impl ConfigValue for PowerScalingDisabled {
    fn encode(&self, vendor: Vendor) -> Fragment {
        let mut frag = Fragment::new();
        match vendor {
            Vendor::BosMiner => {
                frag.insert("power_scaling".to_string(), json!({"enabled": false}));
            }
            Vendor::BosGrpc => {
                let dps = DpsConfiguration::default();
                frag = proto::message_fragment("dps", &dps);
            }
            _ => {}
        }
        frag
    }
}

/// Power scaling aspect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PowerScaling {
    Enabled(PowerScalingEnabled),
    Disabled(PowerScalingDisabled),
}

static REGISTRY: LazyLock<VariantRegistry<PowerScaling>> = LazyLock::new(|| {
    VariantRegistry::new("power_scaling", PowerScalingDisabled::MODE, |conf| {
        PowerScaling::Disabled(PowerScalingDisabled::from_canonical(conf))
    })
    .with_variant(PowerScalingEnabled::MODE, |conf| {
        PowerScaling::Enabled(PowerScalingEnabled::from_canonical(conf))
    })
});

impl PowerScaling {
    pub fn enabled(
        power_step: Option<u32>,
        minimum_power: Option<u32>,
        shutdown_policy: Option<ShutdownPolicy>,
    ) -> Self {
        Self::Enabled(PowerScalingEnabled {
            power_step,
            minimum_power,
            shutdown_policy,
        })
    }

    pub fn disabled() -> Self {
        Self::Disabled(PowerScalingDisabled)
    }

    /// BOSminer TOML: the `power_scaling` table
    pub fn from_bosminer(raw: &Value) -> Self {
        or_default(Self::parse_bosminer(raw), Vendor::BosMiner)
    }

    fn parse_bosminer(raw: &Value) -> Option<Self> {
        let table = raw.get("power_scaling")?.as_object()?;
        if table.get("enabled")?.as_bool()? {
            Some(Self::Enabled(PowerScalingEnabled::from_bosminer(table)))
        } else {
            Some(Self::disabled())
        }
    }
}

impl Default for PowerScaling {
    fn default() -> Self {
        Self::default_variant()
    }
}

impl VariantOption for PowerScaling {
    fn registry() -> &'static VariantRegistry<Self> {
        &REGISTRY
    }

    fn mode(&self) -> &'static str {
        match self {
            Self::Enabled(v) => v.mode(),
            Self::Disabled(v) => v.mode(),
        }
    }
}

impl ConfigValue for PowerScaling {
    fn encode(&self, vendor: Vendor) -> Fragment {
        match self {
            Self::Enabled(v) => v.encode(vendor),
            Self::Disabled(v) => v.encode(vendor),
        }
    }
}

impl ConfigAspect for PowerScaling {
    const NAME: &'static str = "power_scaling";

    fn decode(vendor: Vendor, raw: &Value) -> Self {
        match vendor {
            Vendor::BosMiner => Self::from_bosminer(raw),
            _ => Self::default(),
        }
    }
}
