//! Fan mode aspect
//!
//! Three variants: `normal` (firmware-managed), `manual` (fixed PWM with a
//! minimum fan count) and `immersion` (fan control disabled).

use serde::Serialize;
use serde_json::{Value, json};
use std::sync::LazyLock;

use crate::fragment::{Fragment, as_u32, as_u32_or_numeric_str, lookup, lookup_str, nested};
use crate::registry::VariantRegistry;
use crate::traits::aspect::or_default;
use crate::traits::{ConfigAspect, ConfigValue, VariantOption, VariantValue};
use crate::vendor::Vendor;

/// Firmware-managed fan speed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FanModeNormal;

impl VariantValue for FanModeNormal {
    const MODE: &'static str = "normal";

    fn from_canonical(_conf: &Fragment) -> Self {
        Self
    }
}

impl ConfigValue for FanModeNormal {
    fn encode(&self, vendor: Vendor) -> Fragment {
        match vendor {
            Vendor::AntminerModern | Vendor::AntminerOld => antminer_fan(false, "100"),
            Vendor::BosMiner => nested(&["temp_control", "mode"], json!("auto")),
            Vendor::Epic => nested(&["Fans", "Fan Mode", "Auto"], json!({})),
            _ => Fragment::new(),
        }
    }
}

/// Fixed fan speed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FanModeManual {
    /// PWM duty cycle, percent
    pub speed: u32,
    /// Fans that must be spinning before the miner starts hashing
    pub minimum_fans: u32,
}

impl FanModeManual {
    pub const DEFAULT_SPEED: u32 = 100;
    pub const DEFAULT_MINIMUM_FANS: u32 = 1;

    /// Manual mode with every field given
    pub fn new(speed: u32, minimum_fans: u32) -> Self {
        Self {
            speed,
            minimum_fans,
        }
    }

    /// Manual mode at `speed`, default fan count
    pub fn with_speed(speed: u32) -> Self {
        Self {
            speed,
            ..Self::default()
        }
    }

    /// Read BOSminer's `fan_control` table
    fn from_bosminer(fan_control: &Fragment) -> Self {
        Self {
            speed: fan_control
                .get("speed")
                .and_then(as_u32)
                .unwrap_or(Self::DEFAULT_SPEED),
            minimum_fans: fan_control
                .get("min_fans")
                .and_then(as_u32)
                .unwrap_or(Self::DEFAULT_MINIMUM_FANS),
        }
    }
}

impl Default for FanModeManual {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SPEED, Self::DEFAULT_MINIMUM_FANS)
    }
}

impl VariantValue for FanModeManual {
    const MODE: &'static str = "manual";

    fn from_canonical(conf: &Fragment) -> Self {
        Self {
            speed: conf
                .get("speed")
                .and_then(as_u32)
                .unwrap_or(Self::DEFAULT_SPEED),
            minimum_fans: conf
                .get("minimum_fans")
                .and_then(as_u32)
                .unwrap_or(Self::DEFAULT_MINIMUM_FANS),
        }
    }
}

impl ConfigValue for FanModeManual {
    fn encode(&self, vendor: Vendor) -> Fragment {
        match vendor {
            Vendor::AntminerModern | Vendor::AntminerOld => {
                antminer_fan(true, &self.speed.to_string())
            }
            Vendor::BosMiner => {
                let mut frag = nested(&["temp_control", "mode"], json!("manual"));
                frag.insert(
                    "fan_control".to_string(),
                    json!({"min_fans": self.minimum_fans, "speed": self.speed}),
                );
                frag
            }
            Vendor::Epic => nested(&["Fans", "Fan Mode", "Manual"], json!(self.speed)),
            _ => Fragment::new(),
        }
    }
}

/// Fan control disabled, for immersion cooling
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FanModeImmersion;

impl VariantValue for FanModeImmersion {
    const MODE: &'static str = "immersion";

    fn from_canonical(_conf: &Fragment) -> Self {
        Self
    }
}

impl ConfigValue for FanModeImmersion {
    fn encode(&self, vendor: Vendor) -> Fragment {
        match vendor {
            Vendor::AntminerModern | Vendor::AntminerOld => antminer_fan(true, "0"),
            Vendor::BosMiner => nested(&["temp_control", "mode"], json!("disabled")),
            Vendor::Epic => nested(&["Fans", "Fan Mode", "Immersion"], json!(true)),
            _ => Fragment::new(),
        }
    }
}

fn antminer_fan(manual: bool, pwm: &str) -> Fragment {
    let mut frag = Fragment::new();
    frag.insert("bitmain-fan-ctrl".to_string(), json!(manual));
    frag.insert("bitmain-fan-pwm".to_string(), json!(pwm));
    frag
}

/// Fan mode aspect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum FanMode {
    Normal(FanModeNormal),
    Manual(FanModeManual),
    Immersion(FanModeImmersion),
}

static REGISTRY: LazyLock<VariantRegistry<FanMode>> = LazyLock::new(|| {
    VariantRegistry::new("fan_mode", FanModeNormal::MODE, |conf| {
        FanMode::Normal(FanModeNormal::from_canonical(conf))
    })
    .with_variant(FanModeManual::MODE, |conf| {
        FanMode::Manual(FanModeManual::from_canonical(conf))
    })
    .with_variant(FanModeImmersion::MODE, |conf| {
        FanMode::Immersion(FanModeImmersion::from_canonical(conf))
    })
});

impl FanMode {
    pub fn normal() -> Self {
        Self::Normal(FanModeNormal)
    }

    pub fn manual(speed: u32, minimum_fans: u32) -> Self {
        Self::Manual(FanModeManual::new(speed, minimum_fans))
    }

    pub fn immersion() -> Self {
        Self::Immersion(FanModeImmersion)
    }

    /// Antminer web UI: `bitmain-fan-ctrl` + `bitmain-fan-pwm`
    ///
    /// A false control flag means normal whatever the PWM says; a true flag
    /// needs a readable PWM value.
    pub fn from_am_modern(raw: &Value) -> Self {
        or_default(Self::parse_antminer(raw), Vendor::AntminerModern)
    }

    /// Legacy Antminer web UI, same keys as the modern one
    pub fn from_am_old(raw: &Value) -> Self {
        or_default(Self::parse_antminer(raw), Vendor::AntminerOld)
    }

    /// ePIC: presence of `Fans.Fan Mode.Manual` selects manual mode
    pub fn from_epic(raw: &Value) -> Self {
        or_default(Self::parse_epic(raw), Vendor::Epic)
    }

    /// BOSminer TOML: `temp_control.mode` plus the optional `fan_control` table
    pub fn from_bosminer(raw: &Value) -> Self {
        or_default(Self::parse_bosminer(raw), Vendor::BosMiner)
    }

    fn parse_antminer(raw: &Value) -> Option<Self> {
        let manual = raw.get("bitmain-fan-ctrl")?.as_bool()?;
        if !manual {
            return Some(Self::normal());
        }
        let speed = as_u32_or_numeric_str(raw.get("bitmain-fan-pwm")?)?;
        Some(Self::Manual(FanModeManual::with_speed(speed)))
    }

    fn parse_epic(raw: &Value) -> Option<Self> {
        let fan_mode = lookup(raw, &["Fans", "Fan Mode"])?.as_object()?;
        if fan_mode.get("Immersion").and_then(Value::as_bool) == Some(true) {
            return Some(Self::immersion());
        }
        match fan_mode.get("Manual").and_then(as_u32) {
            Some(speed) => Some(Self::Manual(FanModeManual::with_speed(speed))),
            None => Some(Self::normal()),
        }
    }

    fn parse_bosminer(raw: &Value) -> Option<Self> {
        match lookup_str(raw, &["temp_control", "mode"])? {
            "auto" => Some(Self::normal()),
            "manual" => {
                let manual = match raw.get("fan_control").and_then(Value::as_object) {
                    Some(table) if !table.is_empty() => FanModeManual::from_bosminer(table),
                    _ => FanModeManual::default(),
                };
                Some(Self::Manual(manual))
            }
            "disabled" => Some(Self::immersion()),
            _ => None,
        }
    }
}

impl Default for FanMode {
    fn default() -> Self {
        Self::default_variant()
    }
}

impl VariantOption for FanMode {
    fn registry() -> &'static VariantRegistry<Self> {
        &REGISTRY
    }

    fn mode(&self) -> &'static str {
        match self {
            Self::Normal(v) => v.mode(),
            Self::Manual(v) => v.mode(),
            Self::Immersion(v) => v.mode(),
        }
    }
}

impl ConfigValue for FanMode {
    fn encode(&self, vendor: Vendor) -> Fragment {
        match self {
            Self::Normal(v) => v.encode(vendor),
            Self::Manual(v) => v.encode(vendor),
            Self::Immersion(v) => v.encode(vendor),
        }
    }
}

impl ConfigAspect for FanMode {
    const NAME: &'static str = "fan_mode";

    fn decode(vendor: Vendor, raw: &Value) -> Self {
        match vendor {
            Vendor::AntminerModern => Self::from_am_modern(raw),
            Vendor::AntminerOld => Self::from_am_old(raw),
            Vendor::Epic => Self::from_epic(raw),
            Vendor::BosMiner => Self::from_bosminer(raw),
            _ => Self::default(),
        }
    }
}
