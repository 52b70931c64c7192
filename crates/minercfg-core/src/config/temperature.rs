//! Temperature thresholds
//!
//! A plain aspect: three independently optional thresholds in °C. `None`
//! means no source specified the threshold; it is never read as zero.

use serde::Serialize;
use serde_json::{Value, json};

use crate::fragment::{Fragment, insert_some, lookup_i64, nested};
use crate::merge::merge;
use crate::traits::aspect::or_default;
use crate::traits::{ConfigAspect, ConfigValue};
use crate::vendor::Vendor;

/// Temperature thresholds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TemperatureConfig {
    /// Temperature the fan controller aims for
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<i64>,
    /// Temperature at which the miner starts throttling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hot: Option<i64>,
    /// Temperature at which the miner shuts down
    #[serde(skip_serializing_if = "Option::is_none")]
    pub danger: Option<i64>,
}

impl TemperatureConfig {
    pub fn new(target: Option<i64>, hot: Option<i64>, danger: Option<i64>) -> Self {
        Self {
            target,
            hot,
            danger,
        }
    }

    /// Canonical decode; a missing or mistyped threshold stays `None`
    pub fn from_canonical(conf: Option<&Value>) -> Self {
        let Some(conf) = conf.and_then(Value::as_object) else {
            return Self::default();
        };
        let field = |key: &str| conf.get(key).and_then(Value::as_i64);
        Self {
            target: field("target"),
            hot: field("hot"),
            danger: field("danger"),
        }
    }

    /// BOSminer TOML: the `temp_control` table
    pub fn from_bosminer(raw: &Value) -> Self {
        let decoded = raw
            .get("temp_control")
            .and_then(Value::as_object)
            .map(|table| {
                let field = |key: &str| table.get(key).and_then(Value::as_i64);
                Self {
                    target: field("target_temp"),
                    hot: field("hot_temp"),
                    danger: field("dangerous_temp"),
                }
            });
        or_default(decoded, Vendor::BosMiner)
    }

    /// ePIC: target and hot live in unrelated subtrees
    ///
    /// Each lookup stands alone, so a missing `Misc` table does not hide the
    /// fan target and vice versa. ePIC has no danger threshold.
    pub fn from_epic(raw: &Value) -> Self {
        let hot = lookup_i64(raw, &["Misc", "Shutdown Temp"]);
        let target = lookup_i64(raw, &["Fans", "Fan Mode", "Auto", "Target Temperature"]);
        Self {
            target,
            hot,
            danger: None,
        }
    }

    fn as_bosminer(&self) -> Fragment {
        let mut table = Fragment::new();
        insert_some(&mut table, "target_temp", self.target);
        insert_some(&mut table, "hot_temp", self.hot);
        insert_some(&mut table, "dangerous_temp", self.danger);

        let mut frag = Fragment::new();
        frag.insert("temp_control".to_string(), Value::Object(table));
        frag
    }

    fn as_epic(&self) -> Fragment {
        let mut frag = Fragment::new();
        if let Some(hot) = self.hot {
            frag = merge(&frag, &nested(&["Misc", "Shutdown Temp"], json!(hot)));
        }
        if let Some(target) = self.target {
            let path = ["Fans", "Fan Mode", "Auto", "Target Temperature"];
            frag = merge(&frag, &nested(&path, json!(target)));
        }
        frag
    }
}

impl ConfigValue for TemperatureConfig {
    fn encode(&self, vendor: Vendor) -> Fragment {
        match vendor {
            Vendor::BosMiner => self.as_bosminer(),
            Vendor::Epic => self.as_epic(),
            _ => Fragment::new(),
        }
    }
}

impl ConfigAspect for TemperatureConfig {
    const NAME: &'static str = "temperature";

    fn decode(vendor: Vendor, raw: &Value) -> Self {
        match vendor {
            Vendor::BosMiner => Self::from_bosminer(raw),
            Vendor::Epic => Self::from_epic(raw),
            _ => Self::default(),
        }
    }
}
