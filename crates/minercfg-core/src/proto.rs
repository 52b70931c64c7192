//! BOSminer gRPC message fragments
//!
//! Typed mirrors of the few `braiins.bos.v1` messages the encoders produce.
//! They are serialized into fragments with their proto field names, so a
//! transport layer can feed them straight into a request builder. Unset
//! optional fields are skipped, matching proto3 presence.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::fragment::{Fragment, nested};

/// Power in watts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Power {
    pub watt: u64,
}

/// Hashrate in terahashes per second
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TeraHashrate {
    pub terahash_per_second: f64,
}

/// Duration in hours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hours {
    pub hours: u32,
}

/// Power-based DPS targets
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DpsPowerTarget {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power_step: Option<Power>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_power_target: Option<Power>,
}

/// DPS target policy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DpsTarget {
    pub power_target: DpsPowerTarget,
}

/// Dynamic power scaling configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DpsConfiguration {
    pub enable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<DpsTarget>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_shutdown: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shutdown_duration: Option<Hours>,
}

/// Tuner target for performance mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TunerMode {
    PowerTarget {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        power_target: Option<Power>,
    },
    HashrateTarget {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        hashrate_target: Option<TeraHashrate>,
    },
}

/// Performance mode configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMode {
    pub tuner_mode: TunerMode,
}

/// Wrap a serialized message under `key`
///
/// Serializing these plain structs cannot fail; should it ever, the fragment
/// is left empty rather than carrying a half-built message.
pub(crate) fn message_fragment<T: Serialize>(key: &str, message: &T) -> Fragment {
    match serde_json::to_value(message) {
        Ok(value) => nested(&[key], value),
        Err(err) => {
            warn!(message = key, error = %err, "failed to serialize message");
            Fragment::new()
        }
    }
}

pub(crate) fn watts(value: Option<u32>) -> Option<Power> {
    value.map(|w| Power { watt: u64::from(w) })
}

pub(crate) fn hours(value: Option<u32>) -> Option<Hours> {
    value.map(|hours| Hours { hours })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dps_serialization_is_sparse() {
        let dps = DpsConfiguration {
            enable: true,
            target: Some(DpsTarget {
                power_target: DpsPowerTarget {
                    power_step: watts(Some(100)),
                    min_power_target: None,
                },
            }),
            enable_shutdown: None,
            shutdown_duration: None,
        };

        assert_eq!(
            serde_json::to_value(&dps).unwrap(),
            json!({"enable": true, "target": {"power_target": {"power_step": {"watt": 100}}}})
        );
    }

    #[test]
    fn test_unit_wrappers() {
        assert_eq!(watts(Some(5)), Some(Power { watt: 5 }));
        assert_eq!(hours(Some(3)), Some(Hours { hours: 3 }));
        assert_eq!(hours(None), None);
    }

    #[test]
    fn test_tuner_mode_shape() {
        let mode = PerformanceMode {
            tuner_mode: TunerMode::PowerTarget {
                power_target: watts(Some(3000)),
            },
        };
        assert_eq!(
            serde_json::to_value(&mode).unwrap(),
            json!({"tuner_mode": {"power_target": {"power_target": {"watt": 3000}}}})
        );
    }
}
