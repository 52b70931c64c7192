//! Firmware dialects the codecs understand
//!
//! Every vendor payload is handled in memory as a [`serde_json::Value`]. The
//! BOSminer daemon speaks TOML on the wire; [`Vendor::parse_payload`] and
//! [`Vendor::render_payload`] convert between the wire text and that value.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// External control-plane schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Vendor {
    /// cgminer-style RPC API (`POOLS` response), decode only
    #[serde(rename = "api")]
    Api,
    /// Antminer web UI, current firmware
    #[serde(rename = "am_modern")]
    AntminerModern,
    /// Antminer web UI, legacy firmware
    #[serde(rename = "am_old")]
    AntminerOld,
    /// Whatsminer RPC
    #[serde(rename = "wm")]
    Whatsminer,
    /// Goldshell web UI
    #[serde(rename = "goldshell")]
    Goldshell,
    /// Avalon RPC
    #[serde(rename = "avalon")]
    Avalon,
    /// Innosilicon web UI
    #[serde(rename = "inno")]
    Innosilicon,
    /// BOSminer daemon TOML
    #[serde(rename = "bosminer")]
    BosMiner,
    /// BOSminer gRPC message fragments
    #[serde(rename = "bos_grpc")]
    BosGrpc,
    /// ePIC UMC web API
    #[serde(rename = "epic")]
    Epic,
}

/// Wire syntax of a vendor payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadFormat {
    Json,
    Toml,
}

impl Vendor {
    /// All known vendors
    pub const ALL: [Vendor; 10] = [
        Vendor::Api,
        Vendor::AntminerModern,
        Vendor::AntminerOld,
        Vendor::Whatsminer,
        Vendor::Goldshell,
        Vendor::Avalon,
        Vendor::Innosilicon,
        Vendor::BosMiner,
        Vendor::BosGrpc,
        Vendor::Epic,
    ];

    /// Stable short name, as used in configuration and on the command line
    pub fn name(&self) -> &'static str {
        match self {
            Vendor::Api => "api",
            Vendor::AntminerModern => "am_modern",
            Vendor::AntminerOld => "am_old",
            Vendor::Whatsminer => "wm",
            Vendor::Goldshell => "goldshell",
            Vendor::Avalon => "avalon",
            Vendor::Innosilicon => "inno",
            Vendor::BosMiner => "bosminer",
            Vendor::BosGrpc => "bos_grpc",
            Vendor::Epic => "epic",
        }
    }

    /// Wire syntax used by this vendor
    pub fn payload_format(&self) -> PayloadFormat {
        match self {
            Vendor::BosMiner => PayloadFormat::Toml,
            _ => PayloadFormat::Json,
        }
    }

    /// Parse wire text into the in-memory payload representation
    pub fn parse_payload(&self, text: &str) -> Result<Value> {
        match self.payload_format() {
            PayloadFormat::Json => Ok(serde_json::from_str(text)?),
            PayloadFormat::Toml => Ok(toml::from_str::<Value>(text)?),
        }
    }

    /// Render an encoded payload as wire text
    ///
    /// TOML has no null, so a payload containing one fails to render.
    pub fn render_payload(&self, payload: &Value) -> Result<String> {
        match self.payload_format() {
            PayloadFormat::Json => Ok(serde_json::to_string_pretty(payload)?),
            PayloadFormat::Toml => {
                if !payload.is_object() {
                    return Err(Error::invalid_input(
                        "TOML payload must be a table at the top level",
                    ));
                }
                Ok(toml::to_string(payload)?)
            }
        }
    }
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Vendor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        Vendor::ALL
            .into_iter()
            .find(|v| v.name() == wanted)
            .ok_or_else(|| Error::unsupported_vendor(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_vendor_names_round_trip() {
        for vendor in Vendor::ALL {
            assert_eq!(vendor.name().parse::<Vendor>().unwrap(), vendor);
            assert_eq!(
                serde_json::to_value(vendor).unwrap(),
                Value::String(vendor.name().to_string())
            );
        }
    }

    #[test]
    fn test_unknown_vendor() {
        let err = "antminer9000".parse::<Vendor>().unwrap_err();
        assert!(matches!(err, Error::UnsupportedVendor(_)));
    }

    #[test]
    fn test_bosminer_payload_is_toml() {
        let text = "[temp_control]\nmode = \"manual\"\n\n[fan_control]\nspeed = 80\nmin_fans = 1\n";
        let payload = Vendor::BosMiner.parse_payload(text).unwrap();
        assert_eq!(
            payload,
            json!({"temp_control": {"mode": "manual"}, "fan_control": {"speed": 80, "min_fans": 1}})
        );

        let rendered = Vendor::BosMiner.render_payload(&payload).unwrap();
        assert_eq!(Vendor::BosMiner.parse_payload(&rendered).unwrap(), payload);
    }

    #[test]
    fn test_toml_rejects_non_table() {
        assert!(Vendor::BosMiner.render_payload(&json!([1, 2])).is_err());
    }

    #[test]
    fn test_json_payload() {
        let payload = Vendor::AntminerModern
            .parse_payload(r#"{"bitmain-fan-ctrl": false}"#)
            .unwrap();
        assert_eq!(payload, json!({"bitmain-fan-ctrl": false}));
    }
}
