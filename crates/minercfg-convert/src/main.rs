// # minercfg-convert - Miner configuration converter
//
// A THIN layer over minercfg-core: reads one payload from stdin, decodes it
// with the source dialect, encodes it with the target dialect and writes the
// result to stdout. No codec logic lives here.
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// - `MINERCFG_FROM`: Source dialect (`canonical` or a vendor name)
// - `MINERCFG_TO`: Target dialect (`canonical` or a vendor name)
// - `MINERCFG_USER_SUFFIX`: Appended to every pool worker name (optional)
// - `MINERCFG_LOG_LEVEL`: trace, debug, info, warn, error (default: info)
//
// Vendor names: api, am_modern, am_old, wm, goldshell, avalon, inno,
// bosminer, bos_grpc, epic. BOSminer payloads are TOML, all others JSON.
//
// ## Example
//
// ```bash
// export MINERCFG_FROM=am_modern
// export MINERCFG_TO=bosminer
// export MINERCFG_USER_SUFFIX=.rack7
//
// minercfg-convert < antminer.json > bosminer.toml
// ```

use anyhow::{Context, Result};
use minercfg_core::{MinerConfig, Vendor};
use serde_json::Value;
use std::env;
use std::fmt;
use std::io::{self, Read, Write};
use std::process::ExitCode;
use tracing::{Level, debug, error, info};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
///
/// - 0: Conversion written
/// - 1: Configuration or startup error
/// - 2: Conversion error (unreadable input, unrenderable output)
#[derive(Debug, Clone, Copy)]
enum ConvertExitCode {
    Success = 0,
    ConfigError = 1,
    ConversionError = 2,
}

impl From<ConvertExitCode> for ExitCode {
    fn from(code: ConvertExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// One side of a conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dialect {
    /// The core's own vendor-independent JSON form
    Canonical,
    Vendor(Vendor),
}

impl Dialect {
    fn parse(name: &str) -> Result<Self> {
        if name.trim().eq_ignore_ascii_case("canonical") {
            return Ok(Self::Canonical);
        }
        let vendor = name.parse::<Vendor>().with_context(|| {
            let known: Vec<&str> = Vendor::ALL.iter().map(Vendor::name).collect();
            format!("expected 'canonical' or one of: {}", known.join(", "))
        })?;
        Ok(Self::Vendor(vendor))
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Canonical => f.write_str("canonical"),
            Self::Vendor(vendor) => write!(f, "{vendor}"),
        }
    }
}

/// Application configuration
#[derive(Debug)]
struct Config {
    from: String,
    to: String,
    user_suffix: Option<String>,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            from: lookup("MINERCFG_FROM").context("MINERCFG_FROM is required")?,
            to: lookup("MINERCFG_TO").context("MINERCFG_TO is required")?,
            user_suffix: lookup("MINERCFG_USER_SUFFIX").filter(|s| !s.is_empty()),
            log_level: lookup("MINERCFG_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Validate the configuration, resolving both dialects
    fn validate(&self) -> Result<(Dialect, Dialect)> {
        let from = Dialect::parse(&self.from)
            .with_context(|| format!("MINERCFG_FROM '{}' is not supported", self.from))?;
        let to = Dialect::parse(&self.to)
            .with_context(|| format!("MINERCFG_TO '{}' is not supported", self.to))?;

        if let Some(suffix) = &self.user_suffix
            && suffix.chars().any(|c| c.is_whitespace() || c == ',')
        {
            anyhow::bail!(
                "MINERCFG_USER_SUFFIX must not contain whitespace or commas. Got: '{}'",
                suffix
            );
        }

        self.level()?;
        Ok((from, to))
    }

    fn level(&self) -> Result<Level> {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Ok(Level::TRACE),
            "debug" => Ok(Level::DEBUG),
            "info" => Ok(Level::INFO),
            "warn" => Ok(Level::WARN),
            "error" => Ok(Level::ERROR),
            _ => anyhow::bail!(
                "MINERCFG_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }
    }
}

fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return ConvertExitCode::ConfigError.into();
        }
    };

    let (from, to) = match config.validate() {
        Ok(dialects) => dialects,
        Err(e) => {
            eprintln!("Configuration validation error: {:#}", e);
            return ConvertExitCode::ConfigError.into();
        }
    };

    // Logs go to stderr; stdout carries the payload
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.level().unwrap_or(Level::INFO))
        .with_writer(io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return ConvertExitCode::ConfigError.into();
    }

    info!(%from, %to, "converting miner configuration");

    let result = read_stdin()
        .and_then(|input| convert(&input, from, to, config.user_suffix.as_deref()))
        .and_then(|output| write_stdout(&output));

    match result {
        Ok(()) => ConvertExitCode::Success.into(),
        Err(e) => {
            error!("Conversion failed: {:#}", e);
            ConvertExitCode::ConversionError.into()
        }
    }
}

/// Decode `input` as `from` and render it as `to`
fn convert(input: &str, from: Dialect, to: Dialect, user_suffix: Option<&str>) -> Result<String> {
    let config = match from {
        Dialect::Canonical => {
            let value: Value =
                serde_json::from_str(input).context("input is not valid JSON")?;
            MinerConfig::try_from_canonical(&value)?
        }
        Dialect::Vendor(vendor) => {
            let raw = vendor
                .parse_payload(input)
                .with_context(|| format!("input is not a valid {vendor} payload"))?;
            MinerConfig::decode(vendor, &raw)
        }
    };
    debug!(?config, "decoded configuration");

    match to {
        Dialect::Canonical => Ok(serde_json::to_string_pretty(&config.to_canonical())?),
        Dialect::Vendor(vendor) => {
            let payload = Value::Object(config.encode(vendor, user_suffix));
            vendor
                .render_payload(&payload)
                .with_context(|| format!("cannot render {vendor} payload"))
        }
    }
}

fn read_stdin() -> Result<String> {
    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("failed to read stdin")?;
    Ok(input)
}

fn write_stdout(output: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{output}").context("failed to write stdout")?;
    stdout.flush().context("failed to flush stdout")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_minimal_config() {
        let cfg = config(&[("MINERCFG_FROM", "am_modern"), ("MINERCFG_TO", "bosminer")]).unwrap();
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.user_suffix, None);
        assert_eq!(
            cfg.validate().unwrap(),
            (
                Dialect::Vendor(Vendor::AntminerModern),
                Dialect::Vendor(Vendor::BosMiner)
            )
        );
    }

    #[test]
    fn test_missing_dialect() {
        assert!(config(&[("MINERCFG_FROM", "am_modern")]).is_err());
        assert!(config(&[("MINERCFG_TO", "canonical")]).is_err());
    }

    #[test]
    fn test_unknown_vendor_rejected() {
        let cfg = config(&[("MINERCFG_FROM", "antminer"), ("MINERCFG_TO", "canonical")]).unwrap();
        let err = cfg.validate().unwrap_err();
        assert!(format!("{err:#}").contains("MINERCFG_FROM 'antminer'"));
    }

    #[test]
    fn test_canonical_is_case_insensitive() {
        let cfg = config(&[("MINERCFG_FROM", "Canonical"), ("MINERCFG_TO", " EPIC ")]).unwrap();
        assert_eq!(
            cfg.validate().unwrap(),
            (Dialect::Canonical, Dialect::Vendor(Vendor::Epic))
        );
    }

    #[test]
    fn test_log_level_validation() {
        let cfg = config(&[
            ("MINERCFG_FROM", "canonical"),
            ("MINERCFG_TO", "canonical"),
            ("MINERCFG_LOG_LEVEL", "verbose"),
        ])
        .unwrap();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_user_suffix() {
        let empty = config(&[
            ("MINERCFG_FROM", "canonical"),
            ("MINERCFG_TO", "wm"),
            ("MINERCFG_USER_SUFFIX", ""),
        ])
        .unwrap();
        assert_eq!(empty.user_suffix, None);

        let bad = config(&[
            ("MINERCFG_FROM", "canonical"),
            ("MINERCFG_TO", "wm"),
            ("MINERCFG_USER_SUFFIX", ".a b"),
        ])
        .unwrap();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_convert_antminer_to_bosminer() {
        let input = r#"{"bitmain-fan-ctrl": true, "bitmain-fan-pwm": "80"}"#;
        let output = convert(
            input,
            Dialect::Vendor(Vendor::AntminerModern),
            Dialect::Vendor(Vendor::BosMiner),
            None,
        )
        .unwrap();
        let parsed = Vendor::BosMiner.parse_payload(&output).unwrap();
        assert_eq!(parsed["temp_control"]["mode"], "manual");
        assert_eq!(parsed["fan_control"]["speed"], 80);
        assert_eq!(parsed["fan_control"]["min_fans"], 1);
    }

    #[test]
    fn test_convert_rejects_bad_input() {
        let from = Dialect::Vendor(Vendor::BosMiner);
        assert!(convert("[[[", from, Dialect::Canonical, None).is_err());

        let strict = r#"{"fan_mode": {"mode": "turbo"}}"#;
        assert!(convert(strict, Dialect::Canonical, Dialect::Canonical, None).is_err());
    }
}
