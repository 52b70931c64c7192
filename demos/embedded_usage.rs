//! Minimal embedding example for minercfg-core
//!
//! Reads an Antminer web UI configuration, adjusts it, and renders it for a
//! BOSminer daemon and for the BOSminer gRPC API. Transport is left to the
//! application; the core only turns values into values.

use minercfg_core::{
    FanMode, MinerConfig, MiningMode, PowerScaling, Result, ShutdownPolicy, TemperatureConfig,
    Vendor,
};
use serde_json::{Value, json};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    // What an Antminer returns from its `get_miner_conf` endpoint
    let antminer = json!({
        "bitmain-fan-ctrl": true,
        "bitmain-fan-pwm": "70",
        "bitmain-work-mode": "0",
        "pools": [
            {"url": "stratum+tcp://pool.example:3333", "user": "farm", "pass": "x"},
            {"url": "", "user": "", "pass": ""},
            {"url": "", "user": "", "pass": ""}
        ]
    });

    let mut config = MinerConfig::from_am_modern(&antminer);
    info!(fan = ?config.fan_mode, "decoded Antminer configuration");

    // Settings the Antminer UI cannot express
    config.temperature = TemperatureConfig::new(Some(72), Some(88), Some(98));
    config.mining_mode = MiningMode::power_tuning(Some(3100));
    config.power_scaling =
        PowerScaling::enabled(Some(150), Some(2200), Some(ShutdownPolicy::enabled(Some(2))));

    let toml = Vendor::BosMiner.render_payload(&Value::Object(config.as_bosminer(Some(".s19"))))?;
    println!("--- bosminer.toml ---\n{toml}");

    let grpc = config.as_bos_grpc(None);
    println!("--- gRPC fragments ---\n{}", serde_json::to_string_pretty(&grpc)?);

    // The canonical form is what an application persists
    let canonical = config.to_canonical();
    println!("--- canonical ---\n{}", serde_json::to_string_pretty(&canonical)?);

    let restored = MinerConfig::try_from_canonical(&canonical)?;
    assert_eq!(restored, config);
    assert_ne!(restored.fan_mode, FanMode::default());

    info!("configuration survived the canonical round trip");
    Ok(())
}
