// # minercfg-core
//
// Vendor-agnostic configuration model for ASIC miners, with codecs for the
// control-plane schemas of each firmware family.
//
// ## Architecture Overview
//
// - **MinerConfig**: aggregate of five aspects (pools, fan mode, temperature,
//   mining mode, power scaling)
// - **VariantOption / VariantValue**: tagged-union aspects with a `mode`
//   discriminant and a designated default
// - **VariantRegistry**: per-aspect tag → constructor table used by the
//   canonical decoder
// - **ConfigValue / ConfigAspect**: per-vendor encode and decode
// - **merge**: deep union of encoded fragments
//
// ## Design Principles
//
// 1. **Total decoders**: anything unreadable becomes the aspect default
// 2. **Sparse encoders**: unset optional fields emit no key
// 3. **No I/O**: payloads come in and go out as values; transports live
//    elsewhere

pub mod config;
pub mod error;
pub mod fragment;
pub mod merge;
pub mod proto;
pub mod registry;
pub mod traits;
pub mod vendor;

// Re-export core types for convenience
pub use config::{
    FanMode, MinerConfig, MiningMode, Pool, PoolConfig, PoolGroup, PowerScaling, ShutdownPolicy,
    TemperatureConfig,
};
pub use error::{Error, Result};
pub use fragment::Fragment;
pub use merge::{merge, union};
pub use registry::VariantRegistry;
pub use traits::{ConfigAspect, ConfigValue, VariantOption, VariantValue};
pub use vendor::{PayloadFormat, Vendor};
