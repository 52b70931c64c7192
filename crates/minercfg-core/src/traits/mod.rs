//! Core traits for the configuration model
//!
//! - [`VariantValue`]: one concrete, tagged payload shape of a variant aspect
//! - [`VariantOption`]: the closed set of variants for one aspect
//! - [`ConfigValue`]: anything that renders vendor fragments
//! - [`ConfigAspect`]: a top-level aspect of [`crate::MinerConfig`]

pub mod aspect;
pub mod variant;

pub use aspect::{ConfigAspect, ConfigValue};
pub use variant::{VariantOption, VariantValue};
