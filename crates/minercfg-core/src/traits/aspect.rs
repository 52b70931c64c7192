//! Vendor-facing aspect traits

use serde_json::Value;
use tracing::debug;

use crate::fragment::Fragment;
use crate::vendor::Vendor;

/// Renders the subset of a vendor schema that a value affects
///
/// Encoding is sparse: unset optional fields produce no key, and a vendor that
/// cannot express the value at all gets an empty fragment.
pub trait ConfigValue {
    /// Encode for `vendor`
    fn encode(&self, vendor: Vendor) -> Fragment;
}

/// One top-level aspect of [`crate::MinerConfig`]
pub trait ConfigAspect: ConfigValue + Default + Sized {
    /// Key of this aspect in the canonical form
    const NAME: &'static str;

    /// Decode from one vendor's raw payload
    ///
    /// Total: anything the vendor adapter cannot make sense of yields
    /// `Self::default()`.
    fn decode(vendor: Vendor, raw: &Value) -> Self;
}

/// Resolve a vendor decode attempt, falling back to the aspect default
pub(crate) fn or_default<A: ConfigAspect>(decoded: Option<A>, vendor: Vendor) -> A {
    decoded.unwrap_or_else(|| {
        debug!(aspect = A::NAME, %vendor, "vendor payload not recognized, using default");
        A::default()
    })
}
