// # Variant Traits
//
// A variant aspect is a closed set of mutually exclusive payload shapes, each
// tagged by a `mode` string. The tag belongs to the type, not to the value,
// so it cannot drift away from the fields it describes.
//
// ## Canonical form
//
// ```json
// {"mode": "manual", "speed": 80, "minimum_fans": 2}
// ```
//
// Decoding dispatches on `mode` through the aspect's [`VariantRegistry`].

use serde_json::Value;

use crate::error::Result;
use crate::fragment::Fragment;
use crate::registry::VariantRegistry;

/// One concrete payload shape of a variant aspect
pub trait VariantValue: Sized {
    /// Discriminant written as `mode` in the canonical form
    const MODE: &'static str;

    /// The discriminant of this value
    fn mode(&self) -> &'static str {
        Self::MODE
    }

    /// Build from a canonical mapping
    ///
    /// Reads only the fields of this shape. Every missing or mistyped field
    /// takes its own default; this never fails.
    fn from_canonical(conf: &Fragment) -> Self;
}

/// The set of variants for one aspect
///
/// Implementors expose a static registry; dispatch and default selection are
/// provided on top of it.
pub trait VariantOption: Sized + 'static {
    /// Tag → constructor table for this aspect
    fn registry() -> &'static VariantRegistry<Self>;

    /// Discriminant of the active variant
    fn mode(&self) -> &'static str;

    /// The aspect default, as designated by the registry
    fn default_variant() -> Self {
        Self::registry().default_value()
    }

    /// Lenient canonical decode
    ///
    /// Missing input, a missing `mode`, or an unrecognized `mode` all yield
    /// the aspect default.
    fn from_canonical(conf: Option<&Value>) -> Self {
        Self::registry().decode(conf)
    }

    /// Strict canonical decode
    ///
    /// Same as [`VariantOption::from_canonical`] except that an unrecognized
    /// `mode` is reported as [`crate::Error::UnrecognizedVariantTag`].
    fn try_from_canonical(conf: Option<&Value>) -> Result<Self> {
        Self::registry().try_decode(conf)
    }
}
