//! Variant registries
//!
//! Each variant aspect owns one [`VariantRegistry`]: a table from `mode` tag
//! to constructor, plus the tag of the default variant. Registries are built
//! once, on first use, and are read-only afterwards.
//!
//! ## Usage
//!
//! ```rust
//! use minercfg_core::registry::VariantRegistry;
//!
//! #[derive(Debug, PartialEq)]
//! enum Led {
//!     Off,
//!     Blink(i64),
//! }
//!
//! let registry = VariantRegistry::new("led", "off", |_| Led::Off)
//!     .with_variant("blink", |conf| {
//!         Led::Blink(conf.get("hz").and_then(|v| v.as_i64()).unwrap_or(1))
//!     });
//!
//! let led = registry.decode(Some(&serde_json::json!({"mode": "blink", "hz": 4})));
//! assert_eq!(led, Led::Blink(4));
//! assert_eq!(registry.decode(None), Led::Off);
//! ```

use serde_json::Value;
use std::collections::HashMap;
use tracing::warn;

use crate::error::{Error, Result};
use crate::fragment::Fragment;

/// Builds one variant from its canonical mapping
pub type VariantConstructor<T> = fn(&Fragment) -> T;

/// Tag → constructor table for one variant aspect
pub struct VariantRegistry<T> {
    /// Aspect name, for diagnostics
    aspect: &'static str,

    /// Tag of the default variant; always present in `variants`
    default_tag: &'static str,

    /// Constructor of the default variant
    default_ctor: VariantConstructor<T>,

    /// Registered constructors
    variants: HashMap<&'static str, VariantConstructor<T>>,
}

impl<T> VariantRegistry<T> {
    /// Create a registry whose default variant is `default_tag`
    pub fn new(
        aspect: &'static str,
        default_tag: &'static str,
        default_ctor: VariantConstructor<T>,
    ) -> Self {
        let mut variants = HashMap::new();
        variants.insert(default_tag, default_ctor);
        Self {
            aspect,
            default_tag,
            default_ctor,
            variants,
        }
    }

    /// Register another variant
    ///
    /// Registering an existing tag replaces its constructor, except for the
    /// default tag, whose constructor is fixed by [`VariantRegistry::new`].
    pub fn with_variant(mut self, tag: &'static str, ctor: VariantConstructor<T>) -> Self {
        if tag != self.default_tag {
            self.variants.insert(tag, ctor);
        }
        self
    }

    /// Aspect name
    pub fn aspect(&self) -> &'static str {
        self.aspect
    }

    /// Tag of the default variant
    pub fn default_tag(&self) -> &'static str {
        self.default_tag
    }

    /// Check if a tag is registered
    pub fn has_variant(&self, tag: &str) -> bool {
        self.variants.contains_key(tag)
    }

    /// List all registered tags, sorted
    pub fn list_variants(&self) -> Vec<&'static str> {
        let mut tags: Vec<_> = self.variants.keys().copied().collect();
        tags.sort_unstable();
        tags
    }

    /// Constructor for `tag`
    pub fn lookup(&self, tag: &str) -> Result<VariantConstructor<T>> {
        self.variants
            .get(tag)
            .copied()
            .ok_or_else(|| Error::unrecognized_tag(self.aspect, tag))
    }

    /// Build the default variant with all field defaults
    pub fn default_value(&self) -> T {
        (self.default_ctor)(&Fragment::new())
    }

    /// Strict decode of a canonical mapping
    ///
    /// A missing, null, or non-object input, or one without a string `mode`,
    /// yields the default variant. An unregistered `mode` is an error.
    pub fn try_decode(&self, conf: Option<&Value>) -> Result<T> {
        let Some(conf) = conf.and_then(Value::as_object) else {
            return Ok(self.default_value());
        };
        let Some(tag) = conf.get("mode").and_then(Value::as_str) else {
            return Ok(self.default_value());
        };
        let ctor = self.lookup(tag)?;
        Ok(ctor(conf))
    }

    /// Lenient decode: an unregistered `mode` also yields the default
    pub fn decode(&self, conf: Option<&Value>) -> T {
        self.try_decode(conf).unwrap_or_else(|err| {
            warn!(aspect = self.aspect, error = %err, "falling back to default variant");
            self.default_value()
        })
    }
}
